//! Rendering
//!
//! Games paint into a `Surface`. The browser build records into a `DrawList`,
//! tessellates it into triangles and hands them to the WebGPU pipeline.

pub mod font;
pub mod pipeline;
pub mod shapes;
pub mod surface;

pub use pipeline::RenderState;
pub use shapes::{Vertex, tessellate};
pub use surface::{Color, DrawCmd, DrawList, Surface, TextAlign, colors, starfield};
