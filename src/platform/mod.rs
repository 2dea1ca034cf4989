//! Platform layer
//!
//! Hash routing and setup errors are platform-neutral so they can be tested
//! natively. The browser shell (DOM, event listeners, animation loop) lives in
//! `web` and only builds for wasm32; `headless` backs the native binary.

use std::fmt;

use crate::games::GameId;

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// Prefix of every game route, as in `#/games/snake`
pub const GAME_ROUTE_PREFIX: &str = "#/games/";

/// Which page the location hash points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Game(GameId),
}

impl Route {
    /// Parse `location.hash`. Anything unrecognised falls back to the landing page.
    pub fn parse(hash: &str) -> Self {
        hash.strip_prefix(GAME_ROUTE_PREFIX)
            .map(|slug| slug.trim_end_matches('/'))
            .and_then(GameId::from_slug)
            .map_or(Route::Landing, Route::Game)
    }

    pub fn to_hash(self) -> String {
        match self {
            Route::Landing => "#/".to_string(),
            Route::Game(id) => format!("{GAME_ROUTE_PREFIX}{}", id.slug()),
        }
    }
}

/// Failure while wiring the page or the GPU
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    NoWindow,
    NoDocument,
    MissingElement(&'static str),
    WrongElementType(&'static str),
    /// A DOM call threw
    Dom(String),
    /// Adapter, surface or device creation failed
    Gpu(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::MissingElement(id) => write!(f, "missing element #{id}"),
            Self::WrongElementType(id) => write!(f, "element #{id} has the wrong type"),
            Self::Dom(msg) => write!(f, "DOM error: {msg}"),
            Self::Gpu(msg) => write!(f, "GPU initialisation failed: {msg}"),
        }
    }
}

impl std::error::Error for SetupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("#/"), Route::Landing);
        assert_eq!(Route::parse("#/games/snake"), Route::Game(GameId::Snake));
        assert_eq!(
            Route::parse("#/games/space-invaders/"),
            Route::Game(GameId::SpaceInvaders)
        );
        assert_eq!(Route::parse("#/games/pong"), Route::Landing);
        assert_eq!(Route::parse("#/games/"), Route::Landing);
    }

    #[test]
    fn test_hash_round_trip() {
        for id in GameId::ALL {
            let route = Route::Game(id);
            assert_eq!(Route::parse(&route.to_hash()), route);
        }
        assert_eq!(Route::Landing.to_hash(), "#/");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SetupError::MissingElement("canvas").to_string(),
            "missing element #canvas"
        );
        assert!(SetupError::Gpu("no adapter".into()).to_string().contains("no adapter"));
    }
}
