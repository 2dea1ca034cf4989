//! Browser shell: landing page, hash routing and the per-screen animation loop
//!
//! One `App` lives for the whole page visit. Mounting a game screen creates a
//! `Session`, registers its keyboard listeners and starts a
//! `requestAnimationFrame` loop; unmounting drops all three.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, Window};

use super::{Route, SetupError};
use crate::games::GameId;
use crate::highscores::HighScores;
use crate::renderer::{DrawList, RenderState, Surface, TextAlign, colors, tessellate};
use crate::settings::Settings;
use crate::sim::{Game, Key, Session};

const LANDING_ID: &str = "landing";
const GRID_ID: &str = "game-grid";
const SCREEN_ID: &str = "screen";
const CANVAS_ID: &str = "canvas";
const TITLE_ID: &str = "game-title";
const TAGLINE_ID: &str = "game-tagline";

fn js_error(value: JsValue) -> SetupError {
    SetupError::Dom(format!("{value:?}"))
}

fn window() -> Result<Window, SetupError> {
    web_sys::window().ok_or(SetupError::NoWindow)
}

fn element(document: &Document, id: &'static str) -> Result<Element, SetupError> {
    document
        .get_element_by_id(id)
        .ok_or(SetupError::MissingElement(id))
}

/// Event listener that unregisters itself when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, SetupError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(js_error)?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Rolling frames-per-second over the last 60 frames
struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    fn record(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time - oldest;
            if elapsed > 0.0 {
                self.fps = (60_000.0 / elapsed).round() as u32;
            }
        }
    }
}

/// Everything that exists only while a game screen is shown
struct Screen {
    id: GameId,
    session: Session<Box<dyn Game>>,
    draw_list: DrawList,
    last_time: f64,
    fps: FpsCounter,
    /// Dropped with the screen, which detaches the handlers
    _listeners: Vec<Listener>,
}

struct App {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    renderer: Option<RenderState>,
    settings: Settings,
    high_scores: HighScores,
    screen: Option<Screen>,
    /// Bumped on every mount so stale animation loops stop themselves
    generation: u64,
}

impl App {
    fn set_visible(&self, id: &'static str, visible: bool) -> Result<(), SetupError> {
        element(&self.document, id)?
            .class_list()
            .toggle_with_force("hidden", !visible)
            .map_err(js_error)?;
        Ok(())
    }

    fn show_landing(&mut self) -> Result<(), SetupError> {
        self.unmount();
        self.set_visible(SCREEN_ID, false)?;
        self.set_visible(LANDING_ID, true)?;
        self.document.set_title("Arcade Reborn");
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(mut screen) = self.screen.take() {
            screen.session.release_input();
            log::info!("Unmounted {}", screen.id.slug());
        }
    }

    /// Size the canvas to the playfield, in device pixels
    fn size_canvas(&mut self, id: GameId) -> Result<(), SetupError> {
        let info = id.info();
        let dpr = self.window.device_pixel_ratio();
        let width = (info.width as f64 * dpr) as u32;
        let height = (info.height as f64 * dpr) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.canvas
            .set_attribute(
                "style",
                &format!("width:{}px;height:{}px", info.width, info.height),
            )
            .map_err(js_error)?;
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(width, height);
            renderer.set_logical_size(Vec2::new(info.width, info.height));
        }
        Ok(())
    }
}

type SharedApp = Rc<RefCell<App>>;

fn mount(app: &SharedApp, id: GameId) -> Result<(), SetupError> {
    let generation = {
        let mut a = app.borrow_mut();
        a.unmount();
        a.set_visible(LANDING_ID, false)?;
        a.set_visible(SCREEN_ID, true)?;
        let info = id.info();
        element(&a.document, TITLE_ID)?.set_text_content(Some(info.title));
        element(&a.document, TAGLINE_ID)?.set_text_content(Some(info.tagline));
        a.document.set_title(&format!("{} - Arcade Reborn", info.title));
        a.size_canvas(id)?;

        if a.renderer.is_none() {
            log::warn!("No GPU renderer; {} will not be drawn", info.title);
            return Ok(());
        }

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(id.create(seed)).with_high_score(a.high_scores.best(id));
        let target: EventTarget = a.window.clone().into();
        let listeners = vec![
            key_listener(app, &target, "keydown", true)?,
            key_listener(app, &target, "keyup", false)?,
        ];
        a.generation += 1;
        a.screen = Some(Screen {
            id,
            session,
            draw_list: DrawList::new(Vec2::new(info.width, info.height)),
            last_time: 0.0,
            fps: FpsCounter::new(),
            _listeners: listeners,
        });
        log::info!("Mounted {} (seed {})", id.slug(), seed);
        a.generation
    };
    start_loop(app.clone(), generation)
}

fn key_listener(
    app: &SharedApp,
    target: &EventTarget,
    event: &'static str,
    pressed: bool,
) -> Result<Listener, SetupError> {
    let app = app.clone();
    Listener::new(target, event, move |event: Event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let Some(key) = Key::from_dom_key(&event.key()) else {
            return;
        };
        event.prevent_default();

        if pressed && key == Key::Escape {
            // The hashchange handler does the unmount
            if let Ok(window) = window() {
                let _ = window.location().set_hash(&Route::Landing.to_hash());
            }
            return;
        }

        let Ok(mut a) = app.try_borrow_mut() else {
            return;
        };
        if let Some(screen) = &mut a.screen {
            if pressed {
                screen.session.key_down(key);
            } else {
                screen.session.key_up(key);
            }
        }
    })
}

fn start_loop(app: SharedApp, generation: u64) -> Result<(), SetupError> {
    let window = window()?;
    let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
        let alive = app
            .try_borrow_mut()
            .map(|mut a| a.generation == generation && frame(&mut a, time))
            .unwrap_or(false);
        if !alive {
            // Breaks the closure's reference cycle
            let _ = next.borrow_mut().take();
            return;
        }
        if let (Ok(window), Some(cb)) = (self::window(), next.borrow().as_ref()) {
            let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }));

    if let Some(cb) = callback.borrow().as_ref() {
        window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map_err(js_error)?;
    }
    Ok(())
}

/// Advance and draw one display frame. False once the screen is gone.
fn frame(app: &mut App, time: f64) -> bool {
    let App {
        renderer,
        settings,
        high_scores,
        screen,
        ..
    } = app;
    let (Some(screen), Some(renderer)) = (screen.as_mut(), renderer.as_mut()) else {
        return false;
    };

    let dt = if screen.last_time > 0.0 {
        ((time - screen.last_time) / 1000.0) as f32
    } else {
        crate::consts::SIM_DT
    };
    screen.last_time = time;
    screen.fps.record(time);

    screen.session.frame(dt);
    if let Some(run) = screen.session.take_finished() {
        let rank = high_scores.record(&run);
        screen.session.set_rank(rank);
    }

    let info = screen.id.info();
    let size = Vec2::new(info.width, info.height);
    screen.draw_list.reset(size);
    screen.session.render(&mut screen.draw_list, time, settings);
    if settings.show_fps {
        let label = format!("FPS: {}", screen.fps.fps);
        let width = crate::renderer::font::measure(&label, 14.0);
        screen.draw_list.text(
            Vec2::new(size.x - width - 12.0, size.y - 26.0),
            14.0,
            TextAlign::Left,
            colors::HUD_DIM,
            &label,
        );
    }

    let vertices = tessellate(&screen.draw_list, settings.quality.circle_segments());
    let background = screen.draw_list.clear_color().unwrap_or(info.background);
    match renderer.render(&vertices, background) {
        Ok(()) => {}
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            let (w, h) = renderer.size;
            renderer.resize(w, h);
        }
        Err(wgpu::SurfaceError::OutOfMemory) => log::error!("GPU out of memory"),
        Err(e) => log::warn!("Render error: {e:?}"),
    }
    true
}

/// Fill the landing grid with one card per game
fn build_landing(document: &Document) -> Result<(), SetupError> {
    let grid = element(document, GRID_ID)?;
    grid.set_inner_html("");
    for id in GameId::ALL {
        let card = document.create_element("a").map_err(js_error)?;
        card.set_attribute("href", &Route::Game(id).to_hash())
            .map_err(js_error)?;
        let class = if id.featured() { "card featured" } else { "card" };
        card.set_class_name(class);

        let icon = document.create_element("div").map_err(js_error)?;
        icon.set_class_name("card-icon");
        icon.set_text_content(Some(id.icon()));
        let title = document.create_element("h2").map_err(js_error)?;
        title.set_text_content(Some(id.info().title));
        let blurb = document.create_element("p").map_err(js_error)?;
        blurb.set_text_content(Some(id.description()));

        for child in [&icon, &title, &blurb] {
            card.append_child(child).map_err(js_error)?;
        }
        if id.featured() {
            let badge = document.create_element("span").map_err(js_error)?;
            badge.set_class_name("badge");
            badge.set_text_content(Some("Featured"));
            card.append_child(&badge).map_err(js_error)?;
        }
        grid.append_child(&card).map_err(js_error)?;
    }
    Ok(())
}

async fn init_renderer(canvas: &HtmlCanvasElement) -> Result<RenderState, SetupError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| SetupError::Gpu(e.to_string()))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| SetupError::Gpu(e.to_string()))?;
    log::info!("Using adapter: {:?}", adapter.get_info().name);

    RenderState::new(surface, &adapter, canvas.width().max(1), canvas.height().max(1))
        .await
        .map_err(|e| SetupError::Gpu(e.to_string()))
}

fn route(app: &SharedApp) {
    let hash = app
        .borrow()
        .window
        .location()
        .hash()
        .unwrap_or_default();
    let result = match Route::parse(&hash) {
        Route::Landing => app.borrow_mut().show_landing(),
        Route::Game(id) => mount(app, id),
    };
    if let Err(err) = result {
        log::warn!("Cannot show {hash}: {err}");
    }
}

/// Wire up the page and show whatever the current hash points at
pub async fn run() -> Result<(), SetupError> {
    let window = window()?;
    let document = window.document().ok_or(SetupError::NoDocument)?;
    let canvas: HtmlCanvasElement = element(&document, CANVAS_ID)?
        .dyn_into()
        .map_err(|_| SetupError::WrongElementType(CANVAS_ID))?;

    let settings = Settings::load();
    build_landing(&document)?;

    let renderer = match init_renderer(&canvas).await {
        Ok(renderer) => Some(renderer),
        Err(err) => {
            log::warn!("{err}");
            None
        }
    };

    let app = Rc::new(RefCell::new(App {
        window: window.clone(),
        document,
        canvas,
        renderer,
        settings,
        high_scores: HighScores::new(),
        screen: None,
        generation: 0,
    }));

    {
        let app = app.clone();
        let on_hash = Closure::<dyn FnMut(Event)>::new(move |_event: Event| route(&app));
        window
            .add_event_listener_with_callback("hashchange", on_hash.as_ref().unchecked_ref())
            .map_err(js_error)?;
        // Lives as long as the page
        on_hash.forget();
    }

    route(&app);
    log::info!("Arcade Reborn running");
    Ok(())
}
