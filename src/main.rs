//! Arcade Reborn entry point
//!
//! In the browser this wires up the landing page and game screens. Natively
//! it plays each game headlessly and prints one JSON summary per run.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Arcade Reborn starting...");

    if let Err(err) = arcade_reborn::platform::web::run().await {
        log::error!("Startup failed: {err}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    use arcade_reborn::Settings;
    use arcade_reborn::platform::headless::{RunnerArgs, run_game};
    use clap::Parser;

    env_logger::init();
    let args = RunnerArgs::parse();

    let settings = match &args.settings {
        Some(path) => match Settings::load_from_path(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    let seed = args.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    let games = args.game.games();
    log::info!("Running {} game(s), {} ticks, seed {}", games.len(), args.ticks, seed);

    for id in games {
        let run = run_game(id, args.ticks, seed, &settings);
        match serde_json::to_string(&run) {
            Ok(line) => println!("{line}"),
            Err(err) => {
                log::error!("Cannot encode {} summary: {err}", id.slug());
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
