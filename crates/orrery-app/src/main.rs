//! Binary entry point for the orrery.
//!
//! Loads `config.ron` (creating it with defaults on first run), applies CLI
//! overrides, initializes logging, and hands off to the winit event loop.
//!
//! Run with: `cargo run -p orrery-app`

mod app;
mod game_loop;
mod renderer;

use clap::Parser;
use tracing::{info, warn};

use orrery_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(Config::default_config_dir);
    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("failed to load config from {}: {e}", dir.display());
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    orrery_log::init_logging(Some(&config));

    if config_dir.is_none() {
        warn!("no config directory available, running with defaults");
    }
    info!(
        "window: {}x{} | title: {}",
        config.window.width, config.window.height, config.window.title
    );
    info!(
        scale_factor = config.simulation.initial_scale_factor,
        speed = config.simulation.simulation_speed,
        "starting simulation"
    );

    app::run(config);
}
