//! Command-line argument parsing for the orrery.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Interactive 3D solar-system visualizer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial viewing-scale exponent.
    #[arg(long)]
    pub scale_factor: Option<f32>,

    /// Initial simulation speed multiplier.
    #[arg(long)]
    pub speed: Option<f32>,

    /// Start in wireframe polygon mode.
    #[arg(long)]
    pub wireframe: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(scale) = args.scale_factor {
            self.simulation.initial_scale_factor = scale;
        }
        if let Some(speed) = args.speed {
            self.simulation.simulation_speed = speed;
        }
        if args.wireframe {
            self.debug.wireframe_mode = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
