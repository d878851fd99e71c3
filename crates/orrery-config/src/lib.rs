//! Configuration for the orrery: RON file on disk, clap CLI overrides.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, DebugConfig, SimulationConfig, WindowConfig};
pub use error::ConfigError;
