//! Configuration for Tessera terrain tiling.
//!
//! Settings persist to disk as RON and can be overridden from the command line
//! and from the environment.

mod cli;
mod config;
mod env;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, ProfileConfig, TerrainConfig, default_config_dir};
pub use env::{DEBUG_GEOMETRY_POOL_VAR, NO_GEOMETRY_POOL_VAR};
pub use error::ConfigError;
