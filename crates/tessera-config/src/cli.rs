//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, default_config_dir};

/// Tessera command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessera", about = "Tessera terrain tiling")]
pub struct CliArgs {
    /// Vertices per tile edge.
    #[arg(long)]
    pub tile_size: Option<u32>,

    /// Skirt height as a fraction of tile radius (0 disables skirts).
    #[arg(long)]
    pub skirt_ratio: Option<f32>,

    /// Generate morphing data.
    #[arg(long)]
    pub morphing: Option<bool>,

    /// Build geometry per tile instead of sharing it.
    #[arg(long)]
    pub no_geometry_pool: bool,

    /// Well-known tiling profile name.
    #[arg(long)]
    pub profile: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// `--config` if given, else the platform config directory.
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_dir)
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ts) = args.tile_size {
            self.terrain.tile_size = ts;
        }
        if let Some(ratio) = args.skirt_ratio {
            self.terrain.skirt_ratio = ratio;
        }
        if let Some(morphing) = args.morphing {
            self.terrain.morphing = morphing;
        }
        if args.no_geometry_pool {
            self.terrain.geometry_pooling = false;
        }
        if let Some(ref name) = args.profile {
            self.profile.well_known_name = name.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            tile_size: Some(33),
            profile: Some("spherical-mercator".to_string()),
            no_geometry_pool: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.tile_size, 33);
        assert_eq!(config.profile.well_known_name, "spherical-mercator");
        assert!(!config.terrain.geometry_pooling);
        // Non-overridden fields retain defaults
        assert_eq!(config.terrain.skirt_ratio, 0.0);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_dir_override() {
        let args = CliArgs::parse_from(["tessera", "--config", "/tmp/tessera-test"]);
        assert_eq!(args.config_dir(), Some(PathBuf::from("/tmp/tessera-test")));
    }

    #[test]
    fn test_parse_args() {
        let args = CliArgs::parse_from([
            "tessera",
            "--tile-size",
            "65",
            "--skirt-ratio",
            "0.05",
            "--morphing",
            "true",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.tile_size, Some(65));
        assert_eq!(args.skirt_ratio, Some(0.05));
        assert_eq!(args.morphing, Some(true));
        assert!(!args.no_geometry_pool);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
