//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_geometry::{GeometryPool, GeometrySettings};
use tessera_tiles::Profile;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tile mesh generation.
    pub terrain: TerrainConfig,
    /// Tiling scheme.
    pub profile: ProfileConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain tile geometry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Vertices per tile edge.
    pub tile_size: u32,
    /// Skirt height as a fraction of tile radius. 0 disables skirts.
    pub skirt_ratio: f32,
    /// Generate per-vertex morphing data.
    pub morphing: bool,
    /// Share identical tile geometry between tiles.
    pub geometry_pooling: bool,
    /// Log geometry pool hits as well as builds.
    pub debug_geometry_pool: bool,
}

/// Tiling profile selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileConfig {
    /// Well-known profile name, e.g. "global-geodetic".
    pub well_known_name: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        let geometry = GeometrySettings::default();
        Self {
            tile_size: geometry.tile_size,
            skirt_ratio: geometry.skirt_ratio,
            morphing: geometry.morphing,
            geometry_pooling: true,
            debug_geometry_pool: false,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            well_known_name: "global-geodetic".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl TerrainConfig {
    /// Mesh parameters for [`GeometryPool::get_pooled_geometry`].
    pub fn geometry_settings(&self) -> GeometrySettings {
        GeometrySettings {
            tile_size: self.tile_size,
            skirt_ratio: self.skirt_ratio,
            morphing: self.morphing,
        }
    }

    /// Push the pooling flags into a live pool.
    pub fn configure_pool(&self, pool: &GeometryPool) {
        pool.set_enabled(self.geometry_pooling);
        pool.set_debug(self.debug_geometry_pool);
    }
}

impl ProfileConfig {
    /// The configured profile. Unknown names give an invalid profile.
    pub fn profile(&self) -> Profile {
        let profile = Profile::from_well_known_name(&self.well_known_name);
        if !profile.is_valid() {
            log::warn!("Unknown tiling profile '{}'", self.well_known_name);
        }
        profile
    }
}

/// Platform config directory for Tessera, if the platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tessera"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join("config.ron"), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Returns `Some(new_config)` if the file on disk differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join("config.ron"))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
