//! Environment variable overrides.

use crate::Config;

/// When set (to anything), geometry pooling is turned off.
pub const NO_GEOMETRY_POOL_VAR: &str = "TESSERA_NO_GEOMETRY_POOL";

/// When set (to anything), the geometry pool also logs cache hits.
pub const DEBUG_GEOMETRY_POOL_VAR: &str = "TESSERA_DEBUG_GEOMETRY_POOL";

impl Config {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|name| std::env::var_os(name).is_some());
    }

    /// Apply overrides using `is_set` to test for each variable.
    pub fn apply_env_overrides_from(&mut self, is_set: impl Fn(&str) -> bool) {
        if is_set(NO_GEOMETRY_POOL_VAR) {
            log::info!("{NO_GEOMETRY_POOL_VAR} set, geometry pooling disabled");
            self.terrain.geometry_pooling = false;
        }
        if is_set(DEBUG_GEOMETRY_POOL_VAR) {
            self.terrain.debug_geometry_pool = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_variables_no_change() {
        let mut config = Config::default();
        config.apply_env_overrides_from(|_| false);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_disable_pool() {
        let mut config = Config::default();
        config.apply_env_overrides_from(|name| name == NO_GEOMETRY_POOL_VAR);
        assert!(!config.terrain.geometry_pooling);
        assert!(!config.terrain.debug_geometry_pool);
    }

    #[test]
    fn test_debug_pool() {
        let mut config = Config::default();
        config.apply_env_overrides_from(|name| name == DEBUG_GEOMETRY_POOL_VAR);
        assert!(config.terrain.geometry_pooling);
        assert!(config.terrain.debug_geometry_pool);
    }
}
