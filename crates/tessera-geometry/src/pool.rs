//! Concurrent cache of shared tile geometry.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::DMat4;
use rustc_hash::FxHashMap;
use tessera_srs::Srs;
use tessera_tiles::{Profile, TileKey};

use crate::builder::{build_geometry, tile_local_frame, world_srs_for};
use crate::{
    CancelToken, DeviceContext, GeometryError, GeometryKey, GeometrySettings, KeyGate,
    SharedGeometry, create_indices,
};

#[derive(Default)]
struct PoolState {
    geometries: FxHashMap<GeometryKey, Arc<SharedGeometry>>,
    default_indices: FxHashMap<(u32, bool), Arc<[u32]>>,
}

/// Builds tile geometry on demand and shares it between equivalent tiles.
///
/// Every method takes `&self`; wrap the pool in an `Arc` to use it from
/// several threads.
pub struct GeometryPool {
    world_srs: Srs,
    state: Mutex<PoolState>,
    gate: KeyGate<GeometryKey>,
    enabled: AtomicBool,
    debug: AtomicBool,
    builds: AtomicU64,
}

impl GeometryPool {
    /// A pool for tiles of `profile`, with pooling enabled.
    pub fn new(profile: &Profile) -> Self {
        Self {
            world_srs: world_srs_for(profile.srs()),
            state: Mutex::new(PoolState::default()),
            gate: KeyGate::new(),
            enabled: AtomicBool::new(true),
            debug: AtomicBool::new(false),
            builds: AtomicU64::new(0),
        }
    }

    /// Reference system tile geometry is placed in.
    pub fn world_srs(&self) -> Srs {
        self.world_srs
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn default_indices(&self, settings: &GeometrySettings) -> Arc<[u32]> {
        let mut state = self.state();
        let indices = state
            .default_indices
            .entry(settings.topology())
            .or_insert_with(|| Arc::from(create_indices(settings)));
        Arc::clone(indices)
    }

    /// Returns geometry for `tile_key`, building it at most once per cache key.
    ///
    /// Concurrent callers asking for the same [`GeometryKey`] wait for the one
    /// in-flight build and receive the same `Arc`. A canceled or failed build
    /// leaves nothing in the pool.
    pub fn get_pooled_geometry(
        &self,
        tile_key: &TileKey,
        settings: &GeometrySettings,
        cancel: Option<&CancelToken>,
    ) -> Result<Arc<SharedGeometry>, GeometryError> {
        settings.validate()?;
        if !tile_key.is_valid() {
            return Err(GeometryError::InvalidTileKey);
        }

        if !self.is_enabled() {
            return self.create_geometry(tile_key, settings, cancel).map(Arc::new);
        }

        let key = GeometryKey::from_tile_key(tile_key, settings);
        let _guard = self.gate.lock(key);

        if let Some(cached) = self.state().geometries.get(&key) {
            if self.is_debug() {
                tracing::debug!(%key, "geometry pool hit");
            }
            return Ok(Arc::clone(cached));
        }

        let geometry = Arc::new(self.create_geometry(tile_key, settings, cancel)?);
        let pooled = {
            let mut state = self.state();
            state.geometries.insert(key, Arc::clone(&geometry));
            state.geometries.len()
        };
        tracing::debug!(%key, pooled, "geometry pool miss, built");
        Ok(geometry)
    }

    /// Builds geometry for `tile_key` without consulting or filling the pool.
    ///
    /// With pooling enabled the index buffer is the shared one for the
    /// settings' topology; otherwise each build gets its own.
    pub fn create_geometry(
        &self,
        tile_key: &TileKey,
        settings: &GeometrySettings,
        cancel: Option<&CancelToken>,
    ) -> Result<SharedGeometry, GeometryError> {
        settings.validate()?;
        let indices = if self.is_enabled() {
            self.default_indices(settings)
        } else {
            Arc::from(create_indices(settings))
        };
        let geometry = build_geometry(self.world_srs, tile_key, settings, indices, cancel)?;
        self.builds.fetch_add(1, Ordering::Relaxed);
        Ok(geometry)
    }

    /// Matrix placing pooled geometry for `tile_key` in the world frame.
    pub fn tile_to_world_matrix(&self, tile_key: &TileKey) -> Result<DMat4, GeometryError> {
        tile_local_frame(self.world_srs, tile_key)
    }

    /// Retires geometry nobody outside the pool still holds.
    ///
    /// Each retired geometry is passed to `device` exactly once. Returns the
    /// number retired.
    pub fn sweep(&self, device: &dyn DeviceContext) -> usize {
        let retired: Vec<Arc<SharedGeometry>> = {
            let mut state = self.state();
            let unused: Vec<GeometryKey> = state
                .geometries
                .iter()
                .filter(|(_, geometry)| Arc::strong_count(geometry) <= 1)
                .map(|(key, _)| *key)
                .collect();
            unused
                .iter()
                .filter_map(|key| state.geometries.remove(key))
                .collect()
        };

        let count = retired.len();
        for geometry in retired {
            device.dispose(geometry);
        }
        if count > 0 {
            tracing::debug!(disposed = count, remaining = self.len(), "geometry pool sweep");
        }
        count
    }

    /// Drops every pooled geometry without handing it to a device.
    pub fn clear(&self) {
        self.state().geometries.clear();
    }

    pub fn len(&self) -> usize {
        self.state().geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turns pooling on or off. Already pooled geometry stays until swept or cleared.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        tracing::debug!(enabled, "geometry pooling");
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Also log pool hits, not just builds.
    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    /// Total geometries built by this pool.
    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }
}
