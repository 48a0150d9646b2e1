use crate::GeometryError;

/// Smallest usable grid: one quad per tile.
pub const MIN_TILE_SIZE: u32 = 2;

/// Largest grid the pool will build.
pub const MAX_TILE_SIZE: u32 = 1025;

/// Mesh generation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometrySettings {
    /// Vertices per tile edge.
    pub tile_size: u32,
    /// Skirt height as a fraction of the tile's bounding radius. Zero disables skirts.
    pub skirt_ratio: f32,
    /// Record coarser-LOD neighbour data for each vertex.
    pub morphing: bool,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            tile_size: 17,
            skirt_ratio: 0.0,
            morphing: false,
        }
    }
}

impl GeometrySettings {
    #[must_use]
    pub fn has_skirt(&self) -> bool {
        self.skirt_ratio > 0.0
    }

    /// Settings that share an index buffer have equal topology.
    #[must_use]
    pub fn topology(&self) -> (u32, bool) {
        (self.tile_size, self.has_skirt())
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if (MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&self.tile_size) {
            Ok(())
        } else {
            Err(GeometryError::InvalidTileSize(self.tile_size))
        }
    }

    /// Vertices in the surface grid.
    #[must_use]
    pub fn num_surface_vertices(&self) -> usize {
        let ts = self.tile_size as usize;
        ts * ts
    }

    /// Vertices in the skirt: two per perimeter vertex.
    #[must_use]
    pub fn num_skirt_vertices(&self) -> usize {
        if self.has_skirt() {
            (self.tile_size as usize).saturating_sub(1) * 2 * 4
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = GeometrySettings::default();
        assert_eq!(s.tile_size, 17);
        assert!(!s.has_skirt());
        assert!(!s.morphing);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_tile_size_bounds() {
        let mut s = GeometrySettings::default();
        s.tile_size = 1;
        assert_eq!(s.validate(), Err(GeometryError::InvalidTileSize(1)));
        s.tile_size = MAX_TILE_SIZE + 1;
        assert!(s.validate().is_err());
        s.tile_size = 2;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_topology_ignores_morphing_and_skirt_height() {
        let a = GeometrySettings { skirt_ratio: 0.02, ..Default::default() };
        let b = GeometrySettings { skirt_ratio: 0.5, morphing: true, ..Default::default() };
        assert_eq!(a.topology(), b.topology());
        assert_ne!(a.topology(), GeometrySettings::default().topology());
    }

    #[test]
    fn test_vertex_counts() {
        let s = GeometrySettings { tile_size: 5, skirt_ratio: 0.1, morphing: false };
        assert_eq!(s.num_surface_vertices(), 25);
        assert_eq!(s.num_skirt_vertices(), 32);
    }
}
