use std::fmt;

use tessera_tiles::TileKey;

use crate::GeometrySettings;

/// Identity of a shareable tile mesh.
///
/// In a geodetic profile every tile in a row has the same shape in its local
/// frame, so the key keeps the row. Projected tiles at one level are all the
/// same shape and collapse to row zero.
///
/// Skirt height and morphing change the mesh too, so they are part of the
/// key. Every ratio without a skirt maps to `skirt_bits == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryKey {
    pub level: u32,
    pub tile_y: u32,
    pub size: u32,
    /// `skirt_ratio.to_bits()`, or zero without a skirt.
    pub skirt_bits: u32,
    pub morphing: bool,
}

impl GeometryKey {
    #[must_use]
    pub fn from_tile_key(tile_key: &TileKey, settings: &GeometrySettings) -> Self {
        let tile_y = if tile_key.profile.srs().is_geodetic() {
            tile_key.y
        } else {
            0
        };
        Self {
            level: tile_key.level,
            tile_y,
            size: settings.tile_size,
            skirt_bits: if settings.has_skirt() {
                settings.skirt_ratio.to_bits()
            } else {
                0
            },
            morphing: settings.morphing,
        }
    }
}

impl fmt::Display for GeometryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} Y{} S{}", self.level, self.tile_y, self.size)?;
        if self.skirt_bits != 0 {
            write!(f, " skirt {}", f32::from_bits(self.skirt_bits))?;
        }
        if self.morphing {
            write!(f, " morph")?;
        }
        Ok(())
    }
}
