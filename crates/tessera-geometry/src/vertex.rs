//! GPU-facing vertex layouts for terrain tiles.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Bit flags stored in the third texture coordinate of a [`TerrainVertex`].
pub mod marker {
    pub const VISIBLE: u32 = 1;
    pub const BOUNDARY: u32 = 2;
    pub const HAS_ELEVATION: u32 = 4;
    pub const SKIRT: u32 = 8;
    pub const CONSTRAINT: u32 = 16;
}

/// One vertex of a tile mesh, in the tile-local frame.
///
/// `uv` holds the normalized grid position in `[0, 1]` and the marker flags as
/// a float in the third component.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 3],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 36]);

impl TerrainVertex {
    pub fn new(position: Vec3, normal: Vec3, u: f32, v: f32, markers: u32) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: [u, v, markers as f32],
        }
    }

    #[must_use]
    pub fn markers(&self) -> u32 {
        self.uv[2] as u32
    }

    pub fn add_markers(&mut self, bits: u32) {
        self.uv[2] = (self.markers() | bits) as f32;
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[must_use]
    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Position and normal of the vertex a [`TerrainVertex`] morphs toward when
/// blending into the next coarser level.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MorphVertex {
    pub neighbor_position: [f32; 3],
    pub neighbor_normal: [f32; 3],
}

static_assertions::assert_eq_size!(MorphVertex, [u8; 24]);

impl MorphVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            neighbor_position: position.to_array(),
            neighbor_normal: normal.to_array(),
        }
    }

    pub fn of(vertex: &TerrainVertex) -> Self {
        Self {
            neighbor_position: vertex.position,
            neighbor_normal: vertex.normal,
        }
    }
}
