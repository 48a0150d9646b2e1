use std::fmt;
use std::sync::Arc;

use tessera_math::BoundingSphere;

use crate::{GeometryKey, MorphVertex, TerrainVertex};

/// An immutable tile mesh, shared by every tile with the same [`GeometryKey`].
///
/// Positions are in the tile-local frame; place a tile with
/// [`crate::GeometryPool::tile_to_world_matrix`]. The index buffer may be
/// shared with other geometries of the same topology.
pub struct SharedGeometry {
    key: GeometryKey,
    vertices: Vec<TerrainVertex>,
    morph_vertices: Option<Vec<MorphVertex>>,
    indices: Arc<[u32]>,
    bound: BoundingSphere,
}

impl SharedGeometry {
    pub(crate) fn new(
        key: GeometryKey,
        vertices: Vec<TerrainVertex>,
        morph_vertices: Option<Vec<MorphVertex>>,
        indices: Arc<[u32]>,
        bound: BoundingSphere,
    ) -> Self {
        Self {
            key,
            vertices,
            morph_vertices,
            indices,
            bound,
        }
    }

    pub fn key(&self) -> GeometryKey {
        self.key
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Coarser-level neighbour data, one entry per vertex, when morphing is on.
    pub fn morph_vertices(&self) -> Option<&[MorphVertex]> {
        self.morph_vertices.as_deref()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Bounding sphere of the surface vertices in the local frame.
    pub fn bound(&self) -> BoundingSphere {
        self.bound
    }

    /// True if both geometries draw from the same index buffer allocation.
    #[must_use]
    pub fn shares_indices_with(&self, other: &SharedGeometry) -> bool {
        Arc::ptr_eq(&self.indices, &other.indices)
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn morph_bytes(&self) -> Option<&[u8]> {
        self.morph_vertices.as_deref().map(bytemuck::cast_slice)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl fmt::Debug for SharedGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedGeometry")
            .field("key", &self.key)
            .field("vertices", &self.vertices.len())
            .field("morphing", &self.morph_vertices.is_some())
            .field("indices", &self.indices.len())
            .field("bound", &self.bound)
            .finish()
    }
}
