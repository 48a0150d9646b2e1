//! Tessellation of a single tile into a local-frame mesh.

use std::sync::Arc;

use glam::{DMat4, DVec3};
use tessera_math::BoundingSphere;
use tessera_srs::{GeoExtent, Srs, SrsOperation};
use tessera_tiles::TileKey;

use crate::vertex::marker;
use crate::{
    CancelToken, GeometryError, GeometryKey, GeometrySettings, MorphVertex, SharedGeometry,
    TerrainVertex,
};

/// Matrix from the tile-local frame to `world_srs`.
///
/// The frame is topocentric at the tile's centroid: east-north-up for a
/// geocentric world, a translation for a projected one.
pub fn tile_local_frame(world_srs: Srs, tile_key: &TileKey) -> Result<DMat4, GeometryError> {
    if !tile_key.is_valid() {
        return Err(GeometryError::InvalidTileKey);
    }
    let centroid = tile_key.extent().centroid().transform(world_srs)?;
    Ok(world_srs.topocentric_to_world_matrix(centroid.to_dvec3())?)
}

/// Frame geometry is rendered in for tiles of a profile in `srs`.
///
/// Geodetic profiles render on the globe; projected ones render flat.
pub(crate) fn world_srs_for(srs: Srs) -> Srs {
    if srs.is_geodetic() {
        srs.geocentric_srs()
    } else {
        srs
    }
}

/// Maps unit tile coordinates to the world frame.
struct Locator {
    extent: GeoExtent,
    to_world: SrsOperation,
}

impl Locator {
    fn new(extent: GeoExtent, world_srs: Srs) -> Self {
        Self {
            to_world: extent.srs().to(world_srs),
            extent,
        }
    }

    fn unit_to_world(&self, unit: DVec3) -> Result<DVec3, GeometryError> {
        let tile = DVec3::new(
            unit.x * self.extent.width() + self.extent.xmin(),
            unit.y * self.extent.height() + self.extent.ymin(),
            unit.z,
        );
        Ok(self.to_world.transform(tile)?)
    }
}

/// Perimeter of the surface grid, counterclockwise from the south-west corner.
fn perimeter(ts: usize) -> impl Iterator<Item = usize> {
    let south = 0..ts - 1;
    let east = (0..ts - 1).map(move |r| r * ts + ts - 1);
    let north = (1..ts).rev().map(move |c| (ts - 1) * ts + c);
    let west = (1..ts).rev().map(move |r| r * ts);
    south.chain(east).chain(north).chain(west)
}

/// Tessellates `tile_key` into a `tile_size` grid in its local frame.
///
/// Vertices are row-major from the south-west corner. When skirts are enabled
/// each perimeter vertex is followed by a copy lowered along its normal by
/// `bound.radius * skirt_ratio`.
pub(crate) fn build_geometry(
    world_srs: Srs,
    tile_key: &TileKey,
    settings: &GeometrySettings,
    indices: Arc<[u32]>,
    cancel: Option<&CancelToken>,
) -> Result<SharedGeometry, GeometryError> {
    settings.validate()?;
    let world_to_local = tile_local_frame(world_srs, tile_key)?.inverse();
    let locator = Locator::new(tile_key.extent(), world_srs);

    let ts = settings.tile_size as usize;
    let capacity = settings.num_surface_vertices() + settings.num_skirt_vertices();
    let mut vertices = Vec::with_capacity(capacity);
    let mut morph = settings.morphing.then(|| Vec::with_capacity(capacity));
    let mut bound = BoundingSphere::EMPTY;
    let step = 1.0 / (ts - 1) as f64;

    for row in 0..ts {
        if cancel.is_some_and(CancelToken::is_canceled) {
            return Err(GeometryError::Canceled);
        }
        let ny = row as f64 * step;
        for col in 0..ts {
            let nx = col as f64 * step;

            let world = locator.unit_to_world(DVec3::new(nx, ny, 0.0))?;
            let local = world_to_local.transform_point3(world);
            bound.expand_to_include(local);

            let up = locator.unit_to_world(DVec3::new(nx, ny, 1.0))?;
            let normal = (world_to_local.transform_point3(up) - local).normalize_or_zero();

            vertices.push(TerrainVertex::new(
                local.as_vec3(),
                normal.as_vec3(),
                nx as f32,
                ny as f32,
                marker::VISIBLE,
            ));

            if let Some(morph) = morph.as_mut() {
                let neighbor = (row & !1) * ts + (col & !1);
                morph.push(MorphVertex::of(&vertices[neighbor]));
            }
        }
    }

    if settings.has_skirt() {
        let height = (bound.radius * f64::from(settings.skirt_ratio)) as f32;
        for i in perimeter(ts) {
            let mut top = vertices[i];
            top.add_markers(marker::SKIRT);
            let mut bottom = top;
            bottom.position = (top.position() - top.normal() * height).to_array();
            vertices.push(top);
            vertices.push(bottom);

            if let Some(morph) = morph.as_mut() {
                let upper = morph[i];
                let lowered =
                    glam::Vec3::from_array(upper.neighbor_position) - top.normal() * height;
                morph.push(upper);
                morph.push(MorphVertex {
                    neighbor_position: lowered.to_array(),
                    ..upper
                });
            }
        }
    }

    Ok(SharedGeometry::new(
        GeometryKey::from_tile_key(tile_key, settings),
        vertices,
        morph,
        indices,
        bound,
    ))
}
