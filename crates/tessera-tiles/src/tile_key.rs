//! Tile addresses within a profile's pyramid.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::DMat4;
use tessera_math::{equiv, soft_assert_or_return};
use tessera_srs::{GeoExtent, GeoPoint};

use crate::Profile;

/// Parent-relative scale/bias for each quadrant, in unit space with +y north.
const SCALE_BIAS: [[f64; 16]; 4] = [
    [0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 0.0, 1.0],
    [0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.5, 0.0, 1.0],
    [0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.0, 0.0, 1.0],
];

/// Address of one tile: level, column, row, and the profile it belongs to.
///
/// A key is valid iff its profile is valid. Rows count down from the top of
/// the profile extent.
#[derive(Clone, Debug, Default)]
pub struct TileKey {
    pub level: u32,
    pub x: u32,
    pub y: u32,
    pub profile: Profile,
}

impl TileKey {
    pub fn new(level: u32, x: u32, y: u32, profile: Profile) -> Self {
        Self {
            level,
            x,
            y,
            profile,
        }
    }

    /// A key with the invalid profile.
    pub fn invalid() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.profile.is_valid()
    }

    /// Geospatial extent of the tile.
    #[must_use]
    pub fn extent(&self) -> GeoExtent {
        if !self.is_valid() {
            return GeoExtent::INVALID;
        }
        self.profile.tile_extent(self.level, self.x, self.y)
    }

    /// Which child of its parent this tile is: 0 upper-left, 1 upper-right,
    /// 2 lower-left, 3 lower-right. Level-0 keys report 0.
    #[must_use]
    pub fn quadrant(&self) -> u32 {
        if self.level == 0 {
            return 0;
        }
        let x_even = self.x & 1 == 0;
        let y_even = self.y & 1 == 0;
        match (x_even, y_even) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (false, false) => 3,
        }
    }

    /// Child key in the given quadrant (see [`TileKey::quadrant`]).
    ///
    /// Returns the invalid key when the child's column, row or level would not
    /// fit in a `u32`.
    #[must_use]
    pub fn create_child_key(&self, quadrant: u32) -> TileKey {
        let (dx, dy) = match quadrant {
            1 => (1, 0),
            2 => (0, 1),
            3 => (1, 1),
            _ => (0, 0),
        };
        let child = |v: u32, d: u32| v.checked_mul(2).and_then(|v| v.checked_add(d));
        match (child(self.x, dx), child(self.y, dy), self.level.checked_add(1)) {
            (Some(x), Some(y), Some(level)) => TileKey::new(level, x, y, self.profile.clone()),
            _ => TileKey::invalid(),
        }
    }

    /// Parent key, or the invalid key at level 0.
    #[must_use]
    pub fn create_parent_key(&self) -> TileKey {
        if self.level == 0 {
            return TileKey::invalid();
        }
        TileKey::new(self.level - 1, self.x / 2, self.y / 2, self.profile.clone())
    }

    /// Replace this key with its parent. At level 0 the key becomes invalid
    /// and `false` is returned.
    pub fn make_parent(&mut self) -> bool {
        if self.level == 0 {
            self.profile = Profile::default();
            return false;
        }
        self.level -= 1;
        self.x >>= 1;
        self.y >>= 1;
        true
    }

    /// Ancestor at `level`, or the invalid key if `level` is deeper than this key.
    #[must_use]
    pub fn create_ancestor_key(&self, level: u32) -> TileKey {
        if level > self.level {
            return TileKey::invalid();
        }
        let shift = self.level - level;
        let x = self.x.checked_shr(shift).unwrap_or(0);
        let y = self.y.checked_shr(shift).unwrap_or(0);
        TileKey::new(level, x, y, self.profile.clone())
    }

    /// Key offset by (`dx`, `dy`) tiles on the same level, wrapping at the edges.
    pub fn create_neighbor_key(&self, dx: i32, dy: i32) -> TileKey {
        soft_assert_or_return!(self.is_valid(), TileKey::invalid());
        let (tx, ty) = self.profile.num_tiles(self.level);
        let wrap = |v: u32, d: i32, n: u32| -> u32 {
            let n = i64::from(n);
            (i64::from(v) + i64::from(d)).rem_euclid(n) as u32
        };
        TileKey::new(
            self.level,
            wrap(self.x, dx, tx),
            wrap(self.y, dy, ty),
            self.profile.clone(),
        )
    }

    /// Quad-tree string address, one digit per level from the root down.
    #[must_use]
    pub fn quad_key(&self) -> String {
        (0..=self.level)
            .rev()
            .map(|i| {
                let mask = 1u32.checked_shl(i).unwrap_or(0);
                let mut digit = b'0';
                if self.x & mask != 0 {
                    digit += 1;
                }
                if self.y & mask != 0 {
                    digit += 2;
                }
                digit as char
            })
            .collect()
    }

    /// Matrix mapping this tile's unit square into its parent's unit square.
    #[must_use]
    pub fn scale_bias_matrix(&self) -> DMat4 {
        if self.level == 0 {
            return DMat4::IDENTITY;
        }
        DMat4::from_cols_array(&SCALE_BIAS[self.quadrant() as usize])
    }

    /// Ground distance between adjacent samples for a raster of `tile_size`
    /// samples per side.
    #[must_use]
    pub fn resolution_for_tile_size(&self, tile_size: u32) -> (f64, f64) {
        let (width, height) = self.profile.tile_dimensions(self.level);
        let intervals = f64::from(tile_size.saturating_sub(1).max(1));
        (width / intervals, height / intervals)
    }

    /// Ancestor whose resolution at `target_size` best matches this key's at
    /// `source_size`, never going above `minimum_lod`.
    ///
    /// Only coarsens: returns `self` unchanged when `target_size >= source_size`.
    #[must_use]
    pub fn map_resolution(&self, target_size: u32, source_size: u32, minimum_lod: u32) -> TileKey {
        if self.level == 0 || target_size >= source_size {
            return self.clone();
        }
        let mut level = self.level;
        let mut target_pot = target_size
            .max(2)
            .checked_next_power_of_two()
            .unwrap_or(u32::MAX);
        loop {
            if target_pot >= source_size || level <= minimum_lod || level == 0 {
                return self.create_ancestor_key(level);
            }
            level -= 1;
            target_pot = target_pot.saturating_mul(2);
        }
    }

    /// Key on `level` whose tile contains (`x`, `y`) in the profile's SRS.
    /// Invalid if the point lies outside the profile extent.
    pub fn containing_point(x: f64, y: f64, level: u32, profile: &Profile) -> TileKey {
        soft_assert_or_return!(profile.is_valid(), TileKey::invalid());
        let extent = profile.extent();
        if !extent.contains(x, y) {
            return TileKey::invalid();
        }
        let (tiles_x, tiles_y) = profile.num_tiles(level);
        let rx = (x - extent.xmin()) / extent.width();
        let ry = (y - extent.ymin()) / extent.height();
        let col = ((rx * f64::from(tiles_x)).max(0.0) as u32).min(tiles_x - 1);
        let row = (((1.0 - ry) * f64::from(tiles_y)).max(0.0) as u32).min(tiles_y - 1);
        TileKey::new(level, col, row, profile.clone())
    }

    /// Like [`TileKey::containing_point`], transforming the point into the
    /// profile's SRS first.
    pub fn containing_geo_point(point: &GeoPoint, level: u32, profile: &Profile) -> TileKey {
        soft_assert_or_return!(point.is_valid() && profile.is_valid(), TileKey::invalid());
        if point.srs.horizontally_equivalent_to(profile.srs()) {
            return Self::containing_point(point.x, point.y, level, profile);
        }
        match point.transform(profile.srs()) {
            Ok(p) => Self::containing_point(p.x, p.y, level, profile),
            Err(err) => {
                tracing::debug!(%err, %point, "point does not map into profile");
                TileKey::invalid()
            }
        }
    }

    /// Keys of `target_profile` covering this tile at the resolution-equivalent level.
    pub fn intersecting_keys(&self, target_profile: &Profile) -> Vec<TileKey> {
        soft_assert_or_return!(self.is_valid(), Vec::new());
        if self.profile.horizontally_equivalent_to(target_profile) {
            return vec![self.clone()];
        }
        let level = target_profile.equivalent_lod(&self.profile, self.level);
        Self::intersecting_keys_for_extent(&self.extent(), level, target_profile)
    }

    /// Keys of `target_profile` on `level` covering `extent`.
    pub fn intersecting_keys_for_extent(
        extent: &GeoExtent,
        level: u32,
        target_profile: &Profile,
    ) -> Vec<TileKey> {
        soft_assert_or_return!(extent.is_valid() && target_profile.is_valid(), Vec::new());
        let mut out = Vec::new();
        for part in target_profile.transform_and_extract_contiguous_extents(extent) {
            add_intersecting_keys(&part, level, target_profile, &mut out);
        }
        out
    }
}

/// Append the keys on `level` whose tiles overlap `extent`, which must not
/// cross the antimeridian.
fn add_intersecting_keys(extent: &GeoExtent, level: u32, profile: &Profile, out: &mut Vec<TileKey>) {
    soft_assert_or_return!(
        !extent.crosses_antimeridian(),
        (),
        "intersecting keys cannot process an antimeridian crossing"
    );

    let (tile_width, tile_height) = profile.tile_dimensions(level);
    let profile_extent = profile.extent();

    let west = extent.xmin() - profile_extent.xmin();
    let east = extent.xmax() - profile_extent.xmin();
    let south = profile_extent.ymax() - extent.ymin();
    let north = profile_extent.ymax() - extent.ymax();

    let mut min_x = (west / tile_width) as i64;
    let mut max_x = (east / tile_width) as i64;
    let min_y = (north / tile_height) as i64;
    let max_y = (south / tile_height) as i64;

    // An edge lying exactly on a tile boundary does not pull in the tile beyond it.
    let quantized_west = tile_width * min_x as f64;
    let quantized_east = tile_width * (max_x + 1) as f64;
    if equiv(west - quantized_west, tile_width) {
        min_x += 1;
    }
    if equiv(quantized_east - east, tile_width) {
        max_x -= 1;
    }
    if max_x < min_x {
        max_x = min_x;
    }

    let (num_wide, num_high) = profile.num_tiles(level);
    let (num_wide, num_high) = (i64::from(num_wide), i64::from(num_high));
    if min_x >= num_wide || min_y >= num_high || max_x < 0 || max_y < 0 {
        return;
    }

    let min_x = min_x.clamp(0, num_wide - 1);
    let max_x = max_x.clamp(0, num_wide - 1);
    let min_y = min_y.clamp(0, num_high - 1);
    let max_y = max_y.clamp(0, num_high - 1);

    for col in min_x..=max_x {
        for row in min_y..=max_y {
            out.push(TileKey::new(level, col as u32, row as u32, profile.clone()));
        }
    }
}

impl PartialEq for TileKey {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level && self.x == other.x && self.y == other.y && self.profile == other.profile
    }
}

impl Eq for TileKey {}

impl Hash for TileKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.level.hash(state);
        self.x.hash(state);
        self.y.hash(state);
        self.profile.hash(state);
    }
}

impl PartialOrd for TileKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TileKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.level, self.x, self.y)
            .cmp(&(other.level, other.x, other.y))
            .then_with(|| self.profile.structure_key().cmp(&other.profile.structure_key()))
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}/{}/{}", self.level, self.x, self.y)
        } else {
            f.write_str("invalid")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use glam::DVec3;
    use tessera_srs::Srs;

    use super::*;

    fn gg(level: u32, x: u32, y: u32) -> TileKey {
        TileKey::new(level, x, y, Profile::global_geodetic())
    }

    #[test]
    fn test_display() {
        assert_eq!(gg(3, 5, 2).to_string(), "3/5/2");
        assert_eq!(TileKey::invalid().to_string(), "invalid");
    }

    #[test]
    fn test_extent_matches_profile() {
        let key = gg(1, 3, 1);
        assert_eq!(key.extent(), Profile::global_geodetic().tile_extent(1, 3, 1));
        assert!(!TileKey::invalid().extent().is_valid());
    }

    #[test]
    fn test_children_and_parent() {
        let key = gg(2, 3, 1);
        for q in 0..4 {
            let child = key.create_child_key(q);
            assert_eq!(child.level, 3);
            assert_eq!(child.quadrant(), q);
            assert_eq!(child.create_parent_key(), key);
        }
        assert!(!gg(0, 1, 0).create_parent_key().is_valid());
    }

    #[test]
    fn test_deep_children_do_not_overflow() {
        let edge = gg(31, u32::MAX / 2, u32::MAX / 2);
        let child = edge.create_child_key(3);
        assert!(child.is_valid());
        assert_eq!((child.level, child.x, child.y), (32, u32::MAX, u32::MAX));

        let past = gg(31, 1 << 31, 0);
        assert!(!past.create_child_key(0).is_valid());
        assert!(!gg(31, 0, 1 << 31).create_child_key(2).is_valid());
        assert!(!gg(u32::MAX, 0, 0).create_child_key(0).is_valid());
    }

    #[test]
    fn test_children_tile_parent_extent() {
        let parent = gg(1, 1, 0);
        let pe = parent.extent();
        let nw = parent.create_child_key(0).extent();
        let se = parent.create_child_key(3).extent();
        assert_eq!((nw.xmin(), nw.ymax()), (pe.xmin(), pe.ymax()));
        assert_eq!((se.xmax(), se.ymin()), (pe.xmax(), pe.ymin()));
    }

    #[test]
    fn test_make_parent() {
        let mut key = gg(2, 3, 1);
        assert!(key.make_parent());
        assert_eq!((key.level, key.x, key.y), (1, 1, 0));
        assert!(key.make_parent());
        assert!(!key.make_parent());
        assert!(!key.is_valid());
    }

    #[test]
    fn test_ancestor() {
        let key = gg(5, 21, 9);
        let a = key.create_ancestor_key(2);
        assert_eq!((a.level, a.x, a.y), (2, 2, 1));
        assert_eq!(key.create_ancestor_key(5), key);
        assert!(!key.create_ancestor_key(6).is_valid());
    }

    #[test]
    fn test_neighbor_wraps() {
        let key = gg(1, 0, 0);
        let west = key.create_neighbor_key(-1, 0);
        assert_eq!((west.x, west.y), (3, 0));
        let north = key.create_neighbor_key(0, -1);
        assert_eq!((north.x, north.y), (0, 1));
        let far = key.create_neighbor_key(9, 5);
        assert_eq!((far.x, far.y), (1, 1));
        assert!(!TileKey::invalid().create_neighbor_key(1, 0).is_valid());
    }

    #[test]
    fn test_quad_key() {
        assert_eq!(gg(0, 0, 0).quad_key(), "0");
        assert_eq!(gg(2, 3, 1).quad_key(), "013");
        assert_eq!(gg(2, 0, 2).quad_key(), "020");
    }

    #[test]
    fn test_scale_bias() {
        assert_eq!(gg(0, 1, 0).scale_bias_matrix(), DMat4::IDENTITY);
        // Upper-left child: unit origin maps to the parent's mid-left.
        let m = gg(1, 0, 0).scale_bias_matrix();
        assert_eq!(m.transform_point3(DVec3::ZERO), DVec3::new(0.0, 0.5, 0.0));
        let m = gg(1, 1, 1).scale_bias_matrix();
        assert_eq!(m.transform_point3(DVec3::ONE), DVec3::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn test_resolution_for_tile_size() {
        let (rx, ry) = gg(0, 0, 0).resolution_for_tile_size(17);
        assert_eq!((rx, ry), (180.0 / 16.0, 180.0 / 16.0));
    }

    #[test]
    fn test_map_resolution() {
        let key = gg(6, 40, 12);
        assert_eq!(key.map_resolution(256, 256, 0), key);
        let mapped = key.map_resolution(64, 256, 0);
        assert_eq!(mapped, key.create_ancestor_key(4));
        let floored = key.map_resolution(2, 256, 5);
        assert_eq!(floored.level, 5);
    }

    #[test]
    fn test_containing_point() {
        let p = Profile::global_geodetic();
        let k = TileKey::containing_point(-90.0, 45.0, 1, &p);
        assert_eq!((k.level, k.x, k.y), (1, 1, 0));
        let k = TileKey::containing_point(180.0, -90.0, 1, &p);
        assert_eq!((k.x, k.y), (3, 1));
        assert!(!TileKey::containing_point(0.0, 95.0, 1, &p).is_valid());
    }

    #[test]
    fn test_containing_geo_point_transforms() {
        let p = Profile::spherical_mercator();
        let point = GeoPoint::new(Srs::Wgs84, 10.0, 10.0, 0.0);
        let k = TileKey::containing_geo_point(&point, 1, &p);
        assert_eq!((k.x, k.y), (1, 0));
    }

    #[test]
    fn test_intersecting_keys_same_profile() {
        let key = gg(3, 4, 2);
        assert_eq!(key.intersecting_keys(&Profile::global_geodetic()), vec![key]);
    }

    #[test]
    fn test_intersecting_keys_across_profiles() {
        let key = TileKey::new(1, 1, 0, Profile::spherical_mercator());
        let keys = key.intersecting_keys(&Profile::global_geodetic());
        assert!(!keys.is_empty());
        let e = key.extent().transform(Srs::Wgs84);
        for k in &keys {
            assert_eq!(k.level, 1);
            assert!(k.extent().intersects(&e, true), "{k} misses {e}");
        }
    }

    #[test]
    fn test_intersecting_keys_boundary_edge_excluded() {
        // Exactly the western hemisphere at level 0: only column 0.
        let e = GeoExtent::new(Srs::Wgs84, -180.0, -90.0, 0.0, 90.0);
        let keys = TileKey::intersecting_keys_for_extent(&e, 0, &Profile::global_geodetic());
        assert_eq!(keys, vec![gg(0, 0, 0)]);
    }

    #[test]
    fn test_intersecting_keys_across_antimeridian() {
        let e = GeoExtent::new(Srs::Wgs84, 170.0, 10.0, -170.0, 20.0);
        let keys = TileKey::intersecting_keys_for_extent(&e, 1, &Profile::global_geodetic());
        let cols: HashSet<u32> = keys.iter().map(|k| k.x).collect();
        assert_eq!(cols, HashSet::from([0, 3]));
    }

    #[test]
    fn test_eq_hash_ord_agree() {
        let a = gg(2, 1, 1);
        let b = TileKey::new(2, 1, 1, Profile::new(Srs::Wgs84, None, 2, 1));
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        let set: HashSet<TileKey> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert!(a < gg(2, 2, 0));
        assert!(a < gg(3, 0, 0));
    }
}
