//! Tile pyramid profiles: quad-tree tiling schemes over a bounded extent.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use glam::DVec3;
use rustc_hash::FxHasher;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tessera_math::{Bounds, clamp, equiv, soft_assert, soft_assert_or_return};
use tessera_srs::{GeoExtent, Srs};

use crate::{ProfileDescriptor, ProfileError, TileKey};

/// Level returned by [`Profile::level_of_detail_for_horiz_resolution`] for unusable input.
const FALLBACK_RESOLUTION_LEVEL: u32 = 23;

static GLOBAL_GEODETIC: LazyLock<Profile> =
    LazyLock::new(|| Profile::from_well_known_name("global-geodetic"));

static SPHERICAL_MERCATOR: LazyLock<Profile> =
    LazyLock::new(|| Profile::from_well_known_name("spherical-mercator"));

#[derive(Debug, Default)]
struct ProfileData {
    extent: GeoExtent,
    geodetic_extent: GeoExtent,
    num_tiles_base_x: u32,
    num_tiles_base_y: u32,
    well_known_name: Option<String>,
    hash: u64,
}

/// A quad-tree tiling scheme.
///
/// Level 0 holds `num_tiles(0)` tiles; each level doubles the count on both
/// axes. Rows count downward from the top (north) edge, columns eastward from
/// the left edge.
///
/// Cloning is cheap: clones share one immutable payload. The default value is
/// the invalid profile.
#[derive(Clone, Default)]
pub struct Profile {
    shared: Arc<ProfileData>,
}

impl Profile {
    /// Create a profile from an SRS, optional bounds, and level-0 tile counts.
    ///
    /// Missing or invalid bounds fall back to the SRS's natural bounds. A zero
    /// tile count on either axis derives both counts from the aspect ratio of
    /// the bounds. An invalid SRS yields the invalid profile.
    pub fn new(srs: Srs, bounds: Option<Bounds>, base_x: u32, base_y: u32) -> Profile {
        Self::build(srs, bounds, base_x, base_y, None)
    }

    /// Create one of the named profiles: `global-geodetic`, `spherical-mercator`,
    /// `plate-carree` (also `plate-carre`, `eqc-wgs84`), `moon`, or a
    /// `+proj=longlat` definition. Unknown names yield the invalid profile.
    pub fn from_well_known_name(name: &str) -> Profile {
        let lower = name.trim().to_ascii_lowercase();
        let geodetic_bounds = Bounds::new(-180.0, -90.0, 180.0, 90.0);
        match lower.as_str() {
            "global-geodetic" => Self::build(Srs::Wgs84, Some(geodetic_bounds), 2, 1, Some(lower)),
            "spherical-mercator" => {
                let bounds = Srs::SphericalMercator.bounds();
                Self::build(Srs::SphericalMercator, Some(bounds), 1, 1, Some(lower))
            }
            "plate-carree" | "plate-carre" | "eqc-wgs84" => {
                match Srs::Wgs84
                    .to(Srs::PlateCarree)
                    .transform(DVec3::new(180.0, 90.0, 0.0))
                {
                    Ok(ex) => Self::build(
                        Srs::PlateCarree,
                        Some(Bounds::new(-ex.x, -ex.y, ex.x, ex.y)),
                        2,
                        1,
                        Some(lower),
                    ),
                    Err(err) => {
                        tracing::warn!(%err, "failed to compute plate carrée bounds");
                        Profile::default()
                    }
                }
            }
            "moon" => Self::build(Srs::Moon, Some(geodetic_bounds), 2, 1, Some(lower)),
            _ if lower.contains("+proj=longlat") => match Srs::from_definition(name) {
                Ok(srs) => Self::build(srs, Some(geodetic_bounds), 2, 1, None),
                Err(err) => {
                    tracing::warn!(%err, "unsupported geodetic profile definition");
                    Profile::default()
                }
            },
            _ => {
                tracing::warn!(name, "unknown well-known profile");
                Profile::default()
            }
        }
    }

    /// The `global-geodetic` profile.
    pub fn global_geodetic() -> Profile {
        GLOBAL_GEODETIC.clone()
    }

    /// The `spherical-mercator` profile.
    pub fn spherical_mercator() -> Profile {
        SPHERICAL_MERCATOR.clone()
    }

    fn build(
        srs: Srs,
        bounds: Option<Bounds>,
        base_x: u32,
        base_y: u32,
        well_known_name: Option<String>,
    ) -> Profile {
        if !srs.is_valid() {
            tracing::debug!("profile requested with an invalid SRS");
            return Profile::default();
        }

        let bounds = bounds
            .filter(Bounds::is_valid)
            .unwrap_or_else(|| srs.bounds());

        let (num_tiles_base_x, num_tiles_base_y) = if base_x == 0 || base_y == 0 {
            base_tile_counts(&bounds)
        } else {
            (base_x, base_y)
        };

        let extent = GeoExtent::from_bounds(srs, &bounds);
        let geodetic_extent = if srs.is_geodetic() {
            extent
        } else {
            extent.transform(srs.geodetic_srs())
        };

        let mut data = ProfileData {
            extent,
            geodetic_extent,
            num_tiles_base_x,
            num_tiles_base_y,
            well_known_name,
            hash: 0,
        };
        data.hash = compute_content_hash(&data);
        Profile {
            shared: Arc::new(data),
        }
    }

    /// Valid iff the SRS and extent are both valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.shared.extent.is_valid()
    }

    #[must_use]
    pub fn srs(&self) -> Srs {
        self.shared.extent.srs()
    }

    #[must_use]
    pub fn extent(&self) -> GeoExtent {
        self.shared.extent
    }

    /// The extent expressed in the geodetic system of the same body.
    #[must_use]
    pub fn geodetic_extent(&self) -> GeoExtent {
        self.shared.geodetic_extent
    }

    #[must_use]
    pub fn well_known_name(&self) -> Option<&str> {
        self.shared.well_known_name.as_deref()
    }

    /// Content hash of the descriptor.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        self.shared.hash
    }

    /// The well-known name if there is one, otherwise the JSON descriptor.
    #[must_use]
    pub fn readable_name(&self) -> String {
        match self.well_known_name() {
            Some(name) => name.to_string(),
            None => self.to_json().unwrap_or_else(|_| "invalid".to_string()),
        }
    }

    /// Same well-known name, or same tile counts, extent, and SRS.
    /// Invalid profiles are never equivalent to anything.
    #[must_use]
    pub fn equivalent_to(&self, other: &Profile) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        if Arc::ptr_eq(&self.shared, &other.shared) {
            return true;
        }
        if let (Some(a), Some(b)) = (self.well_known_name(), other.well_known_name()) {
            if a == b {
                return true;
            }
        }
        self.shared.num_tiles_base_x == other.shared.num_tiles_base_x
            && self.shared.num_tiles_base_y == other.shared.num_tiles_base_y
            && self.shared.extent == other.shared.extent
            && self.srs().equivalent_to(other.srs())
    }

    /// Equivalent, or defined on horizontally equivalent SRSs.
    #[must_use]
    pub fn horizontally_equivalent_to(&self, other: &Profile) -> bool {
        if self.equivalent_to(other) {
            return true;
        }
        self.is_valid() && other.is_valid() && self.srs().horizontally_equivalent_to(other.srs())
    }

    /// Tile (width, height) at a level.
    #[must_use]
    pub fn tile_dimensions(&self, level: u32) -> (f64, f64) {
        if !self.is_valid() {
            return (0.0, 0.0);
        }
        let factor = f64::from(level).exp2();
        let extent = &self.shared.extent;
        (
            extent.width() / f64::from(self.shared.num_tiles_base_x) / factor,
            extent.height() / f64::from(self.shared.num_tiles_base_y) / factor,
        )
    }

    /// Tile counts (columns, rows) at a level. Saturates at `u32::MAX`.
    #[must_use]
    pub fn num_tiles(&self, level: u32) -> (u32, u32) {
        let factor = 1u32.checked_shl(level).unwrap_or(u32::MAX);
        (
            self.shared.num_tiles_base_x.saturating_mul(factor),
            self.shared.num_tiles_base_y.saturating_mul(factor),
        )
    }

    /// Extent of the tile at (`col`, `row`) on `level`.
    #[must_use]
    pub fn tile_extent(&self, level: u32, col: u32, row: u32) -> GeoExtent {
        if !self.is_valid() {
            return GeoExtent::INVALID;
        }
        let (width, height) = self.tile_dimensions(level);
        let xmin = self.shared.extent.xmin() + width * f64::from(col);
        let ymax = self.shared.extent.ymax() - height * f64::from(row);
        GeoExtent::new(self.srs(), xmin, ymax - height, xmin + width, ymax)
    }

    /// Level whose tile height is closest to `height` (in this profile's units).
    #[must_use]
    pub fn level_of_detail(&self, height: f64) -> u32 {
        self.closest_level(height)
    }

    /// Level in this profile matching the resolution of `other_level` in `other`.
    pub fn equivalent_lod(&self, other: &Profile, other_level: u32) -> u32 {
        soft_assert_or_return!(other.is_valid(), other_level, "equivalent_lod: invalid profile");

        if self.horizontally_equivalent_to(other) {
            return other_level;
        }

        // Geodetic and mercator pyramids line up level for level.
        if other.horizontally_equivalent_to(&SPHERICAL_MERCATOR)
            && self.horizontally_equivalent_to(&GLOBAL_GEODETIC)
        {
            return other_level;
        }
        if other.horizontally_equivalent_to(&GLOBAL_GEODETIC)
            && self.horizontally_equivalent_to(&SPHERICAL_MERCATOR)
        {
            return other_level;
        }

        let (width, height) = other.tile_dimensions(other_level);
        if equiv(width, 0.0) || equiv(height, 0.0) {
            tracing::warn!(other_level, "equivalent_lod: zero tile dimension");
            return other_level;
        }

        let target = Srs::transform_units(height, other.srs(), self.srs(), 0.0).unwrap_or(height);
        self.closest_level(target)
    }

    /// Greedy search from level 0, stopping at the first level that does not
    /// move closer to `target`.
    fn closest_level(&self, target: f64) -> u32 {
        let mut level = 0;
        let mut best = 0;
        let mut delta = f64::MAX;
        loop {
            let previous = delta;
            let (_, height) = self.tile_dimensions(level);
            delta = (height - target).abs();
            if delta < previous {
                best = level;
            } else {
                break;
            }
            level += 1;
        }
        best
    }

    /// Smallest level whose per-pixel resolution, for tiles of `tile_size`
    /// pixels, is at least as fine as `resolution`.
    #[must_use]
    pub fn level_of_detail_for_horiz_resolution(&self, resolution: f64, tile_size: u32) -> u32 {
        if tile_size == 0 || !(resolution > 0.0) || !self.is_valid() {
            return FALLBACK_RESOLUTION_LEVEL;
        }
        let mut tile_res = (self.shared.extent.width() / f64::from(self.shared.num_tiles_base_x))
            / f64::from(tile_size);
        let mut level = 0;
        while tile_res > resolution {
            level += 1;
            tile_res *= 0.5;
        }
        level
    }

    /// Reproject `input` into this profile's SRS and clamp it to the profile's
    /// extent. The flag reports whether clamping changed the extent.
    ///
    /// When the direct reprojection fails (typically a point outside the
    /// target projection's domain) the clamp happens in geodetic space first.
    /// Returns the invalid extent when no overlap remains.
    pub fn clamp_and_transform_extent(&self, input: &GeoExtent) -> (GeoExtent, bool) {
        if !input.is_valid() || !self.is_valid() {
            return (GeoExtent::INVALID, false);
        }

        let extent = self.extent();
        if input.is_whole_earth() {
            return (extent, !extent.is_whole_earth());
        }

        let in_my_srs = input.transform(self.srs());
        if in_my_srs.is_valid() {
            let intersection = in_my_srs.intersection_same_srs(&extent);
            let clamped = intersection != in_my_srs;
            return (intersection, clamped);
        }

        tracing::debug!(%input, profile = %self, "direct reprojection failed, clamping in geodetic space");

        let gcs_input = if input.srs().is_geodetic() {
            *input
        } else {
            input.transform(self.srs().geodetic_srs())
        };
        if !gcs_input.is_valid() {
            return (GeoExtent::INVALID, false);
        }

        let geo = self.geodetic_extent();
        if !gcs_input.intersects(&geo, false) {
            return (GeoExtent::INVALID, false);
        }

        let clamped_gcs = GeoExtent::new(
            gcs_input.srs(),
            clamp(gcs_input.xmin(), geo.xmin(), geo.xmax()),
            clamp(gcs_input.ymin(), geo.ymin(), geo.ymax()),
            clamp(gcs_input.xmax(), geo.xmin(), geo.xmax()),
            clamp(gcs_input.ymax(), geo.ymin(), geo.ymax()),
        );
        let clamped = clamped_gcs != gcs_input;

        let result = if clamped_gcs.srs() == self.srs() {
            clamped_gcs
        } else {
            clamped_gcs.transform(self.srs())
        };
        soft_assert!(result.is_valid(), "clamped extent {clamped_gcs} failed to reproject");
        (result, clamped)
    }

    /// Reproject `input` into this profile's SRS and split the result at the
    /// antimeridian. Yields one or two extents, or none if nothing overlaps.
    pub fn transform_and_extract_contiguous_extents(&self, input: &GeoExtent) -> Vec<GeoExtent> {
        soft_assert_or_return!(
            self.is_valid() && input.is_valid(),
            Vec::new(),
            "contiguous extents requested from invalid input"
        );

        let target = if self.srs().horizontally_equivalent_to(input.srs()) {
            *input
        } else {
            let (target, _) = self.clamp_and_transform_extent(input);
            if !target.is_valid() {
                return Vec::new();
            }
            target
        };

        match target.split_across_antimeridian() {
            Some((west, east)) => vec![west, east],
            None => vec![target],
        }
    }

    /// Tile keys of level 0.
    #[must_use]
    pub fn root_keys(&self) -> Vec<TileKey> {
        self.all_keys_at_lod(0)
    }

    /// Every tile key on a level, column-major.
    pub fn all_keys_at_lod(&self, level: u32) -> Vec<TileKey> {
        soft_assert_or_return!(self.is_valid(), Vec::new());
        let (tx, ty) = self.num_tiles(level);
        let mut keys = Vec::with_capacity(tx as usize * ty as usize);
        for col in 0..tx {
            for row in 0..ty {
                keys.push(TileKey::new(level, col, row, self.clone()));
            }
        }
        keys
    }

    /// The same bounds and tile counts, reinterpreted in another SRS.
    #[must_use]
    pub fn override_srs(&self, srs: Srs) -> Profile {
        Profile::new(
            srs,
            Some(self.shared.extent.bounds()),
            self.shared.num_tiles_base_x,
            self.shared.num_tiles_base_y,
        )
    }

    /// Compact descriptor. `None` for invalid profiles.
    #[must_use]
    pub fn descriptor(&self) -> Option<ProfileDescriptor> {
        descriptor_of(&self.shared)
    }

    /// Rebuild a profile from its descriptor.
    pub fn from_descriptor(descriptor: &ProfileDescriptor) -> Profile {
        match descriptor {
            ProfileDescriptor::WellKnown(name) => Profile::from_well_known_name(name),
            ProfileDescriptor::Explicit { extent, tx, ty } if extent.is_valid() => {
                Profile::new(extent.srs(), Some(extent.bounds()), *tx, *ty)
            }
            ProfileDescriptor::Explicit { .. } => Profile::default(),
        }
    }

    /// Serialize the descriptor as JSON (`null` for invalid profiles).
    pub fn to_json(&self) -> Result<String, ProfileError> {
        serde_json::to_string(&self.descriptor()).map_err(ProfileError::Serialize)
    }

    /// Parse a JSON descriptor. `null` yields the invalid profile.
    pub fn from_json(json: &str) -> Result<Profile, ProfileError> {
        let descriptor: Option<ProfileDescriptor> =
            serde_json::from_str(json).map_err(ProfileError::Parse)?;
        Ok(descriptor
            .as_ref()
            .map(Profile::from_descriptor)
            .unwrap_or_default())
    }

    /// Key covering exactly what equivalence compares.
    pub(crate) fn structure_key(&self) -> (&'static str, u32, u32, [u64; 4]) {
        if !self.is_valid() {
            return ("", 0, 0, [0; 4]);
        }
        let e = &self.shared.extent;
        // +0.0 folds -0.0 into 0.0 so equal values share bits.
        let bits = |v: f64| (v + 0.0).to_bits();
        (
            e.srs().definition(),
            self.shared.num_tiles_base_x,
            self.shared.num_tiles_base_y,
            [bits(e.xmin()), bits(e.ymin()), bits(e.xmax()), bits(e.ymax())],
        )
    }
}

/// Level-0 tile counts from the aspect ratio of `bounds`.
fn base_tile_counts(bounds: &Bounds) -> (u32, u32) {
    if !bounds.is_valid() || !(bounds.width() > 0.0) || !(bounds.height() > 0.0) {
        return (1, 1);
    }
    let ar = bounds.width() / bounds.height();
    if ar >= 1.0 {
        ((ar.round() as u32).max(1), 1)
    } else {
        (1, ((1.0 / ar).round() as u32).max(1))
    }
}

fn descriptor_of(data: &ProfileData) -> Option<ProfileDescriptor> {
    if !data.extent.is_valid() {
        return None;
    }
    Some(match &data.well_known_name {
        Some(name) => ProfileDescriptor::WellKnown(name.clone()),
        None => ProfileDescriptor::Explicit {
            extent: data.extent,
            tx: data.num_tiles_base_x,
            ty: data.num_tiles_base_y,
        },
    })
}

fn compute_content_hash(data: &ProfileData) -> u64 {
    let mut hasher = FxHasher::default();
    if let Ok(json) = serde_json::to_string(&descriptor_of(data)) {
        json.hash(&mut hasher);
    }
    hasher.finish()
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent_to(other) || (!self.is_valid() && !other.is_valid())
    }
}

impl Eq for Profile {}

impl Hash for Profile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.structure_key().hash(state);
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.readable_name())
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.shared.well_known_name)
            .field("extent", &self.shared.extent)
            .field("tx", &self.shared.num_tiles_base_x)
            .field("ty", &self.shared.num_tiles_base_y)
            .finish()
    }
}

impl FromStr for Profile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let profile = Profile::from_well_known_name(s);
        if profile.is_valid() {
            Ok(profile)
        } else {
            Err(ProfileError::UnknownName(s.to_string()))
        }
    }
}

impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.descriptor().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Profile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let descriptor = Option::<ProfileDescriptor>::deserialize(deserializer)?;
        Ok(descriptor
            .as_ref()
            .map(Profile::from_descriptor)
            .unwrap_or_default())
    }
}
