//! Georeferenced axis-aligned extents.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tessera_math::{Bounds, EPSILON};

use crate::{GeoPoint, Srs};

/// Number of samples taken along each edge when reprojecting an extent.
const EDGE_SAMPLES: usize = 16;

/// A 2D extent in a spatial reference system.
///
/// Geodetic extents may run past +180° (or before -180°) to represent a
/// region crossing the antimeridian; they are never normalized on construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExtentRecord", into = "ExtentRecord")]
pub struct GeoExtent {
    srs: Srs,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl Default for GeoExtent {
    fn default() -> Self {
        Self::INVALID
    }
}

impl GeoExtent {
    /// The invalid extent.
    pub const INVALID: GeoExtent = GeoExtent {
        srs: Srs::Invalid,
        xmin: 0.0,
        ymin: 0.0,
        xmax: -1.0,
        ymax: -1.0,
    };

    /// Create an extent. For geodetic systems a `xmax` west of `xmin` is read as
    /// crossing the antimeridian and is unwrapped by +360°.
    pub fn new(srs: Srs, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        let xmax = if srs.is_geodetic() && xmax < xmin {
            xmax + 360.0
        } else {
            xmax
        };
        Self {
            srs,
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn from_bounds(srs: Srs, b: &Bounds) -> Self {
        if !b.is_valid() {
            return Self::INVALID;
        }
        Self::new(srs, b.xmin, b.ymin, b.xmax, b.ymax)
    }

    /// Valid SRS, finite coordinates, non-negative width and height.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.srs.is_valid()
            && [self.xmin, self.ymin, self.xmax, self.ymax]
                .iter()
                .all(|v| v.is_finite())
            && self.width() >= 0.0
            && self.height() >= 0.0
    }

    #[inline]
    #[must_use]
    pub fn srs(&self) -> Srs {
        self.srs
    }

    #[inline]
    #[must_use]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    #[inline]
    #[must_use]
    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    #[inline]
    #[must_use]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    #[inline]
    #[must_use]
    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        if !self.is_valid() {
            return Bounds::EMPTY;
        }
        Bounds::new(self.xmin, self.ymin, self.xmax, self.ymax)
    }

    #[must_use]
    pub fn centroid(&self) -> GeoPoint {
        if !self.is_valid() {
            return GeoPoint::default();
        }
        GeoPoint::new(
            self.srs,
            0.5 * (self.xmin + self.xmax),
            0.5 * (self.ymin + self.ymax),
            0.0,
        )
    }

    /// True for a geodetic extent covering the whole globe.
    #[must_use]
    pub fn is_whole_earth(&self) -> bool {
        self.is_valid()
            && self.srs.is_geodetic()
            && self.width() >= 360.0 - EPSILON
            && self.height() >= 180.0 - EPSILON
    }

    /// True for a geodetic extent that runs past ±180° longitude.
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.is_valid()
            && self.srs.is_geodetic()
            && !self.is_whole_earth()
            && (self.xmax > 180.0 + EPSILON || self.xmin < -180.0 - EPSILON)
    }

    /// Split an antimeridian-crossing extent into its western and eastern parts,
    /// both within [-180, 180]. Returns `None` if the extent does not cross.
    #[must_use]
    pub fn split_across_antimeridian(&self) -> Option<(GeoExtent, GeoExtent)> {
        if !self.crosses_antimeridian() {
            return None;
        }
        let (xmin, xmax) = if self.xmax > 180.0 {
            (self.xmin, self.xmax - 360.0)
        } else {
            (self.xmin + 360.0, self.xmax)
        };
        Some((
            GeoExtent::new(self.srs, xmin, self.ymin, 180.0, self.ymax),
            GeoExtent::new(self.srs, -180.0, self.ymin, xmax, self.ymax),
        ))
    }

    /// True if the point (in this extent's SRS) is inside or on the boundary.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if !self.is_valid() {
            return false;
        }
        let in_y = y >= self.ymin - EPSILON && y <= self.ymax + EPSILON;
        let in_x = |x: f64| x >= self.xmin - EPSILON && x <= self.xmax + EPSILON;
        if self.srs.is_geodetic() {
            in_y && (in_x(x) || in_x(x + 360.0) || in_x(x - 360.0))
        } else {
            in_y && in_x(x)
        }
    }

    /// True if a point, transformed into this extent's SRS, is contained.
    #[must_use]
    pub fn contains_point(&self, p: &GeoPoint) -> bool {
        match p.transform(self.srs) {
            Ok(q) => self.contains(q.x, q.y),
            Err(_) => false,
        }
    }

    /// True if the footprints overlap. With `check_srs` the systems must be
    /// horizontally equivalent; without it the coordinates are compared as-is.
    #[must_use]
    pub fn intersects(&self, other: &GeoExtent, check_srs: bool) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        if check_srs && !self.srs.horizontally_equivalent_to(other.srs) {
            return false;
        }
        if self.srs.is_geodetic() {
            [-360.0, 0.0, 360.0]
                .iter()
                .any(|shift| self.bounds().intersects(&other.shifted(*shift).bounds()))
        } else {
            self.bounds().intersects(&other.bounds())
        }
    }

    /// Intersection with an extent in the same SRS. Invalid if they differ or are disjoint.
    #[must_use]
    pub fn intersection_same_srs(&self, other: &GeoExtent) -> GeoExtent {
        if !self.is_valid() || !other.is_valid() || !self.srs.horizontally_equivalent_to(other.srs) {
            return GeoExtent::INVALID;
        }
        let shifts: &[f64] = if self.srs.is_geodetic() {
            &[0.0, -360.0, 360.0]
        } else {
            &[0.0]
        };
        for shift in shifts {
            let b = self.bounds().intersection(&other.shifted(*shift).bounds());
            if b.is_valid() {
                return GeoExtent::new(self.srs, b.xmin, b.ymin, b.xmax, b.ymax);
            }
        }
        GeoExtent::INVALID
    }

    /// Grow to include a point in this extent's SRS.
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        if !self.is_valid() {
            return;
        }
        self.xmin = self.xmin.min(x);
        self.ymin = self.ymin.min(y);
        self.xmax = self.xmax.max(x);
        self.ymax = self.ymax.max(y);
    }

    /// Reproject into another SRS by sampling the edges and the interior.
    ///
    /// Returns the invalid extent if any sample fails to transform.
    #[must_use]
    pub fn transform(&self, to: Srs) -> GeoExtent {
        if !self.is_valid() || !to.is_valid() {
            return GeoExtent::INVALID;
        }
        if self.srs == to {
            return *self;
        }
        let op = self.srs.to(to);
        let mut out = Bounds::EMPTY;
        for j in 0..=EDGE_SAMPLES {
            let y = self.ymin + self.height() * j as f64 / EDGE_SAMPLES as f64;
            for i in 0..=EDGE_SAMPLES {
                let x = self.xmin + self.width() * i as f64 / EDGE_SAMPLES as f64;
                match op.transform(DVec3::new(x, y, 0.0)) {
                    Ok(p) => out.expand_to_include(p),
                    Err(err) => {
                        tracing::trace!(%err, "extent sample failed to transform");
                        return GeoExtent::INVALID;
                    }
                }
            }
        }
        GeoExtent::from_bounds(to, &out)
    }

    fn shifted(&self, dx: f64) -> GeoExtent {
        GeoExtent {
            xmin: self.xmin + dx,
            xmax: self.xmax + dx,
            ..*self
        }
    }
}

impl fmt::Display for GeoExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("INVALID");
        }
        write!(
            f,
            "SW={},{} NE={},{} [{}]",
            self.xmin, self.ymin, self.xmax, self.ymax, self.srs
        )
    }
}

/// Serialized form of a [`GeoExtent`].
#[derive(Serialize, Deserialize)]
struct ExtentRecord {
    srs: Srs,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl From<ExtentRecord> for GeoExtent {
    fn from(r: ExtentRecord) -> Self {
        GeoExtent::new(r.srs, r.xmin, r.ymin, r.xmax, r.ymax)
    }
}

impl From<GeoExtent> for ExtentRecord {
    fn from(e: GeoExtent) -> Self {
        ExtentRecord {
            srs: e.srs,
            xmin: e.xmin,
            ymin: e.ymin,
            xmax: e.xmax,
            ymax: e.ymax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> GeoExtent {
        GeoExtent::new(Srs::Wgs84, xmin, ymin, xmax, ymax)
    }

    #[test]
    fn test_default_is_invalid() {
        assert!(!GeoExtent::default().is_valid());
        assert!(!GeoExtent::new(Srs::Invalid, 0.0, 0.0, 1.0, 1.0).is_valid());
    }

    #[test]
    fn test_whole_earth() {
        assert!(geo(-180.0, -90.0, 180.0, 90.0).is_whole_earth());
        assert!(!geo(-180.0, -90.0, 0.0, 90.0).is_whole_earth());
    }

    #[test]
    fn test_reversed_longitudes_cross_antimeridian() {
        let e = geo(170.0, -10.0, -170.0, 10.0);
        assert_eq!(e.xmax(), 190.0);
        assert!(e.crosses_antimeridian());
        let (west, east) = e.split_across_antimeridian().unwrap();
        assert_eq!((west.xmin(), west.xmax()), (170.0, 180.0));
        assert_eq!((east.xmin(), east.xmax()), (-180.0, -170.0));
        assert!(!west.crosses_antimeridian());
    }

    #[test]
    fn test_non_crossing_extent_does_not_split() {
        assert!(geo(-10.0, -10.0, 10.0, 10.0).split_across_antimeridian().is_none());
    }

    #[test]
    fn test_geodetic_contains_wraps_longitude() {
        let e = geo(170.0, -10.0, -170.0, 10.0);
        assert!(e.contains(-175.0, 0.0));
        assert!(e.contains(175.0, 0.0));
        assert!(!e.contains(0.0, 0.0));
    }

    #[test]
    fn test_intersection_same_srs() {
        let a = geo(-10.0, -10.0, 10.0, 10.0);
        let b = geo(0.0, 0.0, 20.0, 20.0);
        assert_eq!(a.intersection_same_srs(&b), geo(0.0, 0.0, 10.0, 10.0));
        assert!(!a.intersection_same_srs(&geo(50.0, 50.0, 60.0, 60.0)).is_valid());
    }

    #[test]
    fn test_intersection_rejects_other_srs() {
        let a = geo(-10.0, -10.0, 10.0, 10.0);
        let m = GeoExtent::new(Srs::SphericalMercator, 0.0, 0.0, 1.0, 1.0);
        assert!(!a.intersection_same_srs(&m).is_valid());
        assert!(!a.intersects(&m, true));
        assert!(a.intersects(&m, false));
    }

    #[test]
    fn test_transform_to_mercator_and_back() {
        let e = geo(-45.0, -30.0, 45.0, 30.0);
        let m = e.transform(Srs::SphericalMercator);
        assert!(m.is_valid());
        assert!(m.xmax() > 5_000_000.0);
        let back = m.transform(Srs::Wgs84);
        assert!((back.xmin() - e.xmin()).abs() < 1e-6);
        assert!((back.ymax() - e.ymax()).abs() < 1e-6);
    }

    #[test]
    fn test_transform_through_pole_fails_for_mercator() {
        let e = geo(-10.0, 0.0, 10.0, 90.0);
        assert!(!e.transform(Srs::SphericalMercator).is_valid());
    }

    #[test]
    fn test_serde_record() {
        let e = geo(-180.0, -90.0, 0.0, 90.0);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"srs\":\"wgs84\""));
        let back: GeoExtent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
