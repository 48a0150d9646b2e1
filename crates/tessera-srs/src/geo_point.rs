use std::fmt;

use glam::DVec3;

use crate::{Srs, SrsError};

/// A 3D point tagged with its reference system.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeoPoint {
    pub srs: Srs,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GeoPoint {
    pub fn new(srs: Srs, x: f64, y: f64, z: f64) -> Self {
        Self { srs, x, y, z }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.srs.is_valid()
    }

    #[inline]
    #[must_use]
    pub fn to_dvec3(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// Express this point in another reference system.
    pub fn transform(&self, to: Srs) -> Result<GeoPoint, SrsError> {
        let p = self.srs.to(to).transform(self.to_dvec3())?;
        Ok(GeoPoint::new(to, p.x, p.y, p.z))
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}) [{}]", self.x, self.y, self.z, self.srs)
    }
}
