//! Incrementally grown bounding spheres.

use glam::DVec3;

/// A bounding sphere in f64 space.
///
/// A negative radius marks the sphere as empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere.
    pub center: DVec3,
    /// Radius of the sphere. Negative when empty.
    pub radius: f64,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingSphere {
    /// A sphere containing nothing.
    pub const EMPTY: BoundingSphere = BoundingSphere {
        center: DVec3::ZERO,
        radius: -1.0,
    };

    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.radius >= 0.0
    }

    /// Grow the sphere to include `p`.
    ///
    /// The first point added to an empty sphere becomes its center. A point
    /// outside the sphere pulls the center half the excess distance toward
    /// it and grows the radius by the same amount. This is a running bound,
    /// not the minimal enclosing sphere.
    pub fn expand_to_include(&mut self, p: DVec3) {
        if !self.is_valid() {
            self.center = p;
            self.radius = 0.0;
            return;
        }
        let dv = p - self.center;
        let r = dv.length();
        if r > self.radius {
            let dr = 0.5 * (r - self.radius);
            self.center += dv * (dr / r);
            self.radius += dr;
        }
    }

    /// True if `p` lies inside or on the sphere (with a small tolerance).
    #[must_use]
    pub fn contains(&self, p: DVec3) -> bool {
        self.is_valid() && (p - self.center).length() <= self.radius * (1.0 + 1e-9) + 1e-9
    }
}
