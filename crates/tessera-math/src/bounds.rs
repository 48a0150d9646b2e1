use glam::DVec3;

/// Axis-aligned bounding box in f64 space.
///
/// A default-constructed `Bounds` is empty (`min > max` on every axis) and
/// reports `is_valid() == false` until something is added to it. The z range
/// is optional: 2D boxes keep `zmin == zmax == 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// The empty box. Expanding it by a point yields a zero-size box at that point.
    pub const EMPTY: Bounds = Bounds {
        xmin: f64::MAX,
        ymin: f64::MAX,
        zmin: f64::MAX,
        xmax: -f64::MAX,
        ymax: -f64::MAX,
        zmax: -f64::MAX,
    };

    /// Create a 2D box. The z range is set to zero.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            zmin: 0.0,
            xmax,
            ymax,
            zmax: 0.0,
        }
    }

    /// Create a 3D box.
    pub fn new_3d(xmin: f64, ymin: f64, zmin: f64, xmax: f64, ymax: f64, zmax: f64) -> Self {
        Self {
            xmin,
            ymin,
            zmin,
            xmax,
            ymax,
            zmax,
        }
    }

    /// True if the box has non-negative extent on the x and y axes
    /// and no NaN components.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
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

    #[inline]
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.zmax - self.zmin
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        DVec3::new(
            (self.xmin + self.xmax) * 0.5,
            (self.ymin + self.ymax) * 0.5,
            (self.zmin + self.zmax) * 0.5,
        )
    }

    /// True if the 2D point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.is_valid() && x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// True if the 2D footprints overlap (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.xmin <= other.xmax
            && self.xmax >= other.xmin
            && self.ymin <= other.ymax
            && self.ymax >= other.ymin
    }

    /// Grow the box to include a point.
    pub fn expand_to_include(&mut self, p: DVec3) {
        self.xmin = self.xmin.min(p.x);
        self.ymin = self.ymin.min(p.y);
        self.zmin = self.zmin.min(p.z);
        self.xmax = self.xmax.max(p.x);
        self.ymax = self.ymax.max(p.y);
        self.zmax = self.zmax.max(p.z);
    }

    /// 2D intersection of two boxes. Returns [`Bounds::EMPTY`] if disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Bounds) -> Bounds {
        if !self.intersects(other) {
            return Bounds::EMPTY;
        }
        Bounds::new_3d(
            self.xmin.max(other.xmin),
            self.ymin.max(other.ymin),
            self.zmin.max(other.zmin),
            self.xmax.min(other.xmax),
            self.ymax.min(other.ymax),
            self.zmax.min(other.zmax),
        )
    }
}
