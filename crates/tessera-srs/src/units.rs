//! Units of measure for SRS coordinates.

/// Horizontal units of a spatial reference system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Units {
    Degrees,
    Radians,
    Meters,
    Kilometers,
}

impl Units {
    /// True for angular units.
    #[must_use]
    pub fn is_angular(self) -> bool {
        matches!(self, Units::Degrees | Units::Radians)
    }

    /// True for linear units.
    #[must_use]
    pub fn is_linear(self) -> bool {
        !self.is_angular()
    }

    /// Convert a value from `self` to `to`.
    ///
    /// Returns `None` when converting between an angular and a linear unit,
    /// which requires a reference ellipsoid and latitude
    /// (see [`crate::Srs::transform_units`]).
    #[must_use]
    pub fn convert_to(self, to: Units, value: f64) -> Option<f64> {
        if self.is_angular() != to.is_angular() {
            return None;
        }
        Some(value * self.to_base() / to.to_base())
    }

    /// Scale factor to the base unit of the family (degrees or meters).
    fn to_base(self) -> f64 {
        match self {
            Units::Degrees => 1.0,
            Units::Radians => 180.0 / std::f64::consts::PI,
            Units::Meters => 1.0,
            Units::Kilometers => 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_conversion() {
        assert_eq!(Units::Kilometers.convert_to(Units::Meters, 2.5), Some(2500.0));
    }

    #[test]
    fn test_angular_conversion() {
        let deg = Units::Radians
            .convert_to(Units::Degrees, std::f64::consts::PI)
            .unwrap();
        assert!((deg - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_family_conversion_is_refused() {
        assert_eq!(Units::Degrees.convert_to(Units::Meters, 1.0), None);
    }
}
