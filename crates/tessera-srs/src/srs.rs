//! Spatial reference systems and point operations between them.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::{Ellipsoid, SrsError, Units};

/// Half the width of the spherical Mercator square, in meters.
const MERCATOR_HALF_EXTENT: f64 = 20_037_508.342_789_25;

/// A spatial reference system.
///
/// Serialized as its canonical definition string (see [`Srs::definition`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Srs {
    /// The empty SRS. Every operation involving it fails.
    #[default]
    Invalid,
    /// Geographic longitude/latitude on WGS84 (EPSG:4326).
    Wgs84,
    /// Earth-centered, earth-fixed cartesian on WGS84 (EPSG:4978).
    Ecef,
    /// Spherical ("web") Mercator (EPSG:3857).
    SphericalMercator,
    /// Equirectangular projection of WGS84 (EPSG:4087).
    PlateCarree,
    /// Geographic longitude/latitude on the lunar sphere.
    Moon,
    /// Moon-centered cartesian.
    MoonGeocentric,
}

impl Srs {
    /// Parse a definition string. Matching is case-insensitive.
    ///
    /// Accepts well-known names (`wgs84`, `spherical-mercator`, `plate-carree`,
    /// `moon`, `ecef`), EPSG codes, and the `+proj=longlat` / `+proj=merc` /
    /// `+proj=eqc` / `+proj=geocent` PROJ strings.
    pub fn from_definition(def: &str) -> Result<Srs, SrsError> {
        let lower = def.trim().to_ascii_lowercase();
        let srs = match lower.as_str() {
            "wgs84" | "epsg:4326" | "global-geodetic" => Srs::Wgs84,
            "ecef" | "geocentric" | "epsg:4978" => Srs::Ecef,
            "spherical-mercator" | "epsg:3857" | "epsg:900913" => Srs::SphericalMercator,
            "plate-carree" | "plate-carre" | "eqc-wgs84" | "epsg:4087" => Srs::PlateCarree,
            "moon" => Srs::Moon,
            "moon-geocentric" => Srs::MoonGeocentric,
            other if other.starts_with("+proj=") => return Self::from_proj_string(other, def),
            _ => return Err(SrsError::UnknownDefinition(def.to_string())),
        };
        Ok(srs)
    }

    fn from_proj_string(lower: &str, original: &str) -> Result<Srs, SrsError> {
        let mut proj = "";
        let mut moon = false;
        for token in lower.split_whitespace() {
            if let Some(p) = token.strip_prefix("+proj=") {
                proj = p;
            } else if token == "+r=1737400" || token == "+a=1737400" {
                moon = true;
            }
        }
        match (proj, moon) {
            ("longlat" | "latlong", false) => Ok(Srs::Wgs84),
            ("longlat" | "latlong", true) => Ok(Srs::Moon),
            ("geocent", false) => Ok(Srs::Ecef),
            ("geocent", true) => Ok(Srs::MoonGeocentric),
            ("merc" | "webmerc", false) => Ok(Srs::SphericalMercator),
            ("eqc", false) => Ok(Srs::PlateCarree),
            _ => Err(SrsError::UnknownDefinition(original.to_string())),
        }
    }

    /// Canonical definition string. Round-trips through [`Srs::from_definition`].
    #[must_use]
    pub fn definition(self) -> &'static str {
        match self {
            Srs::Invalid => "",
            Srs::Wgs84 => "wgs84",
            Srs::Ecef => "ecef",
            Srs::SphericalMercator => "spherical-mercator",
            Srs::PlateCarree => "plate-carree",
            Srs::Moon => "moon",
            Srs::MoonGeocentric => "moon-geocentric",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Srs::Invalid => "invalid",
            Srs::Wgs84 => "WGS 84",
            Srs::Ecef => "WGS 84 (geocentric)",
            Srs::SphericalMercator => "WGS 84 / Pseudo-Mercator",
            Srs::PlateCarree => "WGS 84 / World Equidistant Cylindrical",
            Srs::Moon => "Moon 2000",
            Srs::MoonGeocentric => "Moon 2000 (geocentric)",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != Srs::Invalid
    }

    /// Longitude/latitude in degrees.
    #[must_use]
    pub fn is_geodetic(self) -> bool {
        matches!(self, Srs::Wgs84 | Srs::Moon)
    }

    /// Body-centered cartesian.
    #[must_use]
    pub fn is_geocentric(self) -> bool {
        matches!(self, Srs::Ecef | Srs::MoonGeocentric)
    }

    /// A map projection with linear units.
    #[must_use]
    pub fn is_projected(self) -> bool {
        matches!(self, Srs::SphericalMercator | Srs::PlateCarree)
    }

    /// True for spherical Mercator.
    #[must_use]
    pub fn is_mercator(self) -> bool {
        self == Srs::SphericalMercator
    }

    /// Reference ellipsoid, if any.
    #[must_use]
    pub fn ellipsoid(self) -> Option<Ellipsoid> {
        match self {
            Srs::Invalid => None,
            Srs::Moon | Srs::MoonGeocentric => Some(Ellipsoid::MOON),
            _ => Some(Ellipsoid::WGS84),
        }
    }

    /// Horizontal units.
    #[must_use]
    pub fn units(self) -> Units {
        if self.is_geodetic() {
            Units::Degrees
        } else {
            Units::Meters
        }
    }

    /// Valid coordinate bounds. Geocentric and invalid systems have none and
    /// return an empty box.
    #[must_use]
    pub fn bounds(self) -> tessera_math::Bounds {
        use tessera_math::Bounds;
        match self {
            Srs::Wgs84 | Srs::Moon => Bounds::new(-180.0, -90.0, 180.0, 90.0),
            Srs::SphericalMercator => Bounds::new(
                -MERCATOR_HALF_EXTENT,
                -MERCATOR_HALF_EXTENT,
                MERCATOR_HALF_EXTENT,
                MERCATOR_HALF_EXTENT,
            ),
            Srs::PlateCarree => {
                let r = Ellipsoid::WGS84.semi_major_axis();
                Bounds::new(-PI * r, -FRAC_PI_2 * r, PI * r, FRAC_PI_2 * r)
            }
            Srs::Ecef | Srs::MoonGeocentric | Srs::Invalid => Bounds::EMPTY,
        }
    }

    /// The geodetic system on the same body. Invalid stays invalid.
    #[must_use]
    pub fn geodetic_srs(self) -> Srs {
        match self {
            Srs::Invalid => Srs::Invalid,
            Srs::Moon | Srs::MoonGeocentric => Srs::Moon,
            _ => Srs::Wgs84,
        }
    }

    /// The geocentric system on the same body. Invalid stays invalid.
    #[must_use]
    pub fn geocentric_srs(self) -> Srs {
        match self {
            Srs::Invalid => Srs::Invalid,
            Srs::Moon | Srs::MoonGeocentric => Srs::MoonGeocentric,
            _ => Srs::Ecef,
        }
    }

    /// Full equivalence. Two invalid systems are not equivalent.
    #[must_use]
    pub fn equivalent_to(self, other: Srs) -> bool {
        self.is_valid() && self == other
    }

    /// Equivalence ignoring vertical datums. No vertical datums are modeled,
    /// so this currently coincides with [`Srs::equivalent_to`].
    #[must_use]
    pub fn horizontally_equivalent_to(self, other: Srs) -> bool {
        self.equivalent_to(other)
    }

    /// Matrix from a local frame at `origin` (expressed in `self`) to `self` coordinates.
    ///
    /// Geocentric systems get an east-north-up frame; geodetic and projected
    /// systems get a plain translation.
    pub fn topocentric_to_world_matrix(self, origin: DVec3) -> Result<DMat4, SrsError> {
        match self {
            Srs::Invalid => Err(SrsError::InvalidSrs),
            s if s.is_geocentric() => {
                let ellipsoid = s.ellipsoid().ok_or(SrsError::InvalidSrs)?;
                let lla = ellipsoid.geocentric_to_geodetic(origin);
                Ok(ellipsoid.topocentric_to_geocentric_matrix(lla))
            }
            _ => Ok(DMat4::from_translation(origin)),
        }
    }

    /// Convert a horizontal distance from `from` units to `to` units.
    ///
    /// Angular/linear conversions are made along a parallel at `latitude`
    /// (degrees). Returns `None` if either system is invalid.
    #[must_use]
    pub fn transform_units(value: f64, from: Srs, to: Srs, latitude: f64) -> Option<f64> {
        if !from.is_valid() || !to.is_valid() {
            return None;
        }
        let (fu, tu) = (from.units(), to.units());
        if fu.is_angular() == tu.is_angular() {
            return fu.convert_to(tu, value);
        }
        let ellipsoid = to.ellipsoid()?;
        if fu.is_linear() {
            let meters = fu.convert_to(Units::Meters, value)?;
            let degrees = ellipsoid.meters_to_longitudinal_degrees(meters, latitude);
            Units::Degrees.convert_to(tu, degrees)
        } else {
            let degrees = fu.convert_to(Units::Degrees, value)?;
            let meters = ellipsoid.longitudinal_degrees_to_meters(degrees, latitude);
            Units::Meters.convert_to(tu, meters)
        }
    }

    /// Build the operation that maps points from `self` to `to`.
    #[must_use]
    pub fn to(self, to: Srs) -> SrsOperation {
        SrsOperation { from: self, to }
    }

    /// Geodetic (lon°, lat°, h) coordinates of a point in this system.
    fn native_to_geodetic(self, p: DVec3) -> Result<DVec3, SrsError> {
        let out = match self {
            Srs::Invalid => return Err(SrsError::InvalidSrs),
            Srs::Wgs84 | Srs::Moon => p,
            Srs::Ecef | Srs::MoonGeocentric => {
                let ellipsoid = self.ellipsoid().ok_or(SrsError::InvalidSrs)?;
                ellipsoid.geocentric_to_geodetic(p)
            }
            Srs::SphericalMercator => {
                let r = Ellipsoid::WGS84.semi_major_axis();
                let lon = (p.x / r).to_degrees();
                let lat = (2.0 * (p.y / r).exp().atan() - FRAC_PI_2).to_degrees();
                DVec3::new(lon, lat, p.z)
            }
            Srs::PlateCarree => {
                let r = Ellipsoid::WGS84.semi_major_axis();
                DVec3::new((p.x / r).to_degrees(), (p.y / r).to_degrees(), p.z)
            }
        };
        if out.is_finite() {
            Ok(out)
        } else {
            Err(SrsError::OutOfDomain {
                srs: self,
                x: p.x,
                y: p.y,
            })
        }
    }

    /// Coordinates in this system of a geodetic (lon°, lat°, h) point.
    fn geodetic_to_native(self, lla: DVec3) -> Result<DVec3, SrsError> {
        let out_of_domain = || SrsError::OutOfDomain {
            srs: self,
            x: lla.x,
            y: lla.y,
        };
        let out = match self {
            Srs::Invalid => return Err(SrsError::InvalidSrs),
            Srs::Wgs84 | Srs::Moon => lla,
            Srs::Ecef | Srs::MoonGeocentric => {
                let ellipsoid = self.ellipsoid().ok_or(SrsError::InvalidSrs)?;
                ellipsoid.geodetic_to_geocentric(lla)
            }
            Srs::SphericalMercator => {
                // The poles map to infinity.
                if !(lla.y.abs() < 90.0) {
                    return Err(out_of_domain());
                }
                let r = Ellipsoid::WGS84.semi_major_axis();
                let lat = lla.y.to_radians();
                DVec3::new(
                    r * lla.x.to_radians(),
                    r * (FRAC_PI_4 + 0.5 * lat).tan().ln(),
                    lla.z,
                )
            }
            Srs::PlateCarree => {
                if !(lla.y.abs() <= 90.0 + tessera_math::EPSILON) {
                    return Err(out_of_domain());
                }
                let r = Ellipsoid::WGS84.semi_major_axis();
                DVec3::new(r * lla.x.to_radians(), r * lla.y.to_radians(), lla.z)
            }
        };
        if out.is_finite() {
            Ok(out)
        } else {
            Err(out_of_domain())
        }
    }
}

impl fmt::Display for Srs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Srs {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srs::from_definition(s)
    }
}

impl TryFrom<String> for Srs {
    type Error = SrsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Srs::Invalid);
        }
        Srs::from_definition(&value)
    }
}

impl From<Srs> for String {
    fn from(srs: Srs) -> Self {
        srs.definition().to_string()
    }
}

/// A point operation from one SRS to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SrsOperation {
    from: Srs,
    to: Srs,
}

impl SrsOperation {
    #[must_use]
    pub fn source(&self) -> Srs {
        self.from
    }

    #[must_use]
    pub fn target(&self) -> Srs {
        self.to
    }

    /// True if the operation can ever succeed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.from.is_valid() && self.to.is_valid() && self.from.geodetic_srs() == self.to.geodetic_srs()
    }

    /// True if the operation does nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from.is_valid() && self.from == self.to
    }

    /// The reverse operation.
    #[must_use]
    pub fn inverse(&self) -> SrsOperation {
        SrsOperation {
            from: self.to,
            to: self.from,
        }
    }

    /// Transform a single point.
    pub fn transform(&self, p: DVec3) -> Result<DVec3, SrsError> {
        if !self.from.is_valid() || !self.to.is_valid() {
            return Err(SrsError::InvalidSrs);
        }
        if self.from == self.to {
            return Ok(p);
        }
        if self.from.geodetic_srs() != self.to.geodetic_srs() {
            return Err(SrsError::Incompatible {
                from: self.from,
                to: self.to,
            });
        }
        let lla = self.from.native_to_geodetic(p)?;
        self.to.geodetic_to_native(lla)
    }
}
