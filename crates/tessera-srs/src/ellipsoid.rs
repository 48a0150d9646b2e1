//! Reference ellipsoids and the geodetic/geocentric conversions built on them.

use glam::{DMat4, DVec3, DVec4};

/// An oblate reference ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    semi_major: f64,
    semi_minor: f64,
    ecc2: f64,
}

impl Ellipsoid {
    /// The WGS84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid::new(6_378_137.0, 6_356_752.314_245);

    /// The IAU lunar sphere.
    pub const MOON: Ellipsoid = Ellipsoid::new(1_737_400.0, 1_737_400.0);

    pub const fn new(semi_major: f64, semi_minor: f64) -> Self {
        let f = (semi_major - semi_minor) / semi_major;
        Self {
            semi_major,
            semi_minor,
            ecc2: 2.0 * f - f * f,
        }
    }

    #[inline]
    #[must_use]
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major
    }

    #[inline]
    #[must_use]
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_minor
    }

    /// First eccentricity squared.
    #[inline]
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        self.ecc2
    }

    /// Geodetic (lon°, lat°, h) to earth-centered cartesian.
    #[must_use]
    pub fn geodetic_to_geocentric(&self, lla: DVec3) -> DVec3 {
        let lon = lla.x.to_radians();
        let lat = lla.y.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let n = self.semi_major / (1.0 - self.ecc2 * sin_lat * sin_lat).sqrt();
        DVec3::new(
            (n + lla.z) * cos_lat * cos_lon,
            (n + lla.z) * cos_lat * sin_lon,
            (n * (1.0 - self.ecc2) + lla.z) * sin_lat,
        )
    }

    /// Earth-centered cartesian to geodetic (lon°, lat°, h) using Bowring's method.
    #[must_use]
    pub fn geocentric_to_geodetic(&self, xyz: DVec3) -> DVec3 {
        let a = self.semi_major;
        let b = self.semi_minor;
        let p = (xyz.x * xyz.x + xyz.y * xyz.y).sqrt();

        // Polar axis: longitude is arbitrary, latitude is ±90.
        if p < 1e-9 {
            let lat = if xyz.z >= 0.0 { 90.0 } else { -90.0 };
            return DVec3::new(0.0, lat, xyz.z.abs() - b);
        }

        let ep2 = (a * a - b * b) / (b * b);
        let theta = (xyz.z * a).atan2(p * b);
        let (sin_t, cos_t) = theta.sin_cos();
        let lat = (xyz.z + ep2 * b * sin_t * sin_t * sin_t)
            .atan2(p - self.ecc2 * a * cos_t * cos_t * cos_t);
        let lon = xyz.y.atan2(xyz.x);
        let sin_lat = lat.sin();
        let n = a / (1.0 - self.ecc2 * sin_lat * sin_lat).sqrt();
        let h = p / lat.cos() - n;
        DVec3::new(lon.to_degrees(), lat.to_degrees(), h)
    }

    /// Local east-north-up frame at a geodetic point, expressed in geocentric space.
    #[must_use]
    pub fn topocentric_to_geocentric_matrix(&self, lla: DVec3) -> DMat4 {
        let origin = self.geodetic_to_geocentric(lla);
        let (sin_lat, cos_lat) = lla.y.to_radians().sin_cos();
        let (sin_lon, cos_lon) = lla.x.to_radians().sin_cos();
        let up = DVec3::new(cos_lon * cos_lat, sin_lon * cos_lat, sin_lat);
        let east = DVec3::new(-sin_lon, cos_lon, 0.0);
        let north = up.cross(east);
        DMat4::from_cols(
            east.extend(0.0),
            north.extend(0.0),
            up.extend(0.0),
            DVec4::new(origin.x, origin.y, origin.z, 1.0),
        )
    }

    /// Convert a longitudinal span in meters to degrees at a latitude.
    #[must_use]
    pub fn meters_to_longitudinal_degrees(&self, meters: f64, lat_deg: f64) -> f64 {
        let per_degree = self.longitudinal_degrees_to_meters(1.0, lat_deg);
        if per_degree.abs() < f64::EPSILON {
            return 0.0;
        }
        meters / per_degree
    }

    /// Convert a longitudinal span in degrees to meters at a latitude.
    #[must_use]
    pub fn longitudinal_degrees_to_meters(&self, degrees: f64, lat_deg: f64) -> f64 {
        degrees * (2.0 * std::f64::consts::PI * self.semi_major / 360.0) * lat_deg.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3, eps: f64) -> bool {
        (a - b).abs().max_element() <= eps
    }

    #[test]
    fn test_equator_prime_meridian_is_on_x_axis() {
        let p = Ellipsoid::WGS84.geodetic_to_geocentric(DVec3::ZERO);
        assert!(close(p, DVec3::new(6_378_137.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_north_pole_is_semi_minor() {
        let p = Ellipsoid::WGS84.geodetic_to_geocentric(DVec3::new(0.0, 90.0, 0.0));
        assert!((p.z - 6_356_752.314_245).abs() < 1e-3);
    }

    #[test]
    fn test_geodetic_geocentric_round_trip() {
        let e = Ellipsoid::WGS84;
        for &(lon, lat, h) in &[(10.0, 45.0, 100.0), (-120.0, -33.5, 0.0), (179.0, 80.0, 5000.0)] {
            let lla = DVec3::new(lon, lat, h);
            let back = e.geocentric_to_geodetic(e.geodetic_to_geocentric(lla));
            assert!(close(back, lla, 1e-6), "{lla:?} -> {back:?}");
        }
    }

    #[test]
    fn test_enu_frame_is_orthonormal() {
        let m = Ellipsoid::WGS84.topocentric_to_geocentric_matrix(DVec3::new(30.0, 40.0, 0.0));
        let east = m.x_axis.truncate();
        let north = m.y_axis.truncate();
        let up = m.z_axis.truncate();
        assert!((east.length() - 1.0).abs() < 1e-12);
        assert!((north.length() - 1.0).abs() < 1e-12);
        assert!(east.dot(north).abs() < 1e-12);
        assert!(up.dot(north).abs() < 1e-12);
        assert!((east.cross(north) - up).length() < 1e-12);
    }

    #[test]
    fn test_degrees_meters_at_equator() {
        let m = Ellipsoid::WGS84.longitudinal_degrees_to_meters(1.0, 0.0);
        assert!((m - 111_319.490_793).abs() < 1e-3);
        let d = Ellipsoid::WGS84.meters_to_longitudinal_degrees(m, 0.0);
        assert!((d - 1.0).abs() < 1e-12);
    }
}
