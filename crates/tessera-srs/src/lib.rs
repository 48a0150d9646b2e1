//! Spatial reference systems, coordinate operations, and geospatial extents.
//!
//! Only the reference systems needed by the tile pyramid are provided: geodetic
//! (WGS84 and lunar), geocentric cartesian, spherical Mercator, and plate carrée.

mod ellipsoid;
mod error;
mod geo_extent;
mod geo_point;
mod srs;
mod units;

pub use ellipsoid::Ellipsoid;
pub use error::SrsError;
pub use geo_extent::GeoExtent;
pub use geo_point::GeoPoint;
pub use srs::{Srs, SrsOperation};
pub use units::Units;
