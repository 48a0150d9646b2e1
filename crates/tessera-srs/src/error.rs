//! Coordinate transformation error types.

use crate::Srs;

/// Errors produced when building or running coordinate operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SrsError {
    /// One side of the operation is the invalid SRS.
    #[error("invalid spatial reference system")]
    InvalidSrs,

    /// A definition string did not name a supported SRS.
    #[error("unknown SRS definition: {0:?}")]
    UnknownDefinition(String),

    /// The point lies outside the domain of the target projection.
    #[error("point ({x}, {y}) is outside the domain of {srs}")]
    OutOfDomain {
        /// The SRS whose domain was violated.
        srs: Srs,
        /// Input x (longitude for geodetic input).
        x: f64,
        /// Input y (latitude for geodetic input).
        y: f64,
    },

    /// Source and target are defined on different bodies.
    #[error("no coordinate operation between {from} and {to}")]
    Incompatible {
        /// Source system.
        from: Srs,
        /// Target system.
        to: Srs,
    },
}
