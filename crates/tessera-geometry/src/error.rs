use tessera_srs::SrsError;

/// Errors from building pooled geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// The build was canceled through its [`crate::CancelToken`].
    #[error("geometry build canceled")]
    Canceled,

    /// The tile key has an invalid profile.
    #[error("invalid tile key")]
    InvalidTileKey,

    /// The requested grid resolution is unusable.
    #[error("tile size {0} outside {min}..={max}", min = crate::MIN_TILE_SIZE, max = crate::MAX_TILE_SIZE)]
    InvalidTileSize(u32),

    /// The tile could not be placed in the world frame.
    #[error("failed to transform tile into world space: {0}")]
    Transform(#[from] SrsError),
}
