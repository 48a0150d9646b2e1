/// Errors from profile construction and persistence.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("unknown profile name: {0:?}")]
    UnknownName(String),

    #[error("failed to parse profile descriptor: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize profile descriptor: {0}")]
    Serialize(#[source] serde_json::Error),
}
