use thiserror::Error;

/// Canonical result for every strata crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An iterator was pulled before `prepare()` settled.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Upstream data corruption (paired view with a bad key array, bad JSON).
    #[error("malformed value: {0}")]
    MalformedValue(String),

    #[error("values are not comparable: {0}")]
    Incomparable(String),

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Leaf cursors map their backend errors into this variant.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub(crate) fn type_mismatch(op: &str, lhs: &str, rhs: &str) -> Self {
        Error::TypeMismatch(format!("{op} not supported between {lhs} and {rhs}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedValue(e.to_string())
    }
}
