use thiserror::Error;

/// Error type for invalid inputs and failed numerical solves.
#[derive(Error, Debug)]
pub enum PhydroError {
    /// A physically invalid input was supplied. Raised at the parameter
    /// construction boundary, before any solver iteration runs.
    #[error("invalid input: {0}")]
    DomainInput(String),
    /// A root finder or optimizer failed to converge within its bracket or
    /// iteration budget. Never silently replaced with a default value.
    #[error("solver failed to converge: {0}")]
    ConvergenceFailure(String),
    /// A persisted state record carried an unrecognised version tag.
    #[error("unrecognised format version: expected {expected:?}, found {found:?}")]
    FormatVersionMismatch { expected: String, found: String },
    /// A persisted state record was truncated or not parseable.
    #[error("malformed state record: {0}")]
    MalformedState(String),
    /// An I/O failure while persisting or restoring state.
    #[error("state io failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PhydroError {
    /// Shorthand for a [`PhydroError::DomainInput`] with a formatted message.
    pub fn domain(msg: impl Into<String>) -> Self {
        PhydroError::DomainInput(msg.into())
    }
}
