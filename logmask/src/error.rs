//! Configuration failures.
//!
//! Masking itself never fails: operators are total over strings. The only
//! errors this crate reports happen while building a pipeline.

/// Errors raised while assembling a masking configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration names an operator kind this crate does not provide.
    #[error("unknown masking operator `{kind}`")]
    UnknownOperator {
        /// The identifier as it appeared in the configuration.
        kind: String,
    },
    /// The configuration fragment could not be parsed.
    #[error("invalid masking options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Result alias for configuration operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
