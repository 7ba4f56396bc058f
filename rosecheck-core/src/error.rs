//! Error types for generator construction and configuration.

use thiserror::Error;

/// Errors that indicate a misconfigured test setup rather than a failing
/// property. These propagate out of `check` and `sample` synchronously;
/// predicate failures never take this path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A filtered generator could not produce a satisfying value.
    #[error("exhausted {max_tries} tries looking for a value satisfying the predicate")]
    ExhaustedTries { max_tries: usize },

    /// Invalid check or sample options.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },
}
