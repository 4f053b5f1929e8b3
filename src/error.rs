//! Error types for the iped library.
//!
//! Design generation has exactly two fatal failure modes: the configuration
//! is inconsistent, or rejection sampling could not collect enough valid
//! candidate tasks within its attempt budget. Both abort before any design
//! matrix is produced.

use thiserror::Error;

/// The main error type for the iped library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The configuration violates one of its bounds.
    #[error("invalid parameter `{parameter}`: {message}")]
    InvalidParameters {
        /// Name of the offending parameter or bound.
        parameter: &'static str,
        /// Description of what is invalid.
        message: String,
    },

    /// Rejection sampling ran out of attempts before the pool could cover
    /// every task of the design.
    #[error(
        "candidate pool exhausted: {accepted} of {required} required tasks accepted after {attempts} attempts"
    )]
    PoolExhausted {
        /// Number of tasks the design needs.
        required: usize,
        /// Number of valid candidates collected.
        accepted: usize,
        /// Number of random draws spent.
        attempts: u64,
    },
}

/// A specialized `Result` type for iped operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParameters` error.
    #[must_use]
    pub fn invalid_params(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            parameter,
            message: message.into(),
        }
    }

    /// Name of the parameter at fault, if this is a configuration error.
    #[must_use]
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameters { parameter, .. } => Some(parameter),
            Self::PoolExhausted { .. } => None,
        }
    }
}
