//! Error types for the spdekit workspace.
//!
//! Organized by the stage at which a failure is detected: configuration
//! (before any stepping), covariance embedding, and the time-stepping
//! solver itself. Every fatal error invalidates the whole run; there is
//! no partial-trajectory recovery.

use std::error::Error;
use std::fmt;

/// Errors detected while validating a configuration.
///
/// These are always reported before the first time step is taken.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A domain length, horizon, or resolution is zero or negative.
    EmptyDomain {
        /// Which quantity was degenerate (e.g. `"a"`, `"T"`).
        name: &'static str,
    },
    /// A scalar parameter is out of its valid range.
    InvalidParameter {
        /// Parameter name as it appears on the builder.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// A resolution or step count violates a structural constraint.
    InvalidResolution {
        /// Parameter name as it appears on the builder.
        name: &'static str,
        /// The rejected value.
        value: usize,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// An input array does not match the declared resolution.
    ShapeMismatch {
        /// What was being checked (e.g. `"u0"`, `"covariance block"`).
        what: &'static str,
        /// The expected length or element count.
        expected: usize,
        /// The length or element count that was supplied.
        actual: usize,
    },
    /// A required builder field was never set.
    MissingParameter {
        /// Parameter name as it appears on the builder.
        name: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain { name } => write!(f, "degenerate domain: {name} must be positive"),
            Self::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "invalid {name} = {value}: {reason}"),
            Self::InvalidResolution {
                name,
                value,
                reason,
            } => write!(f, "invalid {name} = {value}: {reason}"),
            Self::ShapeMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{what} has {actual} entries, expected {expected}"),
            Self::MissingParameter { name } => write!(f, "{name} is required"),
        }
    }
}

impl Error for ConfigError {}

/// Errors from building a circulant embedding out of covariance samples.
#[derive(Clone, Debug, PartialEq)]
pub enum EmbeddingError {
    /// The covariance vector or block has no entries.
    EmptyCovariance,
    /// The covariance block does not have the shape implied by the resolution.
    ShapeMismatch {
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Supplied `(rows, cols)`.
        actual: (usize, usize),
    },
    /// A covariance sample is NaN or infinite.
    NonFinite {
        /// Flat index of the first offending sample.
        index: usize,
    },
    /// The truncation length exceeds the supplied covariance samples.
    TruncationTooLong {
        /// Requested output length.
        requested: usize,
        /// Number of covariance samples available.
        available: usize,
    },
    /// The sampling request itself (resolution, spacing, padding) was invalid.
    Config(ConfigError),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCovariance => write!(f, "covariance samples are empty"),
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "covariance block is {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::NonFinite { index } => {
                write!(f, "covariance sample {index} is not finite")
            }
            Self::TruncationTooLong {
                requested,
                available,
            } => write!(
                f,
                "cannot truncate to {requested} points from {available} covariance samples"
            ),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl Error for EmbeddingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EmbeddingError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Fatal errors raised while advancing a solver.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// The configuration was rejected before stepping began.
    Config(ConfigError),
    /// The implicit step matrix could not be factorized.
    SingularMatrix {
        /// Row at which elimination broke down.
        index: usize,
        /// The offending pivot value.
        pivot: f64,
    },
    /// The state became NaN or infinite.
    NonFinite {
        /// Coarse step at which the value was observed (1-based).
        step: usize,
        /// Flat index into the state of the first offending value.
        index: usize,
    },
    /// Building the noise embedding failed.
    Embedding(EmbeddingError),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::SingularMatrix { index, pivot } => {
                write!(f, "implicit matrix is singular: pivot {pivot:e} at row {index}")
            }
            Self::NonFinite { step, index } => {
                write!(f, "non-finite state at step {step}, index {index}")
            }
            Self::Embedding(e) => write!(f, "noise embedding: {e}"),
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Embedding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<EmbeddingError> for SolverError {
    fn from(e: EmbeddingError) -> Self {
        Self::Embedding(e)
    }
}

/// Reject a non-positive or non-finite domain quantity.
pub fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(ConfigError::EmptyDomain { name });
    }
    Ok(())
}

/// Reject a negative or non-finite parameter.
pub fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidParameter {
            name,
            value,
            reason: "must be finite and >= 0",
        });
    }
    Ok(())
}

/// Reject an input whose length differs from the declared resolution.
pub fn require_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ConfigError> {
    if expected != actual {
        return Err(ConfigError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
