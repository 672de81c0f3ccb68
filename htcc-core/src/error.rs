//! Error types for htcc-core.

use thiserror::Error;

/// Result type alias for htcc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for htcc operations.
///
/// Index and photoelectron errors point at a geometry-mapping inconsistency
/// upstream; they abort the current event and are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Theta index outside `[0, 4)`.
    #[error("invalid theta index: {0} (expected 0..4)")]
    InvalidThetaIndex(i32),

    /// Phi index outside `[0, 12)`.
    #[error("invalid phi index: {0} (expected 0..12)")]
    InvalidPhiIndex(i32),

    /// Negative photoelectron count.
    #[error("negative photoelectron count: {0}")]
    NegativePhotoelectrons(i32),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
