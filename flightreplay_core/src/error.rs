//! Error types for trajectory construction and bundle I/O.

use thiserror::Error;

/// Errors that can occur while building, loading or saving a trajectory.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// A required array (`trajectory`, `velocity` or `timesteps`) is absent
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// An array does not have the expected shape
    #[error("Shape mismatch in {field}: expected {expected}, got {actual}")]
    ShapeMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Sampling needs at least two samples
    #[error("Trajectory needs at least 2 samples, got {0}")]
    TooFewSamples(usize),

    /// `timesteps[index] < timesteps[index - 1]`
    #[error("Timesteps decrease at index {index}")]
    NonMonotonicTimesteps { index: usize },

    /// Obstacle footprint with `x_min > x_max` or `y_min > y_max`
    #[error("Invalid obstacle footprint at index {index}")]
    InvalidFootprint { index: usize },

    /// NaN or infinite value in an array
    #[error("Non-finite value in {field} at index {index}")]
    NonFinite { field: &'static str, index: usize },

    /// Opening or creating the bundle file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive or one of its arrays could not be decoded
    #[error("Failed to read bundle: {0}")]
    ReadBundle(#[from] ndarray_npy::ReadNpzError),

    /// The archive could not be written
    #[error("Failed to write bundle: {0}")]
    WriteBundle(#[from] ndarray_npy::WriteNpzError),
}

impl TrajectoryError {
    /// Creates a shape mismatch error.
    pub fn shape(
        field: &'static str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::ShapeMismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrajectoryError>;
