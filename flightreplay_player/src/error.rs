//! Error types for playback.

use flightreplay_core::TrajectoryError;
use thiserror::Error;

/// Errors that can occur while configuring or running a playback.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Loading or saving the bundle failed
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    /// Rejected playback configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Config or export file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The Rerun recording stream failed
    #[error("Visualizer error: {0}")]
    Visualizer(String),
}

impl PlayerError {
    /// Creates a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a visualizer error.
    pub fn visualizer(err: impl std::fmt::Display) -> Self {
        Self::Visualizer(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
