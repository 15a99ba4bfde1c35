//! Velocity arrows with bounded on-screen length.

use crate::store::TrajectoryStore;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Maximum speeds below this are treated as 1 when normalizing.
pub const MIN_SPEED_EPSILON: f64 = 1e-6;

/// Arrow length for the fastest sample of the flight, in scene units.
pub const DEFAULT_ARROW_LENGTH: f64 = 0.5;

/// Line segment drawn for a velocity vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub start: Vector3<f64>,
    pub end: Vector3<f64>,
}

impl Arrow {
    /// `end - start`.
    pub fn vector(&self) -> Vector3<f64> {
        self.end - self.start
    }
}

/// Maps raw velocities onto arrows no longer than `arrow_length`.
///
/// The scale is `arrow_length / max_speed` over the whole flight, so the
/// relative length of arrows between frames is preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityScaler {
    scale: f64,
}

impl VelocityScaler {
    /// Creates a scaler for a store with the default arrow length.
    pub fn for_store(store: &TrajectoryStore) -> Self {
        Self::with_length(store, DEFAULT_ARROW_LENGTH)
    }

    /// Creates a scaler for a store with a custom arrow length.
    pub fn with_length(store: &TrajectoryStore, arrow_length: f64) -> Self {
        Self::from_max_speed(store.max_speed(), arrow_length)
    }

    /// Creates a scaler from a precomputed maximum speed.
    pub fn from_max_speed(max_speed: f64, arrow_length: f64) -> Self {
        let denom = if max_speed > MIN_SPEED_EPSILON {
            max_speed
        } else {
            1.0
        };
        Self {
            scale: arrow_length / denom,
        }
    }

    /// Multiplier applied to raw velocities.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scaled velocity vector.
    pub fn scaled(&self, velocity: &Vector3<f64>) -> Vector3<f64> {
        velocity * self.scale
    }

    /// Arrow anchored at `position`.
    pub fn arrow(&self, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Arrow {
        Arrow {
            start: *position,
            end: position + self.scaled(velocity),
        }
    }
}
