//! Renderer-facing scene description.
//!
//! A renderer receives a [`SceneLayout`] once (axes, flight path, obstacle
//! boxes) and then one [`FrameSample`] per animation frame.

use crate::footprint::ObstacleBox;
use crate::sampler::{Pose, Query, TemporalSampler};
use crate::store::TrajectoryStore;
use crate::velocity::{Arrow, VelocityScaler, DEFAULT_ARROW_LENGTH};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Horizontal padding around the flight path.
pub const XY_PADDING: f64 = 0.5;
/// Padding below the lowest point of the flight path.
pub const Z_PADDING_BELOW: f64 = 0.2;
/// Padding above the highest point of the flight path.
pub const Z_PADDING_ABOVE: f64 = 0.5;

/// Axis-aligned extent of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBounds {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl SceneBounds {
    /// Trajectory bounding box with display padding.
    pub fn around(store: &TrajectoryStore) -> Self {
        let (lo, hi) = store.bounds();
        Self {
            min: Vector3::new(lo.x - XY_PADDING, lo.y - XY_PADDING, lo.z - Z_PADDING_BELOW),
            max: Vector3::new(hi.x + XY_PADDING, hi.y + XY_PADDING, hi.z + Z_PADDING_ABOVE),
        }
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) * 0.5
    }
}

/// Static part of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub bounds: SceneBounds,
    /// Flight path polyline (the raw trajectory)
    pub path: Vec<Vector3<f64>>,
    /// Obstacle footprints extruded over the scene's vertical extent
    pub obstacles: Vec<ObstacleBox>,
    pub start_time: f64,
    pub end_time: f64,
}

impl SceneLayout {
    /// Builds the layout for a store.
    pub fn from_store(store: &TrajectoryStore) -> Self {
        let bounds = SceneBounds::around(store);
        let obstacles = store
            .obstacles()
            .iter()
            .map(|fp| fp.extrude(bounds.min.z, bounds.max.z))
            .collect();
        let (start_time, end_time) = store.time_range();
        Self {
            bounds,
            path: store.trajectory().to_vec(),
            obstacles,
            start_time,
            end_time,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    pub index: usize,
    pub query: Query,
    /// Simulation time shown in this frame
    pub scene_time: f64,
    pub pose: Pose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow: Option<Arrow>,
}

/// Turns query values into [`FrameSample`]s.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler<'a> {
    sampler: TemporalSampler<'a>,
    scaler: Option<VelocityScaler>,
}

impl<'a> FrameSampler<'a> {
    /// Frame sampler with velocity arrows of the default length.
    pub fn new(store: &'a TrajectoryStore) -> Self {
        Self::with_arrows(store, Some(DEFAULT_ARROW_LENGTH))
    }

    /// Frame sampler with arrows of `arrow_length`, or none.
    pub fn with_arrows(store: &'a TrajectoryStore, arrow_length: Option<f64>) -> Self {
        Self {
            sampler: TemporalSampler::new(store),
            scaler: arrow_length.map(|len| VelocityScaler::with_length(store, len)),
        }
    }

    pub fn sampler(&self) -> &TemporalSampler<'a> {
        &self.sampler
    }

    pub fn sample(&self, index: usize, query: Query) -> FrameSample {
        let pose = self.sampler.pose(query);
        FrameSample {
            index,
            query,
            scene_time: self.sampler.scene_time(query),
            arrow: self
                .scaler
                .map(|scaler| scaler.arrow(&pose.position, &pose.velocity)),
            pose,
        }
    }
}
