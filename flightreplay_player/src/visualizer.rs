//! Rerun visualization for playbacks.
//!
//! This module provides a [`FrameSink`] backed by the Rerun SDK.
//! Visualization is optional and only available with the `visualization` feature.
//!
//! # What Gets Logged
//!
//! - Flight path as a blue line strip (static)
//! - Obstacles as translucent green boxes (static)
//! - Drone as a yellow point, goal as a green point
//! - Scaled velocity as an arrow from the drone
//! - Simulation time and frame index as timelines

use crate::camera::CameraOrientation;
use crate::error::Result;
use crate::sink::FrameSink;
use flightreplay_core::{FrameSample, SceneLayout};

#[cfg(feature = "visualization")]
use crate::error::PlayerError;
#[cfg(feature = "visualization")]
use nalgebra::Vector3;
#[cfg(feature = "visualization")]
use rerun::{Color, Points3D, Radius, RecordingStream};

/// Drone marker radius in scene units.
#[cfg(feature = "visualization")]
pub const DRONE_RADIUS: f32 = 0.05;
/// Goal marker radius in scene units.
#[cfg(feature = "visualization")]
pub const GOAL_RADIUS: f32 = 0.07;

#[cfg(feature = "visualization")]
fn to_f32(v: &Vector3<f64>) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Rerun sink for playback visualization.
pub struct RerunSink {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunSink {
    /// Creates a sink with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Spawns a Rerun viewer and streams to it.
    #[cfg(feature = "visualization")]
    pub fn spawn(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to see the flight");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Records into an `.rrd` file for later viewing.
    #[cfg(feature = "visualization")]
    pub fn to_file(name: &str, path: &str) -> Result<Self> {
        let rec = rerun::RecordingStreamBuilder::new(name)
            .save(path)
            .map_err(PlayerError::visualizer)?;
        tracing::info!("Recording Rerun stream to {}", path);
        Ok(Self {
            rec: Some(rec),
            enabled: true,
        })
    }

    /// Returns a disabled sink if the visualization feature is not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn spawn(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    #[cfg(not(feature = "visualization"))]
    pub fn to_file(_name: &str, _path: &str) -> Result<Self> {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Ok(Self::disabled())
    }

    /// Wraps an existing recording stream.
    #[cfg(feature = "visualization")]
    pub fn from_stream(rec: RecordingStream) -> Self {
        Self {
            rec: Some(rec),
            enabled: true,
        }
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "visualization")]
impl FrameSink for RerunSink {
    fn begin(&mut self, layout: &SceneLayout) -> Result<()> {
        let Some(ref rec) = self.rec else {
            return Ok(());
        };

        rec.log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())
            .map_err(PlayerError::visualizer)?;

        let path: Vec<[f32; 3]> = layout.path.iter().map(to_f32).collect();
        rec.log_static(
            "world/path",
            &rerun::LineStrips3D::new([path]).with_colors([Color::from_rgb(80, 140, 255)]),
        )
        .map_err(PlayerError::visualizer)?;

        if !layout.obstacles.is_empty() {
            rec.log_static(
                "world/obstacles",
                &rerun::Boxes3D::from_centers_and_half_sizes(
                    layout.obstacles.iter().map(|b| to_f32(&b.center)),
                    layout.obstacles.iter().map(|b| to_f32(&b.half_size)),
                )
                .with_colors([Color::from_unmultiplied_rgba(0, 200, 0, 77)]),
            )
            .map_err(PlayerError::visualizer)?;
        }
        Ok(())
    }

    fn frame(&mut self, frame: &FrameSample, _camera: &CameraOrientation) -> Result<()> {
        let Some(ref rec) = self.rec else {
            return Ok(());
        };

        rec.set_time_sequence("frame", frame.index as i64);
        rec.set_time_seconds("sim_time", frame.scene_time);

        rec.log(
            "world/drone",
            &Points3D::new([to_f32(&frame.pose.position)])
                .with_colors([Color::from_rgb(255, 220, 0)]) // Yellow
                .with_radii([Radius::new_scene_units(DRONE_RADIUS)]),
        )
        .map_err(PlayerError::visualizer)?;

        rec.log(
            "world/goal",
            &Points3D::new([to_f32(&frame.pose.goal)])
                .with_colors([Color::from_rgb(0, 255, 0)]) // Green
                .with_radii([Radius::new_scene_units(GOAL_RADIUS)]),
        )
        .map_err(PlayerError::visualizer)?;

        if let Some(arrow) = frame.arrow {
            rec.log(
                "world/drone/velocity",
                &rerun::Arrows3D::from_vectors([to_f32(&arrow.vector())])
                    .with_origins([to_f32(&arrow.start)])
                    .with_colors([Color::from_rgb(255, 100, 100)]),
            )
            .map_err(PlayerError::visualizer)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(ref rec) = self.rec {
            rec.flush_blocking();
        }
        Ok(())
    }
}

#[cfg(not(feature = "visualization"))]
impl FrameSink for RerunSink {
    fn begin(&mut self, _layout: &SceneLayout) -> Result<()> {
        Ok(())
    }

    fn frame(&mut self, _frame: &FrameSample, _camera: &CameraOrientation) -> Result<()> {
        Ok(())
    }
}
