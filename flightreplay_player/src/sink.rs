//! Frame sinks - the renderer side of a playback.
//!
//! The [`Timeline`](crate::Timeline) pulls samples and pushes them into a
//! [`FrameSink`]. Sinks own every visual concern; they never call back into
//! the sampler.

use crate::camera::CameraOrientation;
use crate::error::Result;
use flightreplay_core::{FrameSample, SceneLayout};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Consumer of a playback.
pub trait FrameSink {
    /// Called once with the static scene before the first frame.
    fn begin(&mut self, layout: &SceneLayout) -> Result<()>;

    /// Called once per animation frame, in order.
    fn frame(&mut self, frame: &FrameSample, camera: &CameraOrientation) -> Result<()>;

    /// Called after the last frame.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Forwards every call to several sinks in order.
#[derive(Default)]
pub struct MultiSink<'a> {
    sinks: Vec<&'a mut dyn FrameSink>,
}

impl<'a> MultiSink<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    pub fn push(&mut self, sink: &'a mut dyn FrameSink) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl FrameSink for MultiSink<'_> {
    fn begin(&mut self, layout: &SceneLayout) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.begin(layout))
    }

    fn frame(&mut self, frame: &FrameSample, camera: &CameraOrientation) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.frame(frame, camera))
    }

    fn finish(&mut self) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.finish())
    }
}

/// Playback statistics collected by [`SummarySink`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSummary {
    pub frames: usize,
    pub obstacles: usize,
    pub first_scene_time: Option<f64>,
    pub last_scene_time: Option<f64>,
    /// Length of the drone path as seen at frame resolution
    pub distance_traveled: f64,
    /// Closest drone-to-goal distance over all frames
    pub closest_goal_distance: Option<f64>,
}

/// Counts frames and measures the sampled flight.
#[derive(Debug, Default)]
pub struct SummarySink {
    summary: PlaybackSummary,
    last_position: Option<Vector3<f64>>,
}

impl SummarySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &PlaybackSummary {
        &self.summary
    }
}

impl FrameSink for SummarySink {
    fn begin(&mut self, layout: &SceneLayout) -> Result<()> {
        self.summary = PlaybackSummary {
            obstacles: layout.obstacles.len(),
            ..Default::default()
        };
        self.last_position = None;
        Ok(())
    }

    fn frame(&mut self, frame: &FrameSample, _camera: &CameraOrientation) -> Result<()> {
        let s = &mut self.summary;
        s.frames += 1;
        s.first_scene_time.get_or_insert(frame.scene_time);
        s.last_scene_time = Some(frame.scene_time);

        let position = frame.pose.position;
        if let Some(last) = self.last_position {
            s.distance_traveled += (position - last).norm();
        }
        self.last_position = Some(position);

        let goal_distance = (frame.pose.goal - position).norm();
        s.closest_goal_distance = Some(
            s.closest_goal_distance
                .map_or(goal_distance, |d| d.min(goal_distance)),
        );
        Ok(())
    }
}
