//! Timeline - the driving loop of a playback.
//!
//! The timeline owns the time tracker: it spaces `frame_count` query values
//! evenly from the start to the end of the flight (or from progress 0 to 1),
//! asks the sampler for each frame and hands the result to a sink.

use crate::camera::CameraRig;
use crate::config::{PlaybackConfig, PlaybackMode};
use crate::error::Result;
use crate::sink::FrameSink;
use flightreplay_core::{FrameSample, FrameSampler, Query, SceneLayout, TrajectoryStore};
use tracing::{debug, info};

/// Statistics of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub frames: usize,
    /// Wall-clock length of the animation, seconds
    pub run_time: f64,
}

/// Frame schedule over one store.
pub struct Timeline<'a> {
    store: &'a TrajectoryStore,
    frames: FrameSampler<'a>,
    rig: CameraRig,
    mode: PlaybackMode,
    fps: u32,
    run_time: f64,
    /// Number of intervals between frames (0 -> single frame)
    steps: usize,
}

impl<'a> Timeline<'a> {
    /// Creates a timeline for a store.
    pub fn new(store: &'a TrajectoryStore, config: &PlaybackConfig) -> Result<Self> {
        config.validate()?;

        let run_time = config.effective_run_time(store.duration());
        let steps = if config.mode == PlaybackMode::Time && store.duration() == 0.0 {
            0
        } else {
            ((run_time * config.fps as f64).round() as usize).max(1)
        };

        Ok(Self {
            store,
            frames: FrameSampler::with_arrows(store, config.arrow()),
            rig: CameraRig::new(config.camera),
            mode: config.mode,
            fps: config.fps,
            run_time,
            steps,
        })
    }

    /// Number of frames the timeline produces.
    pub fn frame_count(&self) -> usize {
        self.steps + 1
    }

    pub fn run_time(&self) -> f64 {
        self.run_time
    }

    fn fraction(&self, index: usize) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            index.min(self.steps) as f64 / self.steps as f64
        }
    }

    /// Query value for frame `index`; indices past the end give the last frame.
    pub fn query(&self, index: usize) -> Query {
        let u = self.fraction(index);
        match self.mode {
            PlaybackMode::Time => {
                let (start, end) = self.store.time_range();
                if u >= 1.0 {
                    Query::Time(end)
                } else {
                    Query::Time(start + (end - start) * u)
                }
            }
            PlaybackMode::Progress => Query::Progress(u),
        }
    }

    /// Wall-clock playback time of frame `index`.
    pub fn elapsed(&self, index: usize) -> f64 {
        self.run_time * self.fraction(index)
    }

    /// Sample for frame `index`.
    pub fn sample(&self, index: usize) -> FrameSample {
        self.frames.sample(index, self.query(index))
    }

    /// All frames in order.
    pub fn frames(&self) -> impl Iterator<Item = FrameSample> + '_ {
        (0..self.frame_count()).map(move |i| self.sample(i))
    }

    /// Plays every frame into `sink`.
    pub fn run(&self, sink: &mut dyn FrameSink) -> Result<RunStats> {
        info!(
            mode = ?self.mode,
            frames = self.frame_count(),
            run_time = self.run_time,
            "Starting playback"
        );

        sink.begin(&SceneLayout::from_store(self.store))?;
        for frame in self.frames() {
            let camera = self.rig.orientation(self.elapsed(frame.index));
            sink.frame(&frame, &camera)?;

            if frame.index % self.fps as usize == 0 {
                debug!(
                    "  frame={} | t={:.2}s | pos=({:.2}, {:.2}, {:.2})",
                    frame.index,
                    frame.scene_time,
                    frame.pose.position.x,
                    frame.pose.position.y,
                    frame.pose.position.z
                );
            }
        }
        sink.finish()?;

        Ok(RunStats {
            frames: self.frame_count(),
            run_time: self.run_time,
        })
    }
}
