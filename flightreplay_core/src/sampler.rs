//! The Temporal Sampler - clamped piecewise-linear resampling of a store.
//!
//! Two query styles share one interpolation core:
//!
//! - **Time** (`sample_at_time`): the query is a simulation timestamp. The
//!   bracketing interval comes from a binary search over `timesteps`, so
//!   irregular sampling is honored.
//! - **Progress** (`sample_at_progress`): the query is `alpha` in `[0, 1]`,
//!   mapped linearly onto the sample index range regardless of timestamps.
//!
//! Both resolve to a [`Bracket`] (`index`, `frac`) which is then applied to
//! any channel. Position, velocity and goal for one frame are therefore read
//! from the same bracket and can never drift apart.

use crate::store::TrajectoryStore;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Per-sample array of a store that can be resampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Position,
    Velocity,
    Goal,
}

/// A query value for one animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Query {
    /// Simulation time in seconds
    Time(f64),
    /// Normalized progress in `[0, 1]`
    Progress(f64),
}

/// Interval `[index, index + 1]` and the blend factor inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub index: usize,
    pub frac: f64,
}

impl Bracket {
    /// Blends `values[index]` and `values[index + 1]`.
    ///
    /// `frac == 0` and `frac == 1` return the stored sample bit-for-bit.
    pub fn apply(&self, values: &[Vector3<f64>]) -> Vector3<f64> {
        let a = values[self.index];
        if self.frac <= 0.0 {
            return a;
        }
        let b = values[self.index + 1];
        if self.frac >= 1.0 {
            return b;
        }
        a * (1.0 - self.frac) + b * self.frac
    }
}

/// Interpolated drone state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub goal: Vector3<f64>,
}

/// Resamples a [`TrajectoryStore`] at arbitrary query values.
///
/// Stateless apart from the borrowed store; every query is `O(log N)`.
#[derive(Debug, Clone, Copy)]
pub struct TemporalSampler<'a> {
    store: &'a TrajectoryStore,
}

impl<'a> TemporalSampler<'a> {
    /// Creates a sampler over a store.
    pub fn new(store: &'a TrajectoryStore) -> Self {
        Self { store }
    }

    /// The sampled store.
    pub fn store(&self) -> &'a TrajectoryStore {
        self.store
    }

    fn values(&self, channel: Channel) -> &'a [Vector3<f64>] {
        match channel {
            Channel::Position => self.store.trajectory(),
            Channel::Velocity => self.store.velocity(),
            Channel::Goal => self.store.goal_traj(),
        }
    }

    /// Clamps `query_time` into the recorded range. NaN maps to the start.
    pub fn clamp_time(&self, query_time: f64) -> f64 {
        let (start, end) = self.store.time_range();
        if query_time.is_nan() {
            return start;
        }
        query_time.clamp(start, end)
    }

    /// Bracket for a simulation timestamp.
    pub fn bracket_at_time(&self, query_time: f64) -> Bracket {
        let ts = self.store.timesteps();
        let n = ts.len();
        let (start, end) = self.store.time_range();
        let t = self.clamp_time(query_time);

        if t >= end && end > start {
            return Bracket {
                index: n - 2,
                frac: 1.0,
            };
        }

        // Insertion point before any equal timestamps, minus one
        let insert = ts.partition_point(|&x| x < t);
        let index = insert.saturating_sub(1).min(n - 2);

        let (t0, t1) = (ts[index], ts[index + 1]);
        let frac = if t1 == t0 {
            0.0
        } else {
            ((t - t0) / (t1 - t0)).clamp(0.0, 1.0)
        };
        Bracket { index, frac }
    }

    /// Bracket for a progress fraction.
    pub fn bracket_at_progress(&self, alpha: f64) -> Bracket {
        let n = self.store.sample_count();
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        let t = alpha * (n - 1) as f64;
        let i = t.floor() as usize;

        if i >= n - 1 {
            // Last sample, no extrapolation
            return Bracket {
                index: n - 2,
                frac: 1.0,
            };
        }
        Bracket {
            index: i,
            frac: t - i as f64,
        }
    }

    /// Bracket for either query style.
    pub fn bracket(&self, query: Query) -> Bracket {
        match query {
            Query::Time(t) => self.bracket_at_time(t),
            Query::Progress(alpha) => self.bracket_at_progress(alpha),
        }
    }

    /// Interpolates a channel at a simulation timestamp.
    pub fn sample_at_time(&self, channel: Channel, query_time: f64) -> Vector3<f64> {
        self.bracket_at_time(query_time).apply(self.values(channel))
    }

    /// Interpolates a channel at a progress fraction.
    pub fn sample_at_progress(&self, channel: Channel, alpha: f64) -> Vector3<f64> {
        self.bracket_at_progress(alpha).apply(self.values(channel))
    }

    /// Position, velocity and goal from a single bracket.
    pub fn pose(&self, query: Query) -> Pose {
        let bracket = self.bracket(query);
        Pose {
            position: bracket.apply(self.store.trajectory()),
            velocity: bracket.apply(self.store.velocity()),
            goal: bracket.apply(self.store.goal_traj()),
        }
    }

    /// Pose at a simulation timestamp.
    pub fn pose_at_time(&self, query_time: f64) -> Pose {
        self.pose(Query::Time(query_time))
    }

    /// Pose at a progress fraction.
    pub fn pose_at_progress(&self, alpha: f64) -> Pose {
        self.pose(Query::Progress(alpha))
    }

    /// Simulation time a query corresponds to.
    ///
    /// Progress queries are mapped through the sample index, so irregular
    /// timestamps are reflected.
    pub fn scene_time(&self, query: Query) -> f64 {
        match query {
            Query::Time(t) => self.clamp_time(t),
            Query::Progress(alpha) => {
                let ts = self.store.timesteps();
                let bracket = self.bracket_at_progress(alpha);
                let (t0, t1) = (ts[bracket.index], ts[bracket.index + 1]);
                t0 + (t1 - t0) * bracket.frac
            }
        }
    }
}
