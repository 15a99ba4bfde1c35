//! The Trajectory Store - immutable arrays describing one recorded flight.
//!
//! A store is either loaded from a bundle (see [`crate::bundle`]) or built
//! directly by an upstream simulator. Every constructor validates the same
//! invariants, so readers never re-check them:
//!
//! - at least 2 samples
//! - `trajectory`, `velocity`, `goal_traj` and `timesteps` share the length N
//! - `timesteps` is non-decreasing
//! - every obstacle footprint has `min <= max` on both axes
//! - every value is finite

use crate::error::{Result, TrajectoryError};
use crate::footprint::Footprint;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Recorded drone flight: positions, velocities, timestamps, goal path and
/// static obstacles.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryStore {
    trajectory: Vec<Vector3<f64>>,
    velocity: Vec<Vector3<f64>>,
    timesteps: Vec<f64>,
    goal_traj: Vec<Vector3<f64>>,
    obstacles: Vec<Footprint>,
}

impl TrajectoryStore {
    /// Creates a store from all five fields.
    pub fn new(
        trajectory: Vec<Vector3<f64>>,
        velocity: Vec<Vector3<f64>>,
        timesteps: Vec<f64>,
        goal_traj: Vec<Vector3<f64>>,
        obstacles: Vec<Footprint>,
    ) -> Result<Self> {
        let store = Self {
            trajectory,
            velocity,
            timesteps,
            goal_traj,
            obstacles,
        };
        store.validate()?;
        Ok(store)
    }

    /// Starts a builder where `goal_traj` and `obstacles` are optional.
    pub fn builder(
        trajectory: Vec<Vector3<f64>>,
        velocity: Vec<Vector3<f64>>,
        timesteps: Vec<f64>,
    ) -> TrajectoryStoreBuilder {
        TrajectoryStoreBuilder {
            trajectory,
            velocity,
            timesteps,
            goal_traj: None,
            obstacles: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        let n = self.trajectory.len();
        if n < 2 {
            return Err(TrajectoryError::TooFewSamples(n));
        }

        for (field, len) in [
            ("velocity", self.velocity.len()),
            ("timesteps", self.timesteps.len()),
            ("goal_traj", self.goal_traj.len()),
        ] {
            if len != n {
                return Err(TrajectoryError::shape(field, n, len));
            }
        }

        for (field, points) in [
            ("trajectory", &self.trajectory),
            ("velocity", &self.velocity),
            ("goal_traj", &self.goal_traj),
        ] {
            if let Some(index) = points.iter().position(|p| !p.iter().all(|v| v.is_finite())) {
                return Err(TrajectoryError::NonFinite { field, index });
            }
        }

        if let Some(index) = self.timesteps.iter().position(|t| !t.is_finite()) {
            return Err(TrajectoryError::NonFinite {
                field: "timesteps",
                index,
            });
        }

        if let Some(index) = (1..n).find(|&i| self.timesteps[i] < self.timesteps[i - 1]) {
            return Err(TrajectoryError::NonMonotonicTimesteps { index });
        }

        if let Some(index) = self.obstacles.iter().position(|fp| !fp.is_valid()) {
            return Err(TrajectoryError::InvalidFootprint { index });
        }

        Ok(())
    }

    /// Drone positions, one per sample.
    pub fn trajectory(&self) -> &[Vector3<f64>] {
        &self.trajectory
    }

    /// Drone velocities, one per sample.
    pub fn velocity(&self) -> &[Vector3<f64>] {
        &self.velocity
    }

    /// Simulation time of each sample (non-decreasing).
    pub fn timesteps(&self) -> &[f64] {
        &self.timesteps
    }

    /// Goal positions, one per sample.
    pub fn goal_traj(&self) -> &[Vector3<f64>] {
        &self.goal_traj
    }

    /// Static obstacle footprints.
    pub fn obstacles(&self) -> &[Footprint] {
        &self.obstacles
    }

    /// Number of samples N.
    pub fn sample_count(&self) -> usize {
        self.trajectory.len()
    }

    /// `timesteps[N-1] - timesteps[0]`; 0 when every timestamp is equal.
    pub fn duration(&self) -> f64 {
        let (start, end) = self.time_range();
        end - start
    }

    /// First and last timestamp.
    pub fn time_range(&self) -> (f64, f64) {
        // N >= 2 is guaranteed by construction
        (self.timesteps[0], self.timesteps[self.timesteps.len() - 1])
    }

    /// Last recorded drone position.
    pub fn final_position(&self) -> Vector3<f64> {
        self.trajectory[self.trajectory.len() - 1]
    }

    /// Largest velocity norm over the whole flight.
    pub fn max_speed(&self) -> f64 {
        self.velocity.iter().map(|v| v.norm()).fold(0.0, f64::max)
    }

    /// Component-wise (min, max) of the drone positions.
    pub fn bounds(&self) -> (Vector3<f64>, Vector3<f64>) {
        let first = self.trajectory[0];
        self.trajectory
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p)))
    }

    /// Total length of the flight path polyline.
    pub fn path_length(&self) -> f64 {
        self.trajectory
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Summary of the flight for logs and the `info` command.
    pub fn summary(&self) -> TrajectorySummary {
        let (start_time, end_time) = self.time_range();
        let (min, max) = self.bounds();
        TrajectorySummary {
            samples: self.sample_count(),
            start_time,
            end_time,
            duration: self.duration(),
            path_length: self.path_length(),
            max_speed: self.max_speed(),
            bounds_min: [min.x, min.y, min.z],
            bounds_max: [max.x, max.y, max.z],
            obstacles: self.obstacles.len(),
            static_goal: self.goal_traj.iter().all(|g| *g == self.goal_traj[0]),
        }
    }
}

/// Builder for a [`TrajectoryStore`] with optional goal path and obstacles.
///
/// A missing goal path defaults to the final drone position at every sample,
/// the same rule applied when loading a bundle.
#[derive(Debug, Clone)]
pub struct TrajectoryStoreBuilder {
    trajectory: Vec<Vector3<f64>>,
    velocity: Vec<Vector3<f64>>,
    timesteps: Vec<f64>,
    goal_traj: Option<Vec<Vector3<f64>>>,
    obstacles: Vec<Footprint>,
}

impl TrajectoryStoreBuilder {
    /// Sets an explicit goal path.
    pub fn goal_traj(mut self, goal_traj: Vec<Vector3<f64>>) -> Self {
        self.goal_traj = Some(goal_traj);
        self
    }

    /// Sets the obstacle footprints.
    pub fn obstacles(mut self, obstacles: Vec<Footprint>) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Validates and builds the store.
    pub fn build(self) -> Result<TrajectoryStore> {
        let goal_traj = match self.goal_traj {
            Some(goal) => goal,
            None => static_goal(&self.trajectory)?,
        };
        TrajectoryStore::new(
            self.trajectory,
            self.velocity,
            self.timesteps,
            goal_traj,
            self.obstacles,
        )
    }
}

/// Goal path fixed at the last trajectory point.
pub(crate) fn static_goal(trajectory: &[Vector3<f64>]) -> Result<Vec<Vector3<f64>>> {
    let last = trajectory
        .last()
        .ok_or(TrajectoryError::TooFewSamples(0))?;
    Ok(vec![*last; trajectory.len()])
}

/// Flight statistics derived from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub samples: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub path_length: f64,
    pub max_speed: f64,
    pub bounds_min: [f64; 3],
    pub bounds_max: [f64; 3],
    pub obstacles: usize,
    /// Whether the goal never moves
    pub static_goal: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(n: usize) -> Vec<Vector3<f64>> {
        (0..n).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect()
    }

    fn times(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_builder_defaults_goal_to_final_position() {
        let store = TrajectoryStore::builder(line(3), line(3), times(3))
            .build()
            .unwrap();

        assert_eq!(store.goal_traj().len(), 3);
        for g in store.goal_traj() {
            assert_eq!(*g, Vector3::new(2.0, 0.0, 0.0));
        }
        assert!(store.obstacles().is_empty());
        assert!(store.summary().static_goal);
    }

    #[test]
    fn test_rejects_single_sample() {
        let err = TrajectoryStore::builder(line(1), line(1), times(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, TrajectoryError::TooFewSamples(1)));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = TrajectoryStore::builder(line(3), line(2), times(3))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TrajectoryError::ShapeMismatch { field: "velocity", .. }
        ));
    }

    #[test]
    fn test_rejects_decreasing_timesteps() {
        let err = TrajectoryStore::builder(line(3), line(3), vec![0.0, 2.0, 1.0])
            .build()
            .unwrap_err();
        assert!(matches!(err, TrajectoryError::NonMonotonicTimesteps { index: 2 }));
    }

    #[test]
    fn test_accepts_duplicate_timesteps() {
        let store = TrajectoryStore::builder(line(4), line(4), vec![0.0, 0.0, 1.0, 1.0])
            .build()
            .unwrap();
        assert_relative_eq!(store.duration(), 1.0);
    }

    #[test]
    fn test_rejects_inverted_footprint() {
        let err = TrajectoryStore::builder(line(2), line(2), times(2))
            .obstacles(vec![
                Footprint::new(0.0, 1.0, 0.0, 1.0),
                Footprint::new(0.0, 1.0, 3.0, 1.0),
            ])
            .build()
            .unwrap_err();
        assert!(matches!(err, TrajectoryError::InvalidFootprint { index: 1 }));
    }

    #[test]
    fn test_rejects_nan_position() {
        let mut traj = line(3);
        traj[1].y = f64::NAN;
        let err = TrajectoryStore::builder(traj, line(3), times(3))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TrajectoryError::NonFinite { field: "trajectory", index: 1 }
        ));
    }

    #[test]
    fn test_zero_duration_when_timestamps_equal() {
        let store = TrajectoryStore::builder(line(3), line(3), vec![4.0; 3])
            .build()
            .unwrap();
        assert_eq!(store.duration(), 0.0);
    }

    #[test]
    fn test_derived_queries() {
        let traj = vec![
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(3.0, 4.0, 1.0),
            Vector3::new(3.0, 4.0, -1.0),
        ];
        let vel = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::new(0.0, 0.0, 0.5),
        ];
        let store = TrajectoryStore::builder(traj, vel, vec![1.0, 2.0, 4.0])
            .build()
            .unwrap();

        assert_eq!(store.sample_count(), 3);
        assert_relative_eq!(store.duration(), 3.0);
        assert_relative_eq!(store.max_speed(), 2.0);
        assert_relative_eq!(store.path_length(), 7.0);

        let (lo, hi) = store.bounds();
        assert_eq!(lo, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(hi, Vector3::new(3.0, 4.0, 1.0));
    }
}
