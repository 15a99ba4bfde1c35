//! Synthetic demo flight.
//!
//! Generates a climbing helix with a goal that leads the drone, the same kind
//! of bundle an upstream simulator writes, so the player can be tried without
//! one.

use flightreplay_core::{Footprint, Result, TrajectoryStore};
use nalgebra::Vector3;
use std::f64::consts::TAU;

const RADIUS: f64 = 1.5;
const TURNS: f64 = 2.0;
const Z_START: f64 = 0.5;
const Z_END: f64 = 2.5;
/// Fraction of the flight the goal runs ahead of the drone
const GOAL_LEAD: f64 = 0.25;

fn helix(u: f64) -> Vector3<f64> {
    let angle = TAU * TURNS * u;
    Vector3::new(
        RADIUS * angle.cos(),
        RADIUS * angle.sin(),
        Z_START + (Z_END - Z_START) * u,
    )
}

/// d(helix)/du
fn helix_tangent(u: f64) -> Vector3<f64> {
    let w = TAU * TURNS;
    let angle = w * u;
    Vector3::new(-RADIUS * w * angle.sin(), RADIUS * w * angle.cos(), Z_END - Z_START)
}

/// Builds a helix flight of `samples` points over `duration` seconds.
pub fn helix_store(samples: usize, duration: f64) -> Result<TrajectoryStore> {
    let last = samples.saturating_sub(1).max(1) as f64;
    let us: Vec<f64> = (0..samples).map(|i| i as f64 / last).collect();

    let trajectory = us.iter().map(|&u| helix(u)).collect();
    let velocity = us
        .iter()
        .map(|&u| {
            if duration > 0.0 {
                helix_tangent(u) / duration
            } else {
                Vector3::zeros()
            }
        })
        .collect();
    let timesteps = us.iter().map(|&u| u * duration).collect();
    let goal_traj = us.iter().map(|&u| helix((u + GOAL_LEAD).min(1.0))).collect();

    TrajectoryStore::builder(trajectory, velocity, timesteps)
        .goal_traj(goal_traj)
        .obstacles(vec![
            // Inside the helix, never crossed
            Footprint::new(-0.4, 0.4, -0.4, 0.4),
            // Outside the helix
            Footprint::new(2.0, 2.6, -0.5, 0.5),
        ])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_helix_store_shape() {
        let store = helix_store(200, 8.0).unwrap();

        assert_eq!(store.sample_count(), 200);
        assert_relative_eq!(store.duration(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(
            store.trajectory()[0],
            Vector3::new(RADIUS, 0.0, Z_START),
            epsilon = 1e-12
        );
        assert_eq!(store.obstacles().len(), 2);
        assert!(!store.summary().static_goal);
    }

    #[test]
    fn test_helix_avoids_obstacles() {
        let store = helix_store(500, 10.0).unwrap();
        for p in store.trajectory() {
            for fp in store.obstacles() {
                assert!(!fp.contains_xy(p.x, p.y));
            }
        }
    }

    #[test]
    fn test_goal_ends_at_final_position() {
        let store = helix_store(50, 5.0).unwrap();
        assert_relative_eq!(
            store.goal_traj()[49],
            store.final_position(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_too_few_samples() {
        assert!(helix_store(1, 5.0).is_err());
    }
}
