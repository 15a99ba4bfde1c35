//! FlightReplay Core - recorded drone flights and their temporal resampling
//!
//! This library owns the numeric side of turning a simulated flight into an
//! animation:
//! 1. **Trajectory Store**: immutable positions, velocities, timestamps, goal
//!    path and obstacle footprints, persisted as `.npz` bundles
//! 2. **Temporal Sampler**: clamped piecewise-linear poses at any simulation
//!    time or progress fraction
//! 3. **Scene**: padded bounds, extruded obstacles and per-frame samples for a
//!    renderer to draw

pub mod bundle;
pub mod error;
pub mod footprint;
pub mod sampler;
pub mod scene;
pub mod store;
pub mod velocity;

// Re-export key types for convenience
pub use bundle::{load, save};
pub use error::{Result, TrajectoryError};
pub use footprint::{Footprint, ObstacleBox};
pub use sampler::{Bracket, Channel, Pose, Query, TemporalSampler};
pub use scene::{FrameSample, FrameSampler, SceneBounds, SceneLayout};
pub use store::{TrajectoryStore, TrajectoryStoreBuilder, TrajectorySummary};
pub use velocity::{Arrow, VelocityScaler};
