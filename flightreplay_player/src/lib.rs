//! FlightReplay Player - timeline playback of trajectory bundles
//!
//! The player owns the animation timeline. Each frame it asks the core
//! sampler for the drone pose and forwards it to one or more renderers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Query    ┌──────────────────┐
//! │   Timeline   │───────────►│ TemporalSampler  │
//! │ (time owner) │◄───────────│ (flightreplay_   │
//! └──────┬───────┘ FrameSample│  core)           │
//!        │                    └──────────────────┘
//!        ▼
//! ┌───────────────────────────────────────────┐
//! │ FrameSink: RerunSink | JsonExporter | ... │
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use flightreplay_player::{PlaybackConfig, SummarySink, Timeline};
//!
//! let store = flightreplay_core::load("flight.npz")?;
//! let timeline = Timeline::new(&store, &PlaybackConfig::default())?;
//! let mut summary = SummarySink::new();
//! timeline.run(&mut summary)?;
//! ```

mod camera;
mod config;
mod error;
mod exporter;
mod sink;
mod timeline;
mod visualizer;
pub mod demo;

pub use camera::{CameraOrientation, CameraRig};
pub use config::{
    CameraConfig, PlaybackConfig, PlaybackMode, PlaybackOverrides, DEFAULT_PROGRESS_RUN_TIME,
};
pub use error::{PlayerError, Result};
pub use exporter::{ExportFrame, JsonExporter, PlaybackExport};
pub use sink::{FrameSink, MultiSink, PlaybackSummary, SummarySink};
pub use timeline::{RunStats, Timeline};
pub use visualizer::RerunSink;
