//! JSON exporter for external animation tools.
//!
//! Writes the static scene and every sampled frame to one JSON document, so
//! a renderer outside this workspace can replay the flight without
//! re-implementing the sampler.

use crate::camera::CameraOrientation;
use crate::config::PlaybackMode;
use crate::error::Result;
use crate::sink::FrameSink;
use flightreplay_core::{FrameSample, SceneLayout};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// A single exported frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFrame {
    pub sample: FrameSample,

    pub camera: CameraOrientation,
}

/// Complete playback export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackExport {
    /// Source bundle name
    pub source: String,

    pub mode: PlaybackMode,

    pub fps: u32,

    /// Static scene, present once playback has begun
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<SceneLayout>,

    /// All frames
    pub frames: Vec<ExportFrame>,
}

impl PlaybackExport {
    /// Creates a new export container.
    pub fn new(source: &str, mode: PlaybackMode, fps: u32) -> Self {
        Self {
            source: source.to_string(),
            mode,
            fps,
            layout: None,
            frames: Vec::new(),
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, sample: FrameSample, camera: CameraOrientation) {
        self.frames.push(ExportFrame { sample, camera });
    }

    /// Wall-clock length of the export in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames.len().saturating_sub(1) as f64 / self.fps.max(1) as f64
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Reads an export back from a JSON file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// [`FrameSink`] that collects a [`PlaybackExport`] and writes it on finish.
pub struct JsonExporter {
    export: PlaybackExport,
    path: PathBuf,
}

impl JsonExporter {
    pub fn new(path: impl Into<PathBuf>, export: PlaybackExport) -> Self {
        Self {
            export,
            path: path.into(),
        }
    }

    pub fn export(&self) -> &PlaybackExport {
        &self.export
    }
}

impl FrameSink for JsonExporter {
    fn begin(&mut self, layout: &SceneLayout) -> Result<()> {
        self.export.layout = Some(layout.clone());
        self.export.frames.clear();
        Ok(())
    }

    fn frame(&mut self, frame: &FrameSample, camera: &CameraOrientation) -> Result<()> {
        self.export.add_frame(*frame, *camera);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.export.write_to_file(&self.path)?;
        info!(
            "Exported {} frames to {}",
            self.export.frames.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaybackConfig;
    use crate::timeline::Timeline;
    use flightreplay_core::{Footprint, TrajectoryStore};
    use nalgebra::Vector3;

    #[test]
    fn test_export_roundtrip_through_timeline() {
        let traj = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(2.0, 0.0, 1.0)];
        let vel = vec![Vector3::new(2.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)];
        let store = TrajectoryStore::builder(traj, vel, vec![0.0, 1.0])
            .obstacles(vec![Footprint::new(0.5, 1.0, 0.5, 1.0)])
            .build()
            .unwrap();
        let config = PlaybackConfig {
            fps: 2,
            ..Default::default()
        };

        let path =
            std::env::temp_dir().join(format!("flightreplay-{}.json", uuid::Uuid::new_v4()));
        let export = PlaybackExport::new("unit", config.mode, config.fps);
        let mut exporter = JsonExporter::new(&path, export);
        Timeline::new(&store, &config).unwrap().run(&mut exporter).unwrap();

        let export = PlaybackExport::read_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(export.frames.len(), 3);
        assert_eq!(export.duration_secs(), 1.0);
        assert_eq!(export.layout.as_ref().unwrap().obstacles.len(), 1);
        assert_eq!(export.frames[1].sample.pose.position, Vector3::new(1.0, 0.0, 1.0));
        assert!(export.frames[1].sample.arrow.is_some());
    }
}
