//! Playback configuration.
//!
//! Loaded from an optional JSON file; every field has a default so partial
//! files are fine. CLI flags are layered on top through [`PlaybackOverrides`].

use crate::error::{PlayerError, Result};
use flightreplay_core::velocity::DEFAULT_ARROW_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// How the timeline turns wall-clock frames into queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Query by simulation time, honoring timestamp spacing
    #[default]
    Time,
    /// Query by normalized progress over the sample index
    Progress,
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "progress" => Ok(Self::Progress),
            other => Err(format!(
                "Unknown playback mode '{}' (expected time or progress)",
                other
            )),
        }
    }
}

/// Camera placement handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Polar angle from the vertical axis, degrees
    pub phi_deg: f64,
    /// Initial azimuth, degrees
    pub theta_deg: f64,
    pub zoom: f64,
    /// Ambient azimuth rotation in rad/s (0 = static camera)
    pub rotation_rate: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            phi_deg: 70.0,
            theta_deg: -45.0,
            zoom: 0.9,
            rotation_rate: 0.1,
        }
    }
}

/// Configuration for a playback run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub mode: PlaybackMode,

    /// Frames per second of the animation
    pub fps: u32,

    /// Wall-clock length of the animation in seconds. `None` plays time mode
    /// in real time and progress mode over [`DEFAULT_PROGRESS_RUN_TIME`].
    pub run_time_secs: Option<f64>,

    /// Draw the scaled velocity arrow
    pub show_velocity: bool,

    /// Arrow length of the fastest sample, scene units
    pub arrow_length: f64,

    pub camera: CameraConfig,
}

/// Default animation length for progress mode, seconds.
pub const DEFAULT_PROGRESS_RUN_TIME: f64 = 5.0;

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::Time,
            fps: 30,
            run_time_secs: None,
            show_velocity: true,
            arrow_length: DEFAULT_ARROW_LENGTH,
            camera: CameraConfig::default(),
        }
    }
}

/// Values that replace fields of a loaded [`PlaybackConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackOverrides {
    pub mode: Option<PlaybackMode>,
    pub fps: Option<u32>,
    pub run_time_secs: Option<f64>,
    pub arrow_length: Option<f64>,
    pub hide_velocity: bool,
    pub disable_rotation: bool,
}

impl PlaybackConfig {
    /// Reads a config from a JSON file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides in place. Unset overrides keep the current value.
    pub fn apply_overrides(&mut self, overrides: &PlaybackOverrides) {
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(fps) = overrides.fps {
            self.fps = fps;
        }
        if let Some(run_time) = overrides.run_time_secs {
            self.run_time_secs = Some(run_time);
        }
        if let Some(arrow_length) = overrides.arrow_length {
            self.arrow_length = arrow_length;
        }
        if overrides.hide_velocity {
            self.show_velocity = false;
        }
        if overrides.disable_rotation {
            self.camera.rotation_rate = 0.0;
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(PlayerError::config("fps must be positive"));
        }
        if let Some(run_time) = self.run_time_secs {
            if !run_time.is_finite() || run_time < 0.0 {
                return Err(PlayerError::config(format!(
                    "run_time_secs must be a non-negative number, got {}",
                    run_time
                )));
            }
        }
        if !self.arrow_length.is_finite() || self.arrow_length < 0.0 {
            return Err(PlayerError::config(format!(
                "arrow_length must be a non-negative number, got {}",
                self.arrow_length
            )));
        }
        if !self.camera.rotation_rate.is_finite() || !self.camera.zoom.is_finite() {
            return Err(PlayerError::config("camera values must be finite"));
        }
        Ok(())
    }

    /// Animation length for a trajectory of `duration` seconds.
    pub fn effective_run_time(&self, duration: f64) -> f64 {
        match (self.run_time_secs, self.mode) {
            (Some(run_time), _) => run_time,
            (None, PlaybackMode::Time) => duration,
            (None, PlaybackMode::Progress) => DEFAULT_PROGRESS_RUN_TIME,
        }
    }

    /// Arrow length to sample with, `None` when arrows are hidden.
    pub fn arrow(&self) -> Option<f64> {
        self.show_velocity.then_some(self.arrow_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"mode": "progress", "camera": {"rotation_rate": 0.0}}"#;
        let config: PlaybackConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.mode, PlaybackMode::Progress);
        assert_eq!(config.fps, 30);
        assert_eq!(config.camera.rotation_rate, 0.0);
        assert_eq!(config.camera.phi_deg, 70.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let json = r#"{"mode": "progress", "fps": 24, "arrow_length": 0.8}"#;
        let mut config: PlaybackConfig = serde_json::from_str(json).unwrap();

        config.apply_overrides(&PlaybackOverrides {
            mode: Some(PlaybackMode::Time),
            run_time_secs: Some(3.0),
            hide_velocity: true,
            disable_rotation: true,
            ..Default::default()
        });

        assert_eq!(config.mode, PlaybackMode::Time);
        assert_eq!(config.fps, 24);
        assert_eq!(config.run_time_secs, Some(3.0));
        assert_eq!(config.arrow_length, 0.8);
        assert_eq!(config.arrow(), None);
        assert_eq!(config.camera.rotation_rate, 0.0);
        assert_eq!(config.camera.phi_deg, 70.0);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = PlaybackConfig {
            fps: 12,
            show_velocity: false,
            ..Default::default()
        };
        let before = config.clone();

        config.apply_overrides(&PlaybackOverrides::default());
        assert_eq!(config, before);
    }

    #[test]
    fn test_rejects_zero_fps() {
        let config = PlaybackConfig {
            fps: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PlayerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_negative_run_time() {
        let config = PlaybackConfig {
            run_time_secs: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_run_time() {
        let mut config = PlaybackConfig::default();
        assert_eq!(config.effective_run_time(12.5), 12.5);

        config.mode = PlaybackMode::Progress;
        assert_eq!(config.effective_run_time(12.5), DEFAULT_PROGRESS_RUN_TIME);

        config.run_time_secs = Some(2.0);
        assert_eq!(config.effective_run_time(12.5), 2.0);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Progress".parse::<PlaybackMode>().unwrap(), PlaybackMode::Progress);
        assert!("spline".parse::<PlaybackMode>().is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("flightreplay-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"fps": 60, "show_velocity": false}"#).unwrap();

        let config = PlaybackConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.fps, 60);
        assert_eq!(config.arrow(), None);
    }
}
