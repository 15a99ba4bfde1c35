//! Camera rig with optional ambient rotation.

use crate::config::CameraConfig;
use serde::{Deserialize, Serialize};

/// Camera orientation for one frame, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOrientation {
    pub phi: f64,
    pub theta: f64,
    pub zoom: f64,
}

/// Rotates the camera azimuth at a constant rate over wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    config: CameraConfig,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    /// Orientation after `elapsed` seconds of playback.
    pub fn orientation(&self, elapsed: f64) -> CameraOrientation {
        CameraOrientation {
            phi: self.config.phi_deg.to_radians(),
            theta: self.config.theta_deg.to_radians() + self.config.rotation_rate * elapsed,
            zoom: self.config.zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_advances_theta() {
        let rig = CameraRig::new(CameraConfig::default());
        let start = rig.orientation(0.0);
        let later = rig.orientation(10.0);

        assert_relative_eq!(start.theta, (-45.0f64).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(later.theta - start.theta, 1.0, epsilon = 1e-12);
        assert_eq!(start.phi, later.phi);
    }

    #[test]
    fn test_static_camera() {
        let rig = CameraRig::new(CameraConfig {
            rotation_rate: 0.0,
            ..Default::default()
        });
        assert_eq!(rig.orientation(0.0), rig.orientation(99.0));
    }
}
