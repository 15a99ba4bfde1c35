//! Obstacle footprints.
//!
//! Obstacles are stored as 2D axis-aligned rectangles in the ground plane and
//! only become 3D boxes once the scene's vertical extent is known.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Horizontal extent of an obstacle: `[x_min, x_max, y_min, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Footprint {
    /// Creates a footprint from its bounds.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Creates a footprint from a bundle row `[x_min, x_max, y_min, y_max]`.
    pub fn from_row(row: [f64; 4]) -> Self {
        Self::new(row[0], row[1], row[2], row[3])
    }

    /// Returns the bundle row `[x_min, x_max, y_min, y_max]`.
    pub fn to_row(&self) -> [f64; 4] {
        [self.x_min, self.x_max, self.y_min, self.y_max]
    }

    /// Whether `min <= max` holds on both axes and every bound is finite.
    pub fn is_valid(&self) -> bool {
        self.to_row().iter().all(|v| v.is_finite())
            && self.x_min <= self.x_max
            && self.y_min <= self.y_max
    }

    /// Extent along x.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Extent along y.
    pub fn depth(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center of the rectangle in the ground plane.
    pub fn center_xy(&self) -> (f64, f64) {
        (
            0.5 * (self.x_min + self.x_max),
            0.5 * (self.y_min + self.y_max),
        )
    }

    /// Whether the point lies inside the rectangle (edges included).
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Extrudes the footprint over `[z_low, z_high]`.
    pub fn extrude(&self, z_low: f64, z_high: f64) -> ObstacleBox {
        let (cx, cy) = self.center_xy();
        ObstacleBox {
            center: Vector3::new(cx, cy, 0.5 * (z_low + z_high)),
            half_size: Vector3::new(
                0.5 * self.width(),
                0.5 * self.depth(),
                0.5 * (z_high - z_low).abs(),
            ),
        }
    }
}

/// A footprint extruded into a 3D box, as handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleBox {
    pub center: Vector3<f64>,
    pub half_size: Vector3<f64>,
}

impl ObstacleBox {
    /// Full box dimensions (width, depth, height).
    pub fn dimensions(&self) -> Vector3<f64> {
        self.half_size * 2.0
    }
}
