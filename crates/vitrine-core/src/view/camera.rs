//! Orbit camera pose and automatic framing of a model's bounds.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest edge of the box.
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }
}

/// Where the orbit camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Pose used before a model's bounds are known.
    pub const DEFAULT: Self = Self {
        position: Vec3::new(5.0, 5.0, 5.0),
        target: Vec3::ZERO,
    };

    /// Diagonal three-quarter view that fits `bounds`: the camera sits one
    /// max-dimension away from the center along (1, 1, 1).
    pub fn framing(bounds: &Bounds) -> Self {
        let center = bounds.center();
        Self {
            position: center + Vec3::splat(bounds.max_dimension()),
            target: center,
        }
    }

    /// Pose from stored camera fields, falling back per field to [`DEFAULT`](Self::DEFAULT).
    pub fn from_stored(position: Option<Vec3>, target: Option<Vec3>) -> Self {
        Self {
            position: position.unwrap_or(Self::DEFAULT.position),
            target: target.unwrap_or(Self::DEFAULT.target),
        }
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::DEFAULT
    }
}
