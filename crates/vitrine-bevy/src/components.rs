//! Marker and state components for viewer entities.

use bevy::prelude::*;
use vitrine_core::LightId;

/// The camera the viewer renders through.
#[derive(Component)]
pub struct ViewerCamera;

/// Orbit controls around a target point.
#[derive(Component, Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Rotation about world Y, radians.
    pub yaw: f32,
    /// Elevation above the XZ plane, radians.
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_pose(Vec3::new(5.0, 5.0, 5.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    pub const MIN_RADIUS: f32 = 0.05;
    pub const PITCH_LIMIT: f32 = 1.54;

    pub fn from_pose(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(Self::MIN_RADIUS);
        Self {
            target,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / radius).clamp(-1.0, 1.0).asin(),
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + self.radius * Vec3::new(cp * sy, sp, cp * cy)
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x;
        self.pitch = (self.pitch + delta.y).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.radius = (self.radius * factor).max(Self::MIN_RADIUS);
    }
}

/// Scene root of the loaded `.glb`.
#[derive(Component)]
pub struct ViewerModel;

/// A mesh inside the loaded model, with the material it shipped with.
#[derive(Component)]
pub struct ModelMesh {
    pub original: Handle<StandardMaterial>,
}

/// Spot light entity mirroring one light of the rig.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigLight(pub LightId);
