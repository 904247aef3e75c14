//! Spot-light parameter sets.
//!
//! [`LightParams`] is the persisted shape (no id, no visibility); [`Light`]
//! adds the rig-local identity and render toggle.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Rig-local light identity. Unique within one [`LightRig`](super::rig::LightRig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightId(pub u64);

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "light#{}", self.0)
    }
}

/// Color temperatures a light can be patched to.
pub const KELVIN_RANGE: std::ops::RangeInclusive<f32> = 1000.0..=12000.0;

/// Physical parameters of one spot light.
///
/// Every field falls back to its default when absent from stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightParams {
    /// World-space emitter location.
    pub position: Vec3,
    /// World-space aim point.
    pub target_position: Vec3,
    /// Luminous intensity. Non-negative.
    pub intensity: f32,
    /// Color temperature in Kelvin. Patches clamp it to [`KELVIN_RANGE`].
    pub kelvin: f32,
    /// Physical falloff exponent. Non-negative.
    pub decay: f32,
    /// Cone half-angle in degrees, `[0, 90]`.
    pub angle: f32,
    /// Soft-edge fraction of the cone, `[0, 1]`.
    pub penumbra: f32,
    /// Falloff distance. `0` means infinite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    /// Legacy volumetric opacity, carried through but not rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_opacity: Option<f32>,
}

impl LightParams {
    /// Parameters of a freshly added light.
    pub const DEFAULT: Self = Self {
        position: Vec3::new(-2.0, 3.0, 2.0),
        target_position: Vec3::ZERO,
        intensity: 3.0,
        kelvin: 5500.0,
        decay: 1.0,
        angle: 45.0,
        penumbra: 0.5,
        distance: None,
        volume_opacity: None,
    };

    /// Spot light aimed from `position` at `target`.
    pub const fn spot(
        position: Vec3,
        target: Vec3,
        intensity: f32,
        kelvin: f32,
        decay: f32,
        angle: f32,
        penumbra: f32,
    ) -> Self {
        Self {
            position,
            target_position: target,
            intensity,
            kelvin,
            decay,
            angle,
            penumbra,
            distance: None,
            volume_opacity: None,
        }
    }

    /// Cone half-angle in radians.
    pub fn angle_radians(&self) -> f32 {
        self.angle.to_radians()
    }
}

impl Default for LightParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A light as it exists inside a rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Light {
    pub id: LightId,
    /// Render toggle, independent of the light's existence.
    pub visible: bool,
    #[serde(flatten)]
    pub params: LightParams,
}

impl Light {
    pub fn new(id: LightId, params: LightParams) -> Self {
        Self {
            id,
            visible: true,
            params,
        }
    }
}

/// Partial attribute set merged into a light by
/// [`LightRig::update`](super::rig::LightRig::update). The id is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightPatch {
    pub visible: Option<bool>,
    pub position: Option<Vec3>,
    pub target_position: Option<Vec3>,
    pub intensity: Option<f32>,
    pub kelvin: Option<f32>,
    pub decay: Option<f32>,
    pub angle: Option<f32>,
    pub penumbra: Option<f32>,
    pub distance: Option<f32>,
}

impl LightPatch {
    /// Whether the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the present fields into `light`. Returns whether anything changed.
    pub fn apply(&self, light: &mut Light) -> bool {
        let before = light.clone();
        let p = &mut light.params;
        if let Some(v) = self.visible {
            light.visible = v;
        }
        if let Some(v) = self.position {
            p.position = v;
        }
        if let Some(v) = self.target_position {
            p.target_position = v;
        }
        if let Some(v) = self.intensity {
            p.intensity = v.max(0.0);
        }
        if let Some(v) = self.kelvin {
            p.kelvin = v.clamp(*KELVIN_RANGE.start(), *KELVIN_RANGE.end());
        }
        if let Some(v) = self.decay {
            p.decay = v.max(0.0);
        }
        if let Some(v) = self.angle {
            p.angle = v.clamp(0.0, 90.0);
        }
        if let Some(v) = self.penumbra {
            p.penumbra = v.clamp(0.0, 1.0);
        }
        if let Some(v) = self.distance {
            p.distance = Some(v.max(0.0));
        }
        *light != before
    }
}
