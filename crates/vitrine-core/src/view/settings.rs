//! Persisted per-model view snapshot.
//!
//! `ViewSettings` is the JSON blob stored in a model's `view_settings`
//! column. Saving strips light ids and visibility; loading regenerates ids
//! and makes every light visible again.
//!
//! Stored blobs come from older clients too, so loading never rejects a
//! whole object: [`ViewSettings::from_value`] reads each field on its own
//! and substitutes that field's default when it is missing or malformed.

use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lighting::light::LightParams;
use crate::lighting::presets;
use crate::lighting::rig::LightRig;

pub use super::environment::{BgType, Environment, MaterialMode, MaterialOverride};

/// Errors from decoding a stored view snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ViewSettingsError {
    #[error("view settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializable snapshot of viewer state for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewSettings {
    /// Light parameters in rig order. Ids and visibility are not stored.
    pub lights: Vec<LightParams>,
    #[serde(flatten)]
    pub environment: Environment,
    pub camera_position: Option<Vec3>,
    pub camera_target: Option<Vec3>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            lights: presets::default_preset().lights.to_vec(),
            environment: Environment::default(),
            camera_position: None,
            camera_target: None,
        }
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, fallback: T) -> T {
    match obj.get(key) {
        None | Some(Value::Null) => fallback,
        Some(value) => match T::deserialize(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("view settings field `{key}` is malformed ({e}), using default");
                fallback
            }
        },
    }
}

/// `Option` fields where an explicit `null` is meaningful.
fn nullable<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    field::<Option<T>>(obj, key, None)
}

fn lights_field(obj: &Map<String, Value>) -> Vec<LightParams> {
    let Some(Value::Array(items)) = obj.get("lights") else {
        if obj.contains_key("lights") {
            tracing::warn!("view settings `lights` is not an array, using default preset");
        }
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match LightParams::deserialize(item) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("skipping malformed stored light #{i}: {e}");
                None
            }
        })
        .collect()
}

impl ViewSettings {
    /// Snapshot the current rig, environment and camera for saving.
    pub fn capture(
        rig: &LightRig,
        environment: &Environment,
        camera_position: Option<Vec3>,
        camera_target: Option<Vec3>,
    ) -> Self {
        Self {
            lights: rig.params(),
            environment: environment.clone(),
            camera_position,
            camera_target,
        }
    }

    /// Decode a stored blob, defaulting each field independently.
    ///
    /// A non-object value decodes to the defaults.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::warn!("view settings are not a JSON object, using defaults");
            return Self::default();
        };
        let d = Environment::default();
        let environment = Environment {
            lights_enabled: field(obj, "lightsEnabled", d.lights_enabled),
            environment_enabled: field(obj, "environmentEnabled", d.environment_enabled),
            bloom_enabled: field(obj, "bloomEnabled", d.bloom_enabled),
            ssao_enabled: field(obj, "ssaoEnabled", d.ssao_enabled),
            bg_type: field(obj, "bgType", d.bg_type),
            bg_color1: field(obj, "bgColor1", d.bg_color1),
            bg_color2: field(obj, "bgColor2", d.bg_color2),
            bg_image: nullable(obj, "bgImage"),
            fov: field(obj, "fov", field(obj, "fieldOfView", d.fov)),
            orthographic: field(obj, "orthographic", d.orthographic),
            material_mode: field(obj, "materialMode", d.material_mode),
            material_override: nullable(obj, "materialOverride"),
        };
        Self {
            lights: lights_field(obj),
            environment,
            camera_position: nullable(obj, "cameraPosition"),
            camera_target: nullable(obj, "cameraTarget"),
        }
    }

    /// Decode a stored blob from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ViewSettingsError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    pub fn to_value(&self) -> Value {
        // Only plain data fields; serialization into a Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Materialize the stored lights as a rig: fresh ids, all visible.
    ///
    /// An empty light list falls back to the default preset.
    pub fn to_rig(&self) -> LightRig {
        if self.lights.is_empty() {
            LightRig::from_preset(presets::default_preset())
        } else {
            LightRig::from_params(&self.lights)
        }
    }
}

/// Rig for a model's stored settings, or the default preset when none are stored.
pub fn rig_for(settings: Option<&ViewSettings>) -> LightRig {
    match settings {
        Some(s) => s.to_rig(),
        None => LightRig::from_preset(presets::default_preset()),
    }
}
