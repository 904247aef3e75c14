//! Scene environment around the model: background, effects, material preview mode.

use palette::Srgb;
use serde::{Deserialize, Serialize};

/// How the viewport background is painted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgType {
    #[default]
    Color,
    Gradient,
    Image,
}

/// Surface shading used to preview the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialMode {
    /// The model's own PBR materials.
    Pbr,
    /// Surface normals visualized as color.
    Normal,
    /// Flat white clay.
    #[default]
    White,
}

impl MaterialMode {
    /// Mode bound to a number-row hotkey (`1` white, `2` pbr, `3` normal).
    pub fn from_hotkey(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::White),
            2 => Some(Self::Pbr),
            3 => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Physical material applied over the whole model when enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialOverride {
    pub enabled: bool,
    /// Base color as a CSS hex string.
    pub color: String,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub ior: f32,
    pub transmission: f32,
}

impl Default for MaterialOverride {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#e5e5e5".to_string(),
            metalness: 1.0,
            roughness: 1.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.6,
            ior: 1.5,
            transmission: 0.0,
        }
    }
}

/// Everything about the viewer except the lights and the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    pub lights_enabled: bool,
    pub environment_enabled: bool,
    pub bloom_enabled: bool,
    pub ssao_enabled: bool,
    pub bg_type: BgType,
    pub bg_color1: String,
    pub bg_color2: String,
    pub bg_image: Option<String>,
    /// Vertical field of view in degrees.
    #[serde(alias = "fieldOfView")]
    pub fov: f32,
    pub orthographic: bool,
    pub material_mode: MaterialMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_override: Option<MaterialOverride>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            lights_enabled: true,
            environment_enabled: false,
            bloom_enabled: false,
            ssao_enabled: false,
            bg_type: BgType::Color,
            bg_color1: "#000000".to_string(),
            bg_color2: "#1a1a1a".to_string(),
            bg_image: None,
            fov: 50.0,
            orthographic: false,
            material_mode: MaterialMode::White,
            material_override: None,
        }
    }
}

/// Resolved background paint. Colors are sRGB components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Solid([f32; 3]),
    Gradient { top: [f32; 3], bottom: [f32; 3] },
    Image(String),
}

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];

/// Parse a CSS hex color (`#rrggbb` or `#rgb`, `#` optional).
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let rgb: Srgb<u8> = hex.trim().parse().ok()?;
    let rgb: Srgb<f32> = rgb.into_format();
    Some([rgb.red, rgb.green, rgb.blue])
}

fn color_or_black(hex: &str) -> [f32; 3] {
    parse_hex_color(hex).unwrap_or_else(|| {
        tracing::warn!("invalid background color {hex:?}, using black");
        BLACK
    })
}

impl Environment {
    /// The background to paint.
    ///
    /// A disabled environment is always black. An image background without
    /// an image falls back to the primary color.
    pub fn background(&self) -> Background {
        if !self.environment_enabled {
            return Background::Solid(BLACK);
        }
        match (self.bg_type, &self.bg_image) {
            (BgType::Gradient, _) => Background::Gradient {
                top: color_or_black(&self.bg_color1),
                bottom: color_or_black(&self.bg_color2),
            },
            (BgType::Image, Some(url)) if !url.is_empty() => Background::Image(url.clone()),
            _ => Background::Solid(color_or_black(&self.bg_color1)),
        }
    }

    /// Bright studio look: environment on, plain white background.
    pub fn studio_white(&mut self) {
        self.environment_enabled = true;
        self.bg_type = BgType::Color;
        self.bg_color1 = "#ffffff".to_string();
    }
}
