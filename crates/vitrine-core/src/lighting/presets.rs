//! Named lighting presets.

use glam::Vec3;

use super::light::LightParams;

/// A named, ordered set of light parameters.
#[derive(Debug)]
pub struct LightingPreset {
    pub name: &'static str,
    pub lights: &'static [LightParams],
}

const fn v(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Built-in presets. The first entry is the fallback for models without saved settings.
pub const PRESETS: &[LightingPreset] = &[
    LightingPreset {
        name: "3-Point",
        lights: &[
            LightParams::spot(v(-2.5, 2.2, 3.2), v(0.0, 0.6, 0.0), 28.0, 5600.0, 1.6, 38.0, 0.4),
            LightParams::spot(v(2.8, 1.2, 2.2), v(0.0, 0.6, 0.0), 8.0, 4200.0, 2.0, 55.0, 0.7),
            LightParams::spot(v(0.0, 2.0, -2.4), v(0.0, 0.4, 0.0), 18.0, 7000.0, 1.8, 50.0, 0.5),
        ],
    },
    LightingPreset {
        name: "Studio Soft",
        lights: &[
            LightParams::spot(v(0.0, 3.5, 2.2), v(0.0, 0.5, 0.0), 16.0, 6500.0, 1.2, 85.0, 1.0),
            LightParams::spot(v(-3.0, 2.0, 3.0), v(0.0, 0.5, 0.0), 6.0, 6000.0, 1.8, 65.0, 0.8),
        ],
    },
    LightingPreset {
        name: "Hard Rim",
        lights: &[
            LightParams::spot(v(3.5, 1.5, -2.5), v(0.0, 0.7, 0.0), 28.0, 7500.0, 1.6, 30.0, 0.3),
            LightParams::spot(v(-3.0, 1.0, 2.5), v(0.0, 0.6, 0.0), 10.0, 4000.0, 2.0, 45.0, 0.5),
        ],
    },
    LightingPreset {
        name: "Moody",
        lights: &[
            LightParams::spot(v(-1.5, 1.2, 1.8), v(0.0, 0.4, 0.0), 10.0, 3200.0, 1.4, 25.0, 0.6),
            LightParams::spot(v(1.4, 0.8, -2.0), v(0.0, 0.3, 0.0), 14.0, 9000.0, 1.8, 35.0, 0.4),
        ],
    },
];

/// The preset used when a model has no saved view.
pub fn default_preset() -> &'static LightingPreset {
    &PRESETS[0]
}

/// Look up a preset by its display name (case-insensitive).
pub fn preset_by_name(name: &str) -> Option<&'static LightingPreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Index of the preset after `current`, wrapping. `None` starts at the first preset.
pub fn next_preset_index(current: Option<usize>) -> usize {
    match current {
        Some(i) => (i + 1) % PRESETS.len(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::rig::MAX_LIGHTS;

    #[test]
    fn test_default_is_three_point() {
        assert_eq!(default_preset().name, "3-Point");
        assert_eq!(default_preset().lights.len(), 3);
    }

    #[test]
    fn test_presets_fit_in_rig() {
        for preset in PRESETS {
            assert!(!preset.lights.is_empty(), "{} is empty", preset.name);
            assert!(preset.lights.len() <= MAX_LIGHTS, "{} too large", preset.name);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(preset_by_name("hard rim").map(|p| p.name), Some("Hard Rim"));
        assert!(preset_by_name("Disco").is_none());
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(next_preset_index(None), 0);
        assert_eq!(next_preset_index(Some(0)), 1);
        assert_eq!(next_preset_index(Some(PRESETS.len() - 1)), 0);
    }
}
