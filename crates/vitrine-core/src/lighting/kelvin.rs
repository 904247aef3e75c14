//! Color temperature to RGB conversion.
//!
//! Piecewise fit of blackbody color against temperature, evaluated on
//! `t = kelvin / 100`:
//!
//! ```text
//! red   = 255                                        t ≤ 66
//!         329.698727446 · (t − 60)^−0.1332047592     otherwise
//! green = 99.4708025861 · ln(t) − 161.1195681661     t ≤ 66
//!         288.1221695283 · (t − 60)^−0.0755148492    otherwise
//! blue  = 255                                        t ≥ 66
//!         138.5177312231 · ln(t − 10) − 305.0447927307   t ≥ 19
//!         0                                          otherwise
//! ```
//!
//! Each channel is clamped to `[0, 255]` and normalized.
//!
//! # Reference
//! - Helland, Tanner (2012): "How to Convert Temperature (K) to RGB"

/// Convert a color temperature in Kelvin to normalized `[r, g, b]`.
///
/// Useful range is roughly 1000 K – 40000 K. 6500 K is near-neutral white.
pub fn kelvin_to_rgb(kelvin: f32) -> [f32; 3] {
    let t = kelvin as f64 / 100.0;

    let red = if t <= 66.0 {
        255.0
    } else {
        329.698727446 * (t - 60.0).powf(-0.1332047592)
    };

    let green = if t <= 66.0 {
        99.4708025861 * t.ln() - 161.1195681661
    } else {
        288.1221695283 * (t - 60.0).powf(-0.0755148492)
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t >= 19.0 {
        138.5177312231 * (t - 10.0).ln() - 305.0447927307
    } else {
        0.0
    };

    [normalize(red), normalize(green), normalize(blue)]
}

fn normalize(channel: f64) -> f32 {
    // NaN (ln of a non-positive temperature) clamps to zero.
    let clamped = if channel.is_nan() { 0.0 } else { channel.clamp(0.0, 255.0) };
    (clamped / 255.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_daylight_is_near_neutral() {
        let [r, g, b] = kelvin_to_rgb(6500.0);
        for (name, c) in [("r", r), ("g", g), ("b", b)] {
            assert!((0.9..=1.0).contains(&c), "{name} = {c}");
        }
    }

    #[test]
    fn test_candle_is_red_biased() {
        let [r, g, b] = kelvin_to_rgb(1000.0);
        assert_eq!(r, 1.0);
        assert_eq!(b, 0.0);
        assert!(g < 0.3, "green should be low, got {g}");
    }

    #[test]
    fn test_known_fixed_points() {
        // t = 55: blue = 138.5177312231 · ln(45) − 305.0447927307
        let [_, _, b] = kelvin_to_rgb(5500.0);
        let expected = (138.5177312231 * 45.0_f64.ln() - 305.0447927307) / 255.0;
        assert!((b - expected as f32).abs() < EPSILON);

        // t = 100: red and green use the power-law branch, blue saturates.
        let [r, g, b] = kelvin_to_rgb(10000.0);
        let expected_r = 329.698727446 * 40.0_f64.powf(-0.1332047592) / 255.0;
        let expected_g = 288.1221695283 * 40.0_f64.powf(-0.0755148492) / 255.0;
        assert!((r - expected_r as f32).abs() < EPSILON);
        assert!((g - expected_g as f32).abs() < EPSILON);
        assert_eq!(b, 1.0);
    }

    #[test]
    fn test_warm_to_cool_shifts_balance() {
        let warm = kelvin_to_rgb(3000.0);
        let cool = kelvin_to_rgb(12000.0);
        assert!(warm[2] < cool[2], "blue should grow with temperature");
        assert!(warm[0] > cool[0], "red should shrink with temperature");
    }

    #[test]
    fn test_channels_stay_normalized() {
        for k in (0..=40_000).step_by(250) {
            for c in kelvin_to_rgb(k as f32) {
                assert!((0.0..=1.0).contains(&c), "{k} K produced {c}");
            }
        }
    }
}
