//! Spot-light rig: light parameters, presets and color temperature.

pub mod kelvin;
pub mod light;
pub mod presets;
pub mod rig;
