//! Mirror the light rig onto spot light entities, and re-aim with shift-drag.

use std::collections::HashMap;

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use vitrine_core::lighting::rig::CameraBasis;
use vitrine_core::{Light, kelvin_to_rgb};

use crate::components::{RigLight, ViewerCamera};
use crate::events::ViewChanged;
use crate::resources::ViewerState;

/// Scale from rig intensity to Bevy lumens.
pub const LUMENS_PER_INTENSITY: f32 = 4_000.0;
/// Range used when a light has no cutoff distance.
pub const DEFAULT_RANGE: f32 = 100.0;

/// Spot light component for one rig light.
pub fn spot_light_for(light: &Light) -> SpotLight {
    let p = &light.params;
    let [r, g, b] = kelvin_to_rgb(p.kelvin);
    let outer = p.angle_radians().min(std::f32::consts::FRAC_PI_2);
    SpotLight {
        color: Color::srgb(r, g, b),
        intensity: p.intensity * LUMENS_PER_INTENSITY,
        range: p.distance.filter(|d| *d > 0.0).unwrap_or(DEFAULT_RANGE),
        inner_angle: outer * (1.0 - p.penumbra.clamp(0.0, 1.0)),
        outer_angle: outer,
        shadows_enabled: true,
        ..default()
    }
}

/// Transform at the light's position, pointing at its target.
pub fn light_transform(light: &Light) -> Transform {
    let p = &light.params;
    let dir = (p.target_position - p.position).normalize_or_zero();
    if dir == Vec3::ZERO {
        return Transform::from_translation(p.position);
    }
    // Straight up or down: Y cannot serve as the up vector.
    let up = if dir.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
    Transform::from_translation(p.position).looking_at(p.target_position, up)
}

/// Spawn, update and despawn `RigLight` entities to match the session rig.
pub fn sync_rig_lights(
    mut commands: Commands,
    state: Res<ViewerState>,
    mut lights: Query<(Entity, &RigLight, &mut SpotLight, &mut Transform, &mut Visibility)>,
) {
    if !state.is_changed() {
        return;
    }
    let rig = state.session.rig();
    let enabled = state.session.environment().lights_enabled && state.session.model_id().is_some();
    let wanted: HashMap<_, _> = rig.lights().iter().map(|l| (l.id, l)).collect();

    let mut present = Vec::with_capacity(wanted.len());
    for (entity, rig_light, mut spot, mut transform, mut visibility) in &mut lights {
        let Some(light) = wanted.get(&rig_light.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        present.push(rig_light.0);
        *spot = spot_light_for(light);
        *transform = light_transform(light);
        *visibility = visibility_for(light, enabled);
    }

    for light in rig.lights().iter().filter(|l| !present.contains(&l.id)) {
        commands.spawn((
            RigLight(light.id),
            spot_light_for(light),
            light_transform(light),
            visibility_for(light, enabled),
        ));
    }
}

fn visibility_for(light: &Light, enabled: bool) -> Visibility {
    if enabled && light.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

/// Shift + left drag re-aims the selected light; orbit is suspended meanwhile.
pub fn drag_selected_light(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    motion: Res<AccumulatedMouseMotion>,
    camera: Query<&Transform, With<ViewerCamera>>,
    mut state: ResMut<ViewerState>,
    mut changed: MessageWriter<ViewChanged>,
) {
    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    if buttons.just_pressed(MouseButton::Left) && shift && !state.session.begin_light_drag() {
        return;
    }
    if buttons.just_released(MouseButton::Left) {
        state.session.end_drag();
        return;
    }
    if motion.delta == Vec2::ZERO || !buttons.pressed(MouseButton::Left) {
        return;
    }
    let Ok(transform) = camera.single() else {
        return;
    };
    let basis = CameraBasis::from_rotation(transform.rotation);
    if state.bypass_change_detection().session.drag_light(motion.delta, basis) {
        state.set_changed();
        changed.write(ViewChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::{LightId, LightParams};

    #[test]
    fn test_spot_light_cone_and_color() {
        let mut params = LightParams::DEFAULT;
        params.angle = 30.0;
        params.penumbra = 0.5;
        params.kelvin = 6600.0;
        let spot = spot_light_for(&Light::new(LightId(1), params));
        assert!((spot.outer_angle - 30f32.to_radians()).abs() < 1e-5);
        assert!((spot.inner_angle - 15f32.to_radians()).abs() < 1e-5);
        assert_eq!(spot.range, DEFAULT_RANGE);
    }

    #[test]
    fn test_light_points_at_target() {
        let mut params = LightParams::DEFAULT;
        params.position = Vec3::new(0.0, 5.0, 0.0);
        params.target_position = Vec3::ZERO;
        let transform = light_transform(&Light::new(LightId(1), params));
        let forward = transform.forward();
        assert!((forward.as_vec3() - Vec3::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn test_hidden_when_rig_lights_disabled() {
        let light = Light::new(LightId(1), LightParams::DEFAULT);
        assert_eq!(visibility_for(&light, false), Visibility::Hidden);
        assert_eq!(visibility_for(&light, true), Visibility::Visible);
    }
}
