//! Viewer camera: orbit controls, projection and background.

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use vitrine_core::view::camera::CameraPose;
use vitrine_core::view::environment::{Background, Environment};

use crate::components::{OrbitCamera, ViewerCamera};
use crate::resources::ViewerState;

const ORBIT_RADIANS_PER_PIXEL: f32 = 0.008;
const ZOOM_PER_LINE: f32 = 0.1;
const PIXELS_PER_LINE: f32 = 40.0;
/// Orthographic world units per pixel at orbit radius 1.
const ORTHO_SCALE_PER_RADIUS: f32 = 0.0025;

pub fn spawn_viewer_camera(mut commands: Commands) {
    let orbit = OrbitCamera::from_pose(CameraPose::DEFAULT.position, CameraPose::DEFAULT.target);
    commands.spawn((
        ViewerCamera,
        Camera3d::default(),
        orbit,
        Transform::from_translation(orbit.position()).looking_at(orbit.target, Vec3::Y),
    ));
}

/// Left drag orbits, wheel zooms. Suspended while a light or panel drag owns the pointer.
pub fn orbit_camera(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut state: ResMut<ViewerState>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform), With<ViewerCamera>>,
) {
    if !state.session.orbit_enabled() || state.session.model_id().is_none() {
        return;
    }
    let Ok((mut orbit, mut transform)) = cameras.single_mut() else {
        return;
    };

    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let mut moved = false;
    if buttons.pressed(MouseButton::Left) && !shift && motion.delta != Vec2::ZERO {
        orbit.orbit(motion.delta * ORBIT_RADIANS_PER_PIXEL);
        moved = true;
    }
    if scroll.delta.y != 0.0 {
        let lines = match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y,
            MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_LINE,
        };
        orbit.zoom((1.0 - lines * ZOOM_PER_LINE).max(0.1));
        moved = true;
    }
    if !moved {
        return;
    }

    *transform = Transform::from_translation(orbit.position()).looking_at(orbit.target, Vec3::Y);
    // Orbiting is not a state change the rest of the viewer reacts to.
    state.bypass_change_detection().session.set_camera(CameraPose {
        position: orbit.position(),
        target: orbit.target,
    });
}

/// Push the session camera and projection onto the camera entity.
pub fn apply_camera_pose(
    mut state: ResMut<ViewerState>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform, &mut Projection), With<ViewerCamera>>,
) {
    if !state.camera_dirty {
        return;
    }
    let Ok((mut orbit, mut transform, mut projection)) = cameras.single_mut() else {
        return;
    };
    state.bypass_change_detection().camera_dirty = false;

    let pose = state.session.camera();
    *orbit = OrbitCamera::from_pose(pose.position, pose.target);
    *transform = Transform::from_translation(orbit.position()).looking_at(orbit.target, Vec3::Y);
    *projection = projection_for(state.session.environment(), orbit.radius);
}

/// Projection for the environment's fov and orthographic toggle.
pub fn projection_for(env: &Environment, radius: f32) -> Projection {
    if env.orthographic {
        Projection::Orthographic(OrthographicProjection {
            scale: radius * ORTHO_SCALE_PER_RADIUS,
            ..OrthographicProjection::default_3d()
        })
    } else {
        Projection::Perspective(PerspectiveProjection {
            fov: env.fov.clamp(1.0, 179.0).to_radians(),
            ..default()
        })
    }
}

/// Clear color for a background. Gradients use their midpoint and image
/// backgrounds clear to black beneath the image.
pub fn clear_color_for(background: &Background) -> Color {
    let [r, g, b] = match background {
        Background::Solid(rgb) => *rgb,
        Background::Gradient { top, bottom } => {
            [0, 1, 2].map(|i| (top[i] + bottom[i]) * 0.5)
        }
        Background::Image(_) => [0.0, 0.0, 0.0],
    };
    Color::srgb(r, g, b)
}

pub fn apply_background(state: Res<ViewerState>, mut clear: ResMut<ClearColor>) {
    if !state.is_changed() {
        return;
    }
    let color = clear_color_for(&state.session.environment().background());
    if clear.0 != color {
        clear.0 = color;
    }
}
