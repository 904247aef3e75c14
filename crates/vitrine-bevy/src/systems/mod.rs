//! Bevy systems for the gallery viewer.
//!
//! `commands` is the only place UI commands change viewer state; the other
//! systems mirror that state onto the scene.

pub mod camera;
pub mod commands;
pub mod grid;
pub mod lights;
pub mod model;

pub use camera::{apply_background, apply_camera_pose, orbit_camera, spawn_viewer_camera};
pub use commands::handle_viewer_commands;
pub use grid::update_grid_view;
pub use lights::{drag_selected_light, sync_rig_lights};
pub use model::{
    apply_material_mode, measure_model_bounds, poll_thumbnail_capture, spawn_model_scene,
    tag_model_meshes,
};
