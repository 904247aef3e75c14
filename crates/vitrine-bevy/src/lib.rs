//! Vitrine Bevy Plugin: runs the gallery viewer inside Bevy's ECS.
//!
//! Provides `VitrinePlugin`, which registers the viewer messages, resources
//! and systems: spot lights mirrored from the rig, orbit camera, model
//! loading with automatic framing, preview materials, thumbnail timing and
//! the pannable gallery grid.

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;

use bevy::prelude::*;

use events::{
    CaptureThumbnail, GridInput, ViewChanged, ViewerCommand, ViewerNotice, VisibleCellsChanged,
};
use resources::{GridView, PreviewMaterials, ViewerRng, ViewerState};
use systems::*;

/// Main Bevy plugin for the gallery viewer.
pub struct VitrinePlugin {
    /// Edge of one gallery grid cell in logical pixels.
    pub grid_size: f32,
}

impl Default for VitrinePlugin {
    fn default() -> Self {
        Self {
            grid_size: resources::DEFAULT_GRID_SIZE,
        }
    }
}

impl Plugin for VitrinePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ViewerCommand>()
            .add_message::<ViewChanged>()
            .add_message::<ViewerNotice>()
            .add_message::<CaptureThumbnail>()
            .add_message::<GridInput>()
            .add_message::<VisibleCellsChanged>()
            .init_resource::<ViewerState>()
            .init_resource::<ViewerRng>()
            .init_resource::<PreviewMaterials>()
            .insert_resource(GridView::new(self.grid_size))
            .add_systems(Startup, spawn_viewer_camera)
            .add_systems(
                Update,
                (
                    handle_viewer_commands,
                    spawn_model_scene.after(handle_viewer_commands),
                    tag_model_meshes,
                    measure_model_bounds.after(tag_model_meshes),
                    drag_selected_light.after(handle_viewer_commands),
                    orbit_camera.after(drag_selected_light),
                    apply_camera_pose
                        .after(measure_model_bounds)
                        .after(orbit_camera),
                    apply_material_mode.after(tag_model_meshes),
                    sync_rig_lights.after(drag_selected_light),
                    apply_background.after(handle_viewer_commands),
                    poll_thumbnail_capture.after(measure_model_bounds),
                    update_grid_view,
                ),
            );
    }
}
