//! Inbound command processing.
//!
//! This is the only place `ViewerState` changes in response to the UI.
//! Every accepted command fires `ViewChanged` so the host can push fresh
//! state outward; refused ones fire a `ViewerNotice` instead.

use bevy::prelude::*;
use vitrine_core::lighting::rig::MAX_LIGHTS;

use crate::events::{ViewChanged, ViewerCommand, ViewerNotice};
use crate::resources::{ViewerRng, ViewerState};

/// Process `ViewerCommand` messages against the session.
pub fn handle_viewer_commands(
    mut commands: MessageReader<ViewerCommand>,
    mut state: ResMut<ViewerState>,
    mut rng: ResMut<ViewerRng>,
    time: Res<Time>,
    mut changed: MessageWriter<ViewChanged>,
    mut notices: MessageWriter<ViewerNotice>,
) {
    let mut any_change = false;

    for cmd in commands.read() {
        let accepted = apply_command(&mut state, &mut rng, time.elapsed(), cmd);
        match accepted {
            Ok(true) => any_change = true,
            Ok(false) => {}
            Err(message) => {
                tracing::warn!("{message}");
                notices.write(ViewerNotice { message });
            }
        }
    }

    if any_change {
        changed.write(ViewChanged);
    }
}

/// Apply one command. `Ok(false)` means nothing changed; `Err` carries a
/// message for the user.
fn apply_command(
    state: &mut ViewerState,
    rng: &mut ViewerRng,
    now: std::time::Duration,
    cmd: &ViewerCommand,
) -> Result<bool, String> {
    match cmd {
        ViewerCommand::LoadModel {
            model_id,
            model_url,
            thumbnail_url,
            view_settings,
        } => {
            state.session.load_model(
                model_id,
                Some(thumbnail_url.as_str()),
                view_settings.as_ref(),
                now,
            );
            state.stored_view = view_settings.clone();
            state.model_url = Some(model_url.clone());
            state.bounds = None;
            state.scene_pending = true;
            state.bounds_pending = true;
            state.camera_dirty = true;
            state.materials_dirty = true;
            Ok(true)
        }
        ViewerCommand::CloseModel => {
            state.session.close_model();
            state.model_url = None;
            state.stored_view = None;
            state.bounds = None;
            state.scene_pending = true;
            state.bounds_pending = false;
            Ok(true)
        }

        ViewerCommand::AddLight => match state.session.rig_mut().add() {
            Some(_) => Ok(true),
            None => Err(format!("A rig holds at most {MAX_LIGHTS} lights")),
        },
        ViewerCommand::RemoveLight(id) => {
            if !state.session.rig().can_remove() {
                return Err("The last light cannot be removed".to_string());
            }
            Ok(state.session.rig_mut().remove(*id))
        }
        ViewerCommand::CloneLight(id) => {
            if !state.session.rig().can_add() {
                return Err(format!("A rig holds at most {MAX_LIGHTS} lights"));
            }
            Ok(state.session.rig_mut().clone_light(*id).is_some())
        }
        ViewerCommand::ToggleLight(id) => Ok(state.session.rig_mut().toggle_visibility(*id)),
        ViewerCommand::SelectLight(id) => Ok(state.session.rig_mut().select(*id)),
        ViewerCommand::UpdateLight { id, patch } => Ok(state.session.rig_mut().update(*id, patch)),
        ViewerCommand::FocusSelected => {
            let center = state.model_center();
            Ok(state.session.focus_selected(center))
        }
        ViewerCommand::Randomize => {
            state.session.rig_mut().randomize(&mut rng.0);
            Ok(true)
        }
        ViewerCommand::ApplyPreset(name) => {
            if state.session.apply_preset_named(name) {
                Ok(true)
            } else {
                Err(format!("Unknown lighting preset \"{name}\""))
            }
        }
        ViewerCommand::CyclePreset => {
            let name = state.session.cycle_preset();
            tracing::info!("Lighting preset: {name}");
            Ok(true)
        }

        ViewerCommand::SetEnvironment(env) => {
            let old = state.session.environment().clone();
            if old == *env {
                return Ok(false);
            }
            state.materials_dirty |= old.material_mode != env.material_mode
                || old.material_override != env.material_override;
            state.camera_dirty |= old.fov != env.fov || old.orthographic != env.orthographic;
            *state.session.environment_mut() = env.clone();
            Ok(true)
        }
        ViewerCommand::SetMaterialMode(mode) => {
            if state.session.environment().material_mode == *mode {
                return Ok(false);
            }
            state.session.set_material_mode(*mode);
            state.materials_dirty = true;
            Ok(true)
        }
        ViewerCommand::StudioWhite => {
            state.session.studio_white();
            Ok(true)
        }
        ViewerCommand::ToggleOrthographic => {
            state.session.toggle_orthographic();
            state.camera_dirty = true;
            Ok(true)
        }
        ViewerCommand::Reframe => match state.bounds {
            Some(bounds) => {
                state.session.reframe(&bounds);
                state.camera_dirty = true;
                Ok(true)
            }
            None => Ok(false),
        },

        ViewerCommand::ResetView => {
            let stored = state.stored_view.clone();
            state.session.reset_view_settings(stored.as_ref());
            state.materials_dirty = true;
            state.camera_dirty = true;
            Ok(true)
        }
        ViewerCommand::ViewSaved(settings) => {
            state.stored_view = Some(settings.clone());
            Ok(false)
        }
        ViewerCommand::DeleteView => {
            state.stored_view = None;
            state.session.delete_view();
            state.materials_dirty = true;
            state.camera_dirty = true;
            Ok(true)
        }

        ViewerCommand::PanelDrag(true) => Ok(state.session.begin_panel_drag()),
        ViewerCommand::PanelDrag(false) => {
            state.session.end_drag();
            Ok(false)
        }
    }
}
