//! Viewer hotkeys. They only fire while a model is open.

use bevy::prelude::*;
use vitrine_bevy::events::{CaptureThumbnail, ViewerCommand};
use vitrine_bevy::resources::ViewerState;
use vitrine_core::MaterialMode;

use crate::gallery::{self, GalleryState};
use crate::library::LibraryBridge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Material(MaterialMode),
    Reframe,
    /// Toggle orthographic projection and frame the model again.
    Orthographic,
    StudioWhite,
    /// Save the view, then capture a fresh thumbnail.
    SaveThumbnail,
    Randomize,
    CyclePreset,
    NextModel,
    PrevModel,
    Close,
}

pub fn hotkey_for(key: KeyCode) -> Option<Hotkey> {
    let hotkey = match key {
        KeyCode::Digit1 => Hotkey::Material(MaterialMode::White),
        KeyCode::Digit2 => Hotkey::Material(MaterialMode::Pbr),
        KeyCode::Digit3 => Hotkey::Material(MaterialMode::Normal),
        KeyCode::KeyF => Hotkey::Reframe,
        KeyCode::KeyO => Hotkey::Orthographic,
        KeyCode::KeyE => Hotkey::StudioWhite,
        KeyCode::KeyT => Hotkey::SaveThumbnail,
        KeyCode::KeyR => Hotkey::Randomize,
        KeyCode::KeyP => Hotkey::CyclePreset,
        KeyCode::ArrowRight => Hotkey::NextModel,
        KeyCode::ArrowLeft => Hotkey::PrevModel,
        KeyCode::Escape => Hotkey::Close,
        _ => return None,
    };
    Some(hotkey)
}

pub(super) fn handle_viewer_hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    mut gallery: ResMut<GalleryState>,
    state: Res<ViewerState>,
    library: Res<LibraryBridge>,
    mut viewer: MessageWriter<ViewerCommand>,
    mut capture: MessageWriter<CaptureThumbnail>,
) {
    if gallery.open_model.is_none() {
        return;
    }
    // Leave browser-style shortcuts alone.
    if keys.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
        KeyCode::AltLeft,
        KeyCode::AltRight,
    ]) {
        return;
    }

    for hotkey in keys.get_just_pressed().filter_map(|key| hotkey_for(*key)) {
        match hotkey {
            Hotkey::Material(mode) => {
                viewer.write(ViewerCommand::SetMaterialMode(mode));
            }
            Hotkey::Reframe => {
                viewer.write(ViewerCommand::Reframe);
            }
            Hotkey::Orthographic => {
                viewer.write(ViewerCommand::ToggleOrthographic);
                viewer.write(ViewerCommand::Reframe);
            }
            Hotkey::StudioWhite => {
                viewer.write(ViewerCommand::StudioWhite);
            }
            Hotkey::SaveThumbnail => {
                gallery::save_open_view(&gallery, &state.session, &library);
                if let Some(model) = &gallery.open_model {
                    capture.write(CaptureThumbnail {
                        model_id: model.id.to_string(),
                    });
                }
            }
            Hotkey::Randomize => {
                viewer.write(ViewerCommand::Randomize);
            }
            Hotkey::CyclePreset => {
                viewer.write(ViewerCommand::CyclePreset);
            }
            Hotkey::NextModel | Hotkey::PrevModel => {
                let forward = hotkey == Hotkey::NextModel;
                if let Some(model) = gallery.neighbor(forward) {
                    gallery::open_model(&mut gallery, &mut viewer, model);
                }
            }
            Hotkey::Close => {
                gallery.open_model = None;
                viewer.write(ViewerCommand::CloseModel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_select_material_modes() {
        assert_eq!(
            hotkey_for(KeyCode::Digit1),
            Some(Hotkey::Material(MaterialMode::White))
        );
        assert_eq!(
            hotkey_for(KeyCode::Digit3),
            Some(Hotkey::Material(MaterialMode::Normal))
        );
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        assert_eq!(hotkey_for(KeyCode::KeyZ), None);
        assert_eq!(hotkey_for(KeyCode::Space), None);
    }
}
