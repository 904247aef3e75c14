//! Keyboard shortcuts for the model viewer.

mod hotkeys;

use bevy::prelude::*;

/// Plugin that registers the viewer hotkeys.
pub struct HotkeyPlugin;

impl Plugin for HotkeyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, hotkeys::handle_viewer_hotkeys);
    }
}
