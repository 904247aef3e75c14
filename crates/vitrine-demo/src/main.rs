//! Vitrine Demo: a 3D model gallery with a studio-lit viewer.
//!
//! Runs the Bevy viewer with `VitrinePlugin`, a model library on a
//! background tokio runtime, and a WebSocket IPC bridge for the web UI.

mod config;
mod gallery;
mod input;
mod ipc;
mod library;
mod thumbnail;
mod ws_bridge;

use bevy::prelude::*;
use vitrine_bevy::VitrinePlugin;
use vitrine_bevy::systems::{handle_viewer_commands, update_grid_view};

use config::AppConfig;
use gallery::GalleryState;
use library::FsObjectStore;
use ws_bridge::OutboundUiMessages;

fn main() {
    let config = AppConfig::default();
    let store = FsObjectStore::new(config.library_path(), config.library_dir.clone());

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Vitrine".to_string(),
                        resolution: (config.width, config.height).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: config.assets_dir.to_string_lossy().into_owned(),
                    ..default()
                }),
        )
        .add_plugins(VitrinePlugin {
            grid_size: config.grid_size,
        })
        .add_plugins(input::HotkeyPlugin)
        .insert_resource(ws_bridge::spawn_ws_server(config.ws_port))
        .insert_resource(library::spawn_library_worker(store))
        .insert_resource(config)
        .init_resource::<OutboundUiMessages>()
        .init_resource::<GalleryState>()
        .add_systems(
            Update,
            (
                ws_bridge::poll_inbound_messages
                    .before(handle_viewer_commands)
                    .before(update_grid_view),
                gallery::poll_library_events.before(handle_viewer_commands),
                thumbnail::capture_thumbnails,
                ws_bridge::push_view_updates.after(handle_viewer_commands),
                ws_bridge::forward_viewer_messages.after(update_grid_view),
                ws_bridge::flush_outbound_messages
                    .after(ws_bridge::poll_inbound_messages)
                    .after(gallery::poll_library_events)
                    .after(ws_bridge::push_view_updates)
                    .after(ws_bridge::forward_viewer_messages),
            ),
        )
        .run();
}
