//! Application configuration for the demo.

use std::path::PathBuf;

use bevy::prelude::*;
use vitrine_bevy::resources::DEFAULT_GRID_SIZE;

/// Default WebSocket port for the IPC bridge.
const DEFAULT_WS_PORT: u16 = 9400;
/// Default window width.
const DEFAULT_WIDTH: u32 = 1600;
/// Default window height.
const DEFAULT_HEIGHT: u32 = 900;
/// Asset-relative directory holding uploaded models and thumbnails.
const DEFAULT_LIBRARY_DIR: &str = "library";

/// Runtime configuration for the Vitrine demo application.
#[derive(Resource, Clone, Debug)]
pub struct AppConfig {
    /// WebSocket port for Bevy <-> web UI IPC.
    pub ws_port: u16,
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Gallery grid cell edge in logical pixels.
    pub grid_size: f32,
    /// Bevy asset root.
    pub assets_dir: PathBuf,
    /// Library directory, relative to `assets_dir`.
    pub library_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_port: env_parse("VITRINE_WS_PORT").unwrap_or(DEFAULT_WS_PORT),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            grid_size: env_parse("VITRINE_GRID_SIZE")
                .filter(|s: &f32| *s > 0.0)
                .unwrap_or(DEFAULT_GRID_SIZE),
            assets_dir: std::env::var("VITRINE_ASSETS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets")),
            library_dir: std::env::var("VITRINE_LIBRARY")
                .unwrap_or_else(|_| DEFAULT_LIBRARY_DIR.to_string()),
        }
    }
}

impl AppConfig {
    /// Filesystem path of the library directory.
    pub fn library_path(&self) -> PathBuf {
        self.assets_dir.join(&self.library_dir)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
