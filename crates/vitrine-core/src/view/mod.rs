//! Viewer presentation state: environment, camera pose, and the persisted snapshot.

pub mod camera;
pub mod environment;
pub mod settings;
