//! Vitrine Core: domain layer for the 3D model gallery viewer.
//!
//! This crate contains the grid virtualization math, the spot-light rig,
//! color temperature conversion, the persisted view-settings contract and
//! the per-model viewer session. No rendering or framework dependencies.

pub mod grid;
pub mod lighting;
pub mod selection;
pub mod session;
pub mod thumbnail;
pub mod view;

// Re-exports for convenience.
pub use grid::index::{index_of, position_of};
pub use grid::viewport::{GridCell, GridPosition, ViewportQuery, visible_cells};
pub use lighting::kelvin::kelvin_to_rgb;
pub use lighting::light::{Light, LightId, LightParams, LightPatch};
pub use lighting::rig::{CameraBasis, LightRig};
pub use session::ViewerSession;
pub use view::settings::{BgType, MaterialMode, ViewSettings};
