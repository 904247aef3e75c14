//! Bevy resources for the gallery viewer.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use vitrine_core::{ViewSettings, ViewerSession};
use vitrine_core::grid::pan::GridPanState;
use vitrine_core::grid::viewport::{CellCache, GridCell, ViewportQuery};
use vitrine_core::view::camera::Bounds;

/// Default grid cell edge in logical pixels.
pub const DEFAULT_GRID_SIZE: f32 = 240.0;

/// The open model and everything the viewer shows for it.
///
/// This is the single source of truth for viewer state within the ECS.
/// Systems mutate `session` only through its transition methods.
#[derive(Resource, Default)]
pub struct ViewerState {
    pub session: ViewerSession,
    /// Asset path of the loaded `.glb`.
    pub model_url: Option<String>,
    /// The view persisted for the open model, restored by "reset view".
    pub stored_view: Option<ViewSettings>,
    /// World bounds of the loaded model, once its meshes are measured.
    pub bounds: Option<Bounds>,
    /// The model scene must be (re)spawned from `model_url`.
    pub(crate) scene_pending: bool,
    /// Set on load; cleared when the meshes have been measured.
    pub(crate) bounds_pending: bool,
    /// The session camera changed outside of orbiting and must be pushed to the camera entity.
    pub(crate) camera_dirty: bool,
    /// Material mode or override changed.
    pub(crate) materials_dirty: bool,
}

impl ViewerState {
    pub fn model_center(&self) -> Vec3 {
        self.bounds.map_or(Vec3::ZERO, |b| b.center())
    }
}

/// Random source for light randomization.
#[derive(Resource)]
pub struct ViewerRng(pub StdRng);

impl Default for ViewerRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Pan state and visible-cell cache of the gallery grid.
#[derive(Resource)]
pub struct GridView {
    pub pan: GridPanState,
    pub viewport: Vec2,
    pub grid_size: f32,
    /// Sum of drag movements since the drag started.
    pub(crate) drag_total: Vec2,
    cache: CellCache,
}

impl GridView {
    pub fn new(grid_size: f32) -> Self {
        Self {
            pan: GridPanState::default(),
            viewport: Vec2::ZERO,
            grid_size,
            drag_total: Vec2::ZERO,
            cache: CellCache::default(),
        }
    }

    pub fn query(&self) -> ViewportQuery {
        ViewportQuery::new(self.pan.offset, self.viewport, self.grid_size)
    }

    /// Whether the cached cells are stale for the current pan and viewport.
    pub fn is_stale(&self) -> bool {
        !self.cache.is_current(&self.query())
    }

    pub fn visible_cells(&mut self) -> &[GridCell] {
        let query = self.query();
        self.cache.cells(query)
    }
}

impl Default for GridView {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

/// Shared preview materials, created on first use.
#[derive(Resource, Default)]
pub struct PreviewMaterials {
    pub(crate) clay: Option<Handle<StandardMaterial>>,
    pub(crate) normal: Option<Handle<StandardMaterial>>,
    pub(crate) physical: Option<Handle<StandardMaterial>>,
}
