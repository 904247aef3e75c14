//! Bevy messages between the host application and the viewer systems.

use bevy::prelude::*;
use vitrine_core::grid::viewport::GridCell;
use vitrine_core::view::environment::Environment;
use vitrine_core::{LightId, LightPatch, MaterialMode, ViewSettings};

/// Inbound viewer commands. The host converts UI messages and hotkeys into these.
#[derive(Message, Debug, Clone)]
pub enum ViewerCommand {
    /// Open a model in the viewer.
    LoadModel {
        model_id: String,
        /// Asset path or URL of the `.glb`.
        model_url: String,
        thumbnail_url: String,
        /// Decoded stored view, if the model has one.
        view_settings: Option<ViewSettings>,
    },
    CloseModel,

    AddLight,
    RemoveLight(LightId),
    CloneLight(LightId),
    ToggleLight(LightId),
    SelectLight(Option<LightId>),
    UpdateLight {
        id: LightId,
        patch: LightPatch,
    },
    /// Aim the selected light at the center of the model.
    FocusSelected,
    /// Randomize the selected light, or every light when none is selected.
    Randomize,
    ApplyPreset(String),
    CyclePreset,

    SetEnvironment(Environment),
    SetMaterialMode(MaterialMode),
    StudioWhite,
    ToggleOrthographic,
    /// Frame the model again, ignoring any saved camera.
    Reframe,

    /// Restore the stored view (or defaults when none is stored).
    ResetView,
    /// The host persisted this view for the open model.
    ViewSaved(ViewSettings),
    /// The stored view was deleted; fall back to defaults.
    DeleteView,

    /// A UI panel started (`true`) or stopped (`false`) being dragged.
    PanelDrag(bool),
}

/// Fired whenever viewer state the UI displays has changed.
#[derive(Message, Debug, Clone, Copy)]
pub struct ViewChanged;

/// A refused or noteworthy viewer operation the user should hear about.
#[derive(Message, Debug, Clone)]
pub struct ViewerNotice {
    pub message: String,
}

/// Time to capture a thumbnail for this model.
#[derive(Message, Debug, Clone)]
pub struct CaptureThumbnail {
    pub model_id: String,
}

/// Pointer and layout input for the gallery grid.
#[derive(Message, Debug, Clone, Copy)]
pub enum GridInput {
    DragStart,
    /// Pointer movement since the previous drag event, in pixels.
    Drag(Vec2),
    DragEnd,
    Wheel(Vec2),
    Resize(Vec2),
}

/// The set of grid cells to render changed.
#[derive(Message, Debug, Clone)]
pub struct VisibleCellsChanged {
    pub pan: Vec2,
    pub cells: Vec<GridCell>,
}
