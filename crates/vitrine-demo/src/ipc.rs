//! IPC message contracts between the Bevy backend and the web UI.
//!
//! Both enums use `#[serde(tag = "type", content = "data")]`, so every
//! message on the wire is `{ "type": "...", "data": ... }`.

use serde::{Deserialize, Serialize};
use vitrine_catalog::entity::FolderSummary;
use vitrine_catalog::filter::GalleryFilter;
use vitrine_catalog::gallery::PublicPage;
use vitrine_catalog::{Folder, FolderId, Model, ModelId, NewFolder};
use vitrine_core::grid::viewport::GridCell;
use vitrine_core::view::camera::CameraPose;
use vitrine_core::view::environment::Environment;
use vitrine_core::{Light, LightId, LightPatch, MaterialMode, ViewerSession};

/// What the viewer panel displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub model_id: Option<String>,
    pub lights: Vec<Light>,
    pub selected_light: Option<LightId>,
    pub can_add_light: bool,
    pub can_remove_light: bool,
    pub environment: Environment,
    pub camera: CameraPose,
}

impl ViewSnapshot {
    pub fn of(session: &ViewerSession) -> Self {
        let rig = session.rig();
        Self {
            model_id: session.model_id().map(str::to_string),
            lights: rig.lights().to_vec(),
            selected_light: rig.selected(),
            can_add_light: rig.can_add(),
            can_remove_light: rig.can_remove(),
            environment: session.environment().clone(),
            camera: session.camera(),
        }
    }
}

/// Messages from the Bevy backend to the web UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ViewerToUi {
    /// Initial state sync when the UI connects.
    Initialize {
        view: ViewSnapshot,
        presets: Vec<String>,
    },

    /// Viewer state changed.
    ViewUpdated { view: ViewSnapshot },

    /// Folder listing after navigation, filtering or a mutation.
    GalleryContents {
        folder: Option<FolderId>,
        /// Root first, ending at `folder`.
        breadcrumbs: Vec<Folder>,
        folders: Vec<Folder>,
        /// Models passing the active filter, in grid order.
        models: Vec<Model>,
    },

    /// Selected gallery item ids.
    Selection { ids: Vec<String> },

    PublicPage { page: PublicPage },

    FolderList { folders: Vec<FolderSummary> },

    /// A single model record changed (rename, thumbnail, view).
    ModelUpdated { model: Model },

    /// Outcome of a bulk action, e.g. "3 succeeded, 2 failed".
    BulkResult {
        summary: String,
        succeeded: usize,
        failed: usize,
    },

    UploadResult {
        uploaded: usize,
        skipped: Vec<String>,
        failed: Vec<String>,
    },

    /// Grid cells to render after a pan or resize.
    VisibleCells { pan: [f32; 2], cells: Vec<GridCell> },

    /// Something the user should be told about.
    Notice { message: String },

    /// An error occurred in the backend.
    Error { message: String },
}

/// Messages from the web UI to the Bevy backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToViewer {
    /// Request a fresh snapshot of backend state after the UI connects.
    RequestState,

    // ── Gallery ─────────────────────────────────────────────────────
    OpenFolder { folder: Option<FolderId> },
    SetFilter { filter: GalleryFilter },
    ClickItem {
        id: String,
        shift: bool,
        /// Ctrl or Cmd held.
        toggle: bool,
    },
    ClearSelection,
    RequestPublicPage { page: u32 },
    ListAllFolders,
    CreateFolder { folder: NewFolder },
    RenameFolder { id: FolderId, name: String },
    RenameModel { id: ModelId, name: String },
    DeleteSelected,
    MoveSelected { target: Option<FolderId> },
    SetSelectedPublic { is_public: bool },
    /// Open a file dialog and upload the chosen `.glb` files into the open folder.
    UploadModels,
    UploadThumbnail {
        id: ModelId,
        file_name: String,
        /// Base64-encoded image bytes.
        data: String,
    },
    ResetThumbnail { id: ModelId },

    // ── Viewer ──────────────────────────────────────────────────────
    OpenModel { id: ModelId },
    CloseModel,
    NextModel,
    PrevModel,
    SaveView,
    DeleteView,
    ResetView,
    AddLight,
    RemoveLight { id: LightId },
    CloneLight { id: LightId },
    ToggleLight { id: LightId },
    SelectLight { id: Option<LightId> },
    UpdateLight { id: LightId, patch: LightPatch },
    FocusLight,
    RandomizeLights,
    ApplyPreset { name: String },
    CyclePreset,
    SetEnvironment { environment: Environment },
    SetMaterialMode { mode: MaterialMode },
    StudioWhite,
    ToggleOrthographic,
    Reframe,
    /// Render the open model to a new thumbnail.
    CaptureThumbnail,
    /// A floating panel is being dragged; orbit must pause.
    PanelDrag { active: bool },

    // ── Grid ────────────────────────────────────────────────────────
    GridDragStart,
    GridDrag { dx: f32, dy: f32 },
    GridDragEnd,
    GridWheel { dx: f32, dy: f32 },
    GridResize { width: f32, height: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_wire_format() {
        let json = r#"{"type":"GridDrag","data":{"dx":4.0,"dy":-2.5}}"#;
        let msg: UiToViewer = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, UiToViewer::GridDrag { dx, dy } if dx == 4.0 && dy == -2.5));

        let unit: UiToViewer = serde_json::from_str(r#"{"type":"CyclePreset"}"#).unwrap();
        assert!(matches!(unit, UiToViewer::CyclePreset));
    }

    #[test]
    fn test_update_light_accepts_partial_patch() {
        let json = r#"{"type":"UpdateLight","data":{"id":3,"patch":{"kelvin":3200}}}"#;
        let UiToViewer::UpdateLight { id, patch } = serde_json::from_str(json).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(id, LightId(3));
        assert_eq!(patch.kelvin, Some(3200.0));
        assert!(patch.intensity.is_none());
    }

    #[test]
    fn test_snapshot_of_default_session() {
        let snapshot = ViewSnapshot::of(&ViewerSession::new());
        assert!(snapshot.model_id.is_none());
        let json = serde_json::to_value(ViewerToUi::ViewUpdated { view: snapshot }).unwrap();
        assert_eq!(json["type"], "ViewUpdated");
        assert!(json["data"]["view"]["lights"].is_array());
    }
}
