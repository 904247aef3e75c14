//! Per-model viewer state and its transitions.
//!
//! A [`ViewerSession`] owns everything the viewer shows for the open model:
//! the light rig, the environment, the camera pose, pointer capture and the
//! pending thumbnail capture. Hosts translate input into method calls and
//! read the state back to drive rendering.

use std::time::Duration;

use glam::{Vec2, Vec3};

use crate::lighting::presets::{self, PRESETS};
use crate::lighting::rig::{CameraBasis, LightRig};
use crate::thumbnail::{self, CaptureScheduler};
use crate::view::camera::{Bounds, CameraPose};
use crate::view::environment::{Environment, MaterialMode};
use crate::view::settings::{self, ViewSettings};

/// Which interaction currently owns the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerCapture {
    /// Nothing; the orbit camera responds to drags.
    #[default]
    None,
    /// Shift-drag is swinging the selected light around its target.
    LightAim,
    /// A floating panel is being dragged.
    Panel,
}

#[derive(Debug, Clone)]
pub struct ViewerSession {
    model_id: Option<String>,
    rig: LightRig,
    environment: Environment,
    camera: CameraPose,
    /// Stored settings supplied a camera position, so auto-framing is skipped.
    camera_saved: bool,
    preset_cursor: Option<usize>,
    capture: PointerCapture,
    thumbnails: CaptureScheduler,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self {
            model_id: None,
            rig: settings::rig_for(None),
            environment: Environment::default(),
            camera: CameraPose::DEFAULT,
            camera_saved: false,
            preset_cursor: None,
            capture: PointerCapture::None,
            thumbnails: CaptureScheduler::new(),
        }
    }
}

impl ViewerSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn rig(&self) -> &LightRig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut LightRig {
        &mut self.rig
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    pub fn pointer_capture(&self) -> PointerCapture {
        self.capture
    }

    /// Orbit controls are suspended while a light or panel drag is active.
    pub fn orbit_enabled(&self) -> bool {
        self.capture == PointerCapture::None
    }

    pub fn pending_thumbnail(&self) -> Option<&str> {
        self.thumbnails.pending_model()
    }

    // ── Model lifecycle ─────────────────────────────────────────────

    /// Open a model: restore its stored view (or defaults), restore the
    /// camera, and schedule a thumbnail capture if it only has a placeholder.
    pub fn load_model(
        &mut self,
        model_id: &str,
        thumbnail_url: Option<&str>,
        stored: Option<&ViewSettings>,
        now: Duration,
    ) {
        self.model_id = Some(model_id.to_string());
        self.reset_view_settings(stored);
        self.camera = CameraPose::from_stored(
            stored.and_then(|s| s.camera_position),
            stored.and_then(|s| s.camera_target),
        );
        self.camera_saved = stored.is_some_and(|s| s.camera_position.is_some());
        self.capture = PointerCapture::None;

        if thumbnail::is_placeholder(thumbnail_url) {
            self.thumbnails.schedule(model_id, now);
        } else {
            self.thumbnails.cancel();
        }
        tracing::info!(
            "Loaded model {model_id} ({} lights, saved camera: {})",
            self.rig.len(),
            self.camera_saved
        );
    }

    pub fn close_model(&mut self) {
        self.model_id = None;
        self.capture = PointerCapture::None;
        self.thumbnails.cancel();
    }

    /// Restore lights and environment from `stored`, or defaults when `None`.
    /// The camera is untouched and the light selection is cleared.
    pub fn reset_view_settings(&mut self, stored: Option<&ViewSettings>) {
        self.rig = settings::rig_for(stored);
        self.environment = stored.map(|s| s.environment.clone()).unwrap_or_default();
        self.preset_cursor = None;
    }

    /// Snapshot for "save view".
    pub fn snapshot(&self) -> ViewSettings {
        ViewSettings::capture(
            &self.rig,
            &self.environment,
            Some(self.camera.position),
            Some(self.camera.target),
        )
    }

    /// The stored view was deleted: fall back to defaults, framing resumes.
    pub fn delete_view(&mut self) {
        self.reset_view_settings(None);
        self.camera_saved = false;
    }

    // ── Camera ──────────────────────────────────────────────────────

    /// Frame the model once its bounds are known, unless a saved camera exists.
    pub fn frame_model(&mut self, bounds: &Bounds) -> bool {
        if self.camera_saved {
            return false;
        }
        self.camera = CameraPose::framing(bounds);
        true
    }

    /// Frame the model regardless of any saved camera.
    pub fn reframe(&mut self, bounds: &Bounds) {
        self.camera = CameraPose::framing(bounds);
    }

    /// Record where the orbit controls moved the camera.
    pub fn set_camera(&mut self, pose: CameraPose) {
        self.camera = pose;
    }

    pub fn toggle_orthographic(&mut self) -> bool {
        self.environment.orthographic = !self.environment.orthographic;
        self.environment.orthographic
    }

    pub fn set_material_mode(&mut self, mode: MaterialMode) {
        self.environment.material_mode = mode;
    }

    pub fn studio_white(&mut self) {
        self.environment.studio_white();
    }

    // ── Presets ─────────────────────────────────────────────────────

    /// Apply the next built-in preset, wrapping. Returns its name.
    pub fn cycle_preset(&mut self) -> &'static str {
        let index = presets::next_preset_index(self.preset_cursor);
        let preset = &PRESETS[index];
        self.rig.apply_preset(preset.lights);
        self.preset_cursor = Some(index);
        preset.name
    }

    pub fn apply_preset_named(&mut self, name: &str) -> bool {
        let Some(index) = PRESETS.iter().position(|p| p.name.eq_ignore_ascii_case(name)) else {
            tracing::warn!("unknown lighting preset {name:?}");
            return false;
        };
        self.preset_cursor = Some(index);
        self.rig.apply_preset(PRESETS[index].lights)
    }

    // ── Pointer capture ─────────────────────────────────────────────

    /// Start re-aiming the selected light. Refused without a selection or
    /// while another drag owns the pointer.
    pub fn begin_light_drag(&mut self) -> bool {
        if self.capture != PointerCapture::None || self.rig.selected().is_none() {
            return false;
        }
        self.capture = PointerCapture::LightAim;
        true
    }

    /// Feed a pointer movement to the active light drag.
    pub fn drag_light(&mut self, movement: Vec2, basis: CameraBasis) -> bool {
        if self.capture != PointerCapture::LightAim {
            return false;
        }
        match self.rig.selected() {
            Some(id) => self.rig.reaim(id, movement, basis),
            None => false,
        }
    }

    pub fn begin_panel_drag(&mut self) -> bool {
        if self.capture != PointerCapture::None {
            return false;
        }
        self.capture = PointerCapture::Panel;
        true
    }

    /// Release whatever drag is active; orbit resumes.
    pub fn end_drag(&mut self) {
        self.capture = PointerCapture::None;
    }

    /// Aim the selected light at the model's bounds center.
    pub fn focus_selected(&mut self, bounds_center: Vec3) -> bool {
        match self.rig.selected() {
            Some(id) => self.rig.focus_on_bounds(id, bounds_center),
            None => false,
        }
    }

    // ── Thumbnails ──────────────────────────────────────────────────

    /// Model id whose thumbnail should be captured now, if its delay elapsed.
    pub fn poll_thumbnail_capture(&mut self, now: Duration) -> Option<String> {
        let due = self.thumbnails.poll(now)?;
        // Stale if the user closed or switched models without a reload.
        (self.model_id.as_deref() == Some(due.as_str())).then_some(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::light::{LightParams, LightPatch};
    use crate::view::environment::BgType;

    const PLACEHOLDER: &str = "/placeholder.svg?width=400&height=400&query=vase";
    const REAL_THUMB: &str = "https://cdn.example/thumbnails/m1.png";

    fn stored_with_camera() -> ViewSettings {
        ViewSettings {
            lights: vec![LightParams::DEFAULT, LightParams::DEFAULT],
            camera_position: Some(Vec3::new(1.0, 2.0, 3.0)),
            camera_target: Some(Vec3::Y),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_without_settings_uses_defaults() {
        let mut s = ViewerSession::new();
        s.load_model("m1", Some(REAL_THUMB), None, Duration::ZERO);
        assert_eq!(s.rig().params(), presets::default_preset().lights);
        assert_eq!(s.camera(), CameraPose::DEFAULT);
        assert_eq!(s.environment(), &Environment::default());
        assert_eq!(s.pending_thumbnail(), None);
    }

    #[test]
    fn test_load_restores_saved_camera_and_skips_framing() {
        let mut s = ViewerSession::new();
        s.load_model("m1", Some(REAL_THUMB), Some(&stored_with_camera()), Duration::ZERO);
        assert_eq!(s.rig().len(), 2);
        assert_eq!(s.camera().position, Vec3::new(1.0, 2.0, 3.0));

        let bounds = Bounds::new(Vec3::ZERO, Vec3::ONE);
        assert!(!s.frame_model(&bounds));
        s.reframe(&bounds);
        assert_eq!(s.camera().target, Vec3::splat(0.5));
    }

    #[test]
    fn test_frame_model_without_saved_camera() {
        let mut s = ViewerSession::new();
        s.load_model("m1", None, None, Duration::ZERO);
        assert!(s.frame_model(&Bounds::new(Vec3::ZERO, Vec3::splat(2.0))));
        assert_eq!(s.camera().position, Vec3::splat(3.0));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut s = ViewerSession::new();
        s.load_model("m1", None, None, Duration::ZERO);
        s.environment_mut().bg_type = BgType::Gradient;
        s.set_camera(CameraPose {
            position: Vec3::new(4.0, 1.0, 0.0),
            target: Vec3::ZERO,
        });
        let saved = s.snapshot();

        let mut other = ViewerSession::new();
        other.load_model("m1", Some(REAL_THUMB), Some(&saved), Duration::ZERO);
        assert_eq!(other.rig().params(), s.rig().params());
        assert_eq!(other.environment(), s.environment());
        assert_eq!(other.camera(), s.camera());
    }

    #[test]
    fn test_reset_clears_light_selection() {
        let mut s = ViewerSession::new();
        let id = s.rig().lights()[0].id;
        s.rig_mut().select(Some(id));
        s.rig_mut().update(
            id,
            &LightPatch {
                intensity: Some(99.0),
                ..Default::default()
            },
        );
        s.reset_view_settings(None);
        assert_eq!(s.rig().selected(), None);
        assert_eq!(s.rig().params(), presets::default_preset().lights);
    }

    #[test]
    fn test_delete_view_resumes_framing() {
        let mut s = ViewerSession::new();
        s.load_model("m1", None, Some(&stored_with_camera()), Duration::ZERO);
        s.delete_view();
        assert!(s.frame_model(&Bounds::new(Vec3::ZERO, Vec3::ONE)));
        assert_eq!(s.rig().len(), presets::default_preset().lights.len());
    }

    #[test]
    fn test_light_drag_suspends_orbit() {
        let mut s = ViewerSession::new();
        assert!(!s.begin_light_drag(), "needs a selected light");

        let id = s.rig().lights()[0].id;
        s.rig_mut().select(Some(id));
        let before = s.rig().get(id).unwrap().params.position;

        assert!(s.begin_light_drag());
        assert!(!s.orbit_enabled());
        assert!(!s.begin_panel_drag());
        assert!(s.drag_light(Vec2::new(40.0, 0.0), CameraBasis::default()));
        assert_ne!(s.rig().get(id).unwrap().params.position, before);

        s.end_drag();
        assert!(s.orbit_enabled());
        assert!(!s.drag_light(Vec2::new(40.0, 0.0), CameraBasis::default()));
    }

    #[test]
    fn test_panel_drag_suspends_orbit() {
        let mut s = ViewerSession::new();
        assert!(s.begin_panel_drag());
        assert_eq!(s.pointer_capture(), PointerCapture::Panel);
        assert!(!s.orbit_enabled());
        s.end_drag();
        assert!(s.orbit_enabled());
    }

    #[test]
    fn test_cycle_preset_wraps() {
        let mut s = ViewerSession::new();
        let names: Vec<_> = (0..PRESETS.len() + 1).map(|_| s.cycle_preset()).collect();
        assert_eq!(names[0], "3-Point");
        assert_eq!(names[PRESETS.len()], "3-Point");
        assert_eq!(s.rig().selected(), None);
    }

    #[test]
    fn test_apply_preset_named() {
        let mut s = ViewerSession::new();
        assert!(s.apply_preset_named("moody"));
        assert_eq!(s.rig().len(), 2);
        assert!(!s.apply_preset_named("disco"));
        assert_eq!(s.rig().len(), 2);
        // Cycling continues after the applied preset.
        assert_eq!(s.cycle_preset(), "3-Point");
    }

    #[test]
    fn test_placeholder_thumbnail_capture() {
        let mut s = ViewerSession::new();
        s.load_model("m1", Some(PLACEHOLDER), None, Duration::from_secs(10));
        assert_eq!(s.poll_thumbnail_capture(Duration::from_secs(11)), None);
        assert_eq!(
            s.poll_thumbnail_capture(Duration::from_millis(11_200)).as_deref(),
            Some("m1")
        );
    }

    #[test]
    fn test_switching_models_cancels_capture() {
        let mut s = ViewerSession::new();
        s.load_model("m1", Some(PLACEHOLDER), None, Duration::ZERO);
        s.load_model("m2", Some(REAL_THUMB), None, Duration::from_millis(500));
        assert_eq!(s.poll_thumbnail_capture(Duration::from_secs(5)), None);

        s.load_model("m3", Some(PLACEHOLDER), None, Duration::ZERO);
        s.close_model();
        assert_eq!(s.poll_thumbnail_capture(Duration::from_secs(5)), None);
    }

    #[test]
    fn test_hotkey_helpers() {
        let mut s = ViewerSession::new();
        assert!(s.toggle_orthographic());
        s.set_material_mode(MaterialMode::Normal);
        s.studio_white();
        assert_eq!(s.environment().material_mode, MaterialMode::Normal);
        assert!(s.environment().environment_enabled);
        assert_eq!(s.environment().bg_color1, "#ffffff");
    }
}
