//! Bounded collection of spot lights with a single selection.
//!
//! The rig holds between [`MIN_LIGHTS`] and [`MAX_LIGHTS`] lights once
//! populated. Operations that would break the bound are silent no-ops;
//! each returns whether it changed anything so the host can show a notice.

use glam::{Quat, Vec2, Vec3};
use rand::Rng;

use super::light::{Light, LightId, LightParams, LightPatch};
use super::presets::LightingPreset;

/// Upper bound on lights in one rig.
pub const MAX_LIGHTS: usize = 5;
/// The last light cannot be removed.
pub const MIN_LIGHTS: usize = 1;

/// Radians of light orbit per pixel of pointer drag.
pub const REAIM_RADIANS_PER_PIXEL: f32 = 0.005;

/// Offset applied to a cloned light's position along world X.
const CLONE_OFFSET: Vec3 = Vec3::X;

/// Camera orientation axes used to turn screen drags into world rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    /// Camera-space +Y in world space. Unit length.
    pub up: Vec3,
    /// Camera-space +X in world space. Unit length.
    pub right: Vec3,
}

impl CameraBasis {
    /// Basis of a camera with world rotation `rotation`.
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            up: (rotation * Vec3::Y).normalize(),
            right: (rotation * Vec3::X).normalize(),
        }
    }
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self::from_rotation(Quat::IDENTITY)
    }
}

/// Ranges used by [`LightRig::randomize`].
pub mod random_ranges {
    use std::ops::RangeInclusive;

    pub const INTENSITY: RangeInclusive<f32> = 5.0..=25.0;
    pub const KELVIN: RangeInclusive<f32> = 2500.0..=10000.0;
    pub const ANGLE: RangeInclusive<f32> = 20.0..=60.0;
    pub const PENUMBRA: RangeInclusive<f32> = 0.0..=0.8;
}

/// Ordered spot lights plus the currently selected one.
#[derive(Debug, Clone, Default)]
pub struct LightRig {
    lights: Vec<Light>,
    selected: Option<LightId>,
    next_id: u64,
}

impl LightRig {
    /// Rig materialized from a parameter list: fresh ids, all visible, no selection.
    ///
    /// Lists longer than [`MAX_LIGHTS`] are truncated.
    pub fn from_params<'a>(params: impl IntoIterator<Item = &'a LightParams>) -> Self {
        let mut rig = Self::default();
        rig.replace_all(params);
        rig
    }

    /// Rig materialized from a named preset.
    pub fn from_preset(preset: &LightingPreset) -> Self {
        Self::from_params(preset.lights)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, id: LightId) -> Option<&Light> {
        self.lights.iter().find(|l| l.id == id)
    }

    fn get_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.id == id)
    }

    pub fn selected(&self) -> Option<LightId> {
        self.selected
    }

    pub fn selected_light(&self) -> Option<&Light> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Select a member light, or clear the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: Option<LightId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                let changed = self.selected != id;
                self.selected = id;
                changed
            }
        }
    }

    /// Whether another light can be added or cloned.
    pub fn can_add(&self) -> bool {
        self.lights.len() < MAX_LIGHTS
    }

    /// Whether a light can be removed without emptying the rig.
    pub fn can_remove(&self) -> bool {
        self.lights.len() > MIN_LIGHTS
    }

    fn allocate_id(&mut self) -> LightId {
        let id = LightId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Parameters of every light, in order, without ids or visibility.
    pub fn params(&self) -> Vec<LightParams> {
        self.lights.iter().map(|l| l.params.clone()).collect()
    }

    /// Insert a default light and select it. No-op at capacity.
    pub fn add(&mut self) -> Option<LightId> {
        if !self.can_add() {
            tracing::debug!("add light refused: rig is full ({MAX_LIGHTS})");
            return None;
        }
        let id = self.allocate_id();
        self.lights.push(Light::new(id, LightParams::DEFAULT));
        self.selected = Some(id);
        Some(id)
    }

    /// Remove a light. The last remaining light is protected.
    ///
    /// If the removed light was selected, another light becomes selected.
    pub fn remove(&mut self, id: LightId) -> bool {
        if !self.can_remove() {
            tracing::debug!("remove {id} refused: last light is protected");
            return false;
        }
        let Some(pos) = self.lights.iter().position(|l| l.id == id) else {
            return false;
        };
        self.lights.remove(pos);
        if self.selected == Some(id) {
            self.selected = self.lights.first().map(|l| l.id);
        }
        true
    }

    /// Duplicate a light one unit along +X and select the copy.
    pub fn clone_light(&mut self, id: LightId) -> Option<LightId> {
        if !self.can_add() {
            tracing::debug!("clone {id} refused: rig is full ({MAX_LIGHTS})");
            return None;
        }
        let source = self.get(id)?.clone();
        let new_id = self.allocate_id();
        let mut copy = source;
        copy.id = new_id;
        copy.params.position += CLONE_OFFSET;
        self.lights.push(copy);
        self.selected = Some(new_id);
        Some(new_id)
    }

    pub fn toggle_visibility(&mut self, id: LightId) -> bool {
        match self.get_mut(id) {
            Some(light) => {
                light.visible = !light.visible;
                true
            }
            None => false,
        }
    }

    /// Merge a partial attribute set into a light.
    pub fn update(&mut self, id: LightId, patch: &LightPatch) -> bool {
        self.get_mut(id).is_some_and(|light| patch.apply(light))
    }

    /// Replace every light with fresh ones built from `params`, clearing the selection.
    ///
    /// An empty list is refused so the rig never becomes empty.
    pub fn apply_preset<'a>(&mut self, params: impl IntoIterator<Item = &'a LightParams>) -> bool {
        let mut iter = params.into_iter().peekable();
        if iter.peek().is_none() {
            tracing::warn!("refusing to apply an empty light preset");
            return false;
        }
        self.replace_all(iter);
        true
    }

    fn replace_all<'a>(&mut self, params: impl IntoIterator<Item = &'a LightParams>) {
        let mut lights = Vec::with_capacity(MAX_LIGHTS);
        for (i, p) in params.into_iter().enumerate() {
            if i == MAX_LIGHTS {
                tracing::warn!("light list exceeds {MAX_LIGHTS} entries, extra lights dropped");
                break;
            }
            let id = self.allocate_id();
            lights.push(Light::new(id, p.clone()));
        }
        self.lights = lights;
        self.selected = None;
    }

    /// Randomize intensity, temperature, cone angle and penumbra.
    ///
    /// Only the selected light changes when one is selected, otherwise every light.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        let selected = self.selected;
        for light in &mut self.lights {
            if selected.is_some_and(|id| id != light.id) {
                continue;
            }
            let p = &mut light.params;
            p.intensity = rng.gen_range(random_ranges::INTENSITY);
            p.kelvin = rng.gen_range(random_ranges::KELVIN);
            p.angle = rng.gen_range(random_ranges::ANGLE);
            p.penumbra = rng.gen_range(random_ranges::PENUMBRA);
        }
    }

    /// Swing a light around its aim point in response to a pointer drag.
    ///
    /// The offset from target to position is rotated about the camera's up
    /// axis by `−dx · 0.005` rad, then about the camera's right axis by
    /// `−dy · 0.005` rad. The target stays fixed.
    pub fn reaim(&mut self, id: LightId, drag_delta: Vec2, basis: CameraBasis) -> bool {
        let Some(light) = self.get_mut(id) else {
            return false;
        };
        let target = light.params.target_position;
        let yaw = Quat::from_axis_angle(basis.up, -drag_delta.x * REAIM_RADIANS_PER_PIXEL);
        let pitch = Quat::from_axis_angle(basis.right, -drag_delta.y * REAIM_RADIANS_PER_PIXEL);
        let offset = pitch * (yaw * (light.params.position - target));
        light.params.position = target + offset;
        true
    }

    /// Point a light at `point`, leaving its position unchanged.
    pub fn set_target(&mut self, id: LightId, point: Vec3) -> bool {
        self.update(
            id,
            &LightPatch {
                target_position: Some(point),
                ..Default::default()
            },
        )
    }

    /// Aim a light at the center of a model's bounding box.
    pub fn focus_on_bounds(&mut self, id: LightId, bounds_center: Vec3) -> bool {
        self.set_target(id, bounds_center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::presets;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPSILON: f32 = 1e-5;

    fn rig_with(n: usize) -> LightRig {
        let mut rig = LightRig::from_params([&LightParams::DEFAULT]);
        while rig.len() < n {
            rig.add();
        }
        rig
    }

    fn ids(rig: &LightRig) -> Vec<LightId> {
        rig.lights().iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_add_selects_default_light() {
        let mut rig = rig_with(1);
        let id = rig.add().expect("room for a second light");
        assert_eq!(rig.len(), 2);
        assert_eq!(rig.selected(), Some(id));
        let light = rig.get(id).unwrap();
        assert_eq!(light.params, LightParams::DEFAULT);
        assert!(light.visible);
    }

    #[test]
    fn test_add_refused_at_capacity() {
        let mut rig = rig_with(MAX_LIGHTS);
        let before = ids(&rig);
        assert!(rig.add().is_none());
        assert_eq!(ids(&rig), before);
    }

    #[test]
    fn test_clone_refused_at_capacity() {
        let mut rig = rig_with(MAX_LIGHTS);
        let first = rig.lights()[0].id;
        assert!(rig.clone_light(first).is_none());
        assert_eq!(rig.len(), MAX_LIGHTS);
    }

    #[test]
    fn test_last_light_is_protected() {
        let mut rig = rig_with(1);
        let only = rig.lights()[0].id;
        assert!(!rig.remove(only));
        assert_eq!(rig.len(), 1);
    }

    #[test]
    fn test_remove_selected_reassigns_selection() {
        let mut rig = rig_with(3);
        let last = *ids(&rig).last().unwrap();
        assert_eq!(rig.selected(), Some(last));
        assert!(rig.remove(last));
        let selected = rig.selected().expect("selection moves to a remaining light");
        assert!(rig.get(selected).is_some());
    }

    #[test]
    fn test_remove_unselected_keeps_selection() {
        let mut rig = rig_with(3);
        let first = rig.lights()[0].id;
        let selected = rig.selected();
        assert!(rig.remove(first));
        assert_eq!(rig.selected(), selected);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut rig = rig_with(2);
        assert!(!rig.remove(LightId(999)));
        assert_eq!(rig.len(), 2);
    }

    #[test]
    fn test_clone_offsets_x_and_keeps_fields() {
        let mut rig = rig_with(1);
        let original = rig.lights()[0].clone();
        let copy_id = rig.clone_light(original.id).unwrap();
        let copy = rig.get(copy_id).unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(rig.selected(), Some(copy_id));
        assert!((copy.params.position.x - (original.params.position.x + 1.0)).abs() < EPSILON);
        assert_eq!(copy.params.position.y, original.params.position.y);
        assert_eq!(copy.params.position.z, original.params.position.z);

        let mut expected = original.params.clone();
        expected.position = copy.params.position;
        assert_eq!(copy.params, expected);
        assert_eq!(copy.visible, original.visible);
    }

    #[test]
    fn test_clone_unknown_id_is_noop() {
        let mut rig = rig_with(2);
        assert!(rig.clone_light(LightId(42)).is_none());
        assert_eq!(rig.len(), 2);
    }

    #[test]
    fn test_toggle_visibility() {
        let mut rig = rig_with(1);
        let id = rig.lights()[0].id;
        assert!(rig.toggle_visibility(id));
        assert!(!rig.get(id).unwrap().visible);
        assert!(rig.toggle_visibility(id));
        assert!(rig.get(id).unwrap().visible);
        assert!(!rig.toggle_visibility(LightId(77)));
    }

    #[test]
    fn test_update_merges_partial() {
        let mut rig = rig_with(1);
        let id = rig.lights()[0].id;
        let patch = LightPatch {
            kelvin: Some(3200.0),
            intensity: Some(9.0),
            ..Default::default()
        };
        assert!(rig.update(id, &patch));
        let light = rig.get(id).unwrap();
        assert_eq!(light.id, id);
        assert_eq!(light.params.kelvin, 3200.0);
        assert_eq!(light.params.intensity, 9.0);
        assert_eq!(light.params.angle, LightParams::DEFAULT.angle);
        assert!(!rig.update(LightId(1234), &patch));
    }

    #[test]
    fn test_apply_preset_replaces_and_clears_selection() {
        let mut rig = rig_with(4);
        let old_ids = ids(&rig);
        let preset = presets::preset_by_name("Moody").unwrap();
        assert!(rig.apply_preset(preset.lights));

        assert_eq!(rig.len(), preset.lights.len());
        assert_eq!(rig.selected(), None);
        for (light, params) in rig.lights().iter().zip(preset.lights) {
            assert!(light.visible);
            assert_eq!(&light.params, params);
            assert!(!old_ids.contains(&light.id), "ids must be regenerated");
        }
    }

    #[test]
    fn test_apply_empty_preset_refused() {
        let mut rig = rig_with(2);
        assert!(!rig.apply_preset(std::iter::empty::<&LightParams>()));
        assert_eq!(rig.len(), 2);
    }

    #[test]
    fn test_oversized_list_truncated() {
        let params = vec![LightParams::DEFAULT; MAX_LIGHTS + 2];
        let rig = LightRig::from_params(&params);
        assert_eq!(rig.len(), MAX_LIGHTS);
    }

    #[test]
    fn test_randomize_all_when_nothing_selected() {
        let mut rig = LightRig::from_preset(presets::default_preset());
        let mut rng = StdRng::seed_from_u64(7);
        rig.randomize(&mut rng);
        for light in rig.lights() {
            let p = &light.params;
            assert!(random_ranges::INTENSITY.contains(&p.intensity));
            assert!(random_ranges::KELVIN.contains(&p.kelvin));
            assert!(random_ranges::ANGLE.contains(&p.angle));
            assert!(random_ranges::PENUMBRA.contains(&p.penumbra));
        }
    }

    #[test]
    fn test_randomize_only_selected() {
        let mut rig = LightRig::from_preset(presets::default_preset());
        let untouched = rig.lights()[0].clone();
        let target = rig.lights()[1].id;
        rig.select(Some(target));

        let mut rng = StdRng::seed_from_u64(11);
        rig.randomize(&mut rng);

        assert_eq!(rig.lights()[0], untouched);
        let p = &rig.get(target).unwrap().params;
        assert!(random_ranges::INTENSITY.contains(&p.intensity));
        assert!(random_ranges::PENUMBRA.contains(&p.penumbra));
    }

    #[test]
    fn test_reaim_orbits_around_target() {
        let mut rig = rig_with(1);
        let id = rig.lights()[0].id;
        rig.set_target(id, Vec3::new(0.0, 1.0, 0.0));
        let before = rig.get(id).unwrap().params.clone();
        let radius = (before.position - before.target_position).length();

        assert!(rig.reaim(id, Vec2::new(120.0, -45.0), CameraBasis::default()));
        let after = &rig.get(id).unwrap().params;

        assert_eq!(after.target_position, before.target_position);
        assert!(((after.position - after.target_position).length() - radius).abs() < 1e-4);
        assert!((after.position - before.position).length() > 0.1);
    }

    #[test]
    fn test_reaim_horizontal_drag_rotates_about_up() {
        let mut rig = LightRig::from_params([&LightParams::spot(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::ZERO,
            1.0,
            5500.0,
            1.0,
            45.0,
            0.5,
        )]);
        let id = rig.lights()[0].id;
        // -dx * 0.005 = +pi/2 for dx = -pi/2 / 0.005.
        let dx = -std::f32::consts::FRAC_PI_2 / REAIM_RADIANS_PER_PIXEL;
        rig.reaim(id, Vec2::new(dx, 0.0), CameraBasis::default());
        let p = rig.get(id).unwrap().params.position;
        // +90° about +Y takes +X to −Z.
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4, "got {p}");
    }

    #[test]
    fn test_reaim_zero_drag_is_identity() {
        let mut rig = rig_with(1);
        let id = rig.lights()[0].id;
        let before = rig.get(id).unwrap().params.position;
        let basis = CameraBasis::from_rotation(Quat::from_rotation_y(0.7));
        rig.reaim(id, Vec2::ZERO, basis);
        let after = rig.get(id).unwrap().params.position;
        assert!((after - before).length() < EPSILON);
    }

    #[test]
    fn test_focus_on_bounds_sets_target_only() {
        let mut rig = rig_with(1);
        let id = rig.lights()[0].id;
        let position = rig.get(id).unwrap().params.position;
        assert!(rig.focus_on_bounds(id, Vec3::new(0.5, 1.5, -0.25)));
        let light = rig.get(id).unwrap();
        assert_eq!(light.params.target_position, Vec3::new(0.5, 1.5, -0.25));
        assert_eq!(light.params.position, position);
    }

    #[test]
    fn test_select_rejects_unknown() {
        let mut rig = rig_with(2);
        assert!(!rig.select(Some(LightId(500))));
        assert!(rig.select(None));
        assert_eq!(rig.selected(), None);
    }
}
