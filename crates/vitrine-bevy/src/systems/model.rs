//! Loaded model: scene spawning, bounds, preview materials, thumbnail timing.

use bevy::camera::primitives::Aabb;
use bevy::prelude::*;
use vitrine_core::MaterialMode;
use vitrine_core::view::camera::Bounds;
use vitrine_core::view::environment::{MaterialOverride, parse_hex_color};

use crate::components::{ModelMesh, ViewerModel};
use crate::events::{CaptureThumbnail, ViewChanged};
use crate::resources::{PreviewMaterials, ViewerState};

/// Replace the model scene whenever a model is opened or closed.
pub fn spawn_model_scene(
    mut commands: Commands,
    mut state: ResMut<ViewerState>,
    asset_server: Res<AssetServer>,
    existing: Query<Entity, With<ViewerModel>>,
) {
    if !state.scene_pending {
        return;
    }
    state.scene_pending = false;
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    let Some(url) = state.model_url.clone() else {
        return;
    };
    tracing::info!("Loading model scene {url}");
    commands.spawn((
        ViewerModel,
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(url))),
    ));
}

/// Remember the shipped material of every mesh that appears under the model.
pub fn tag_model_meshes(
    mut commands: Commands,
    added: Query<(Entity, &MeshMaterial3d<StandardMaterial>), Added<MeshMaterial3d<StandardMaterial>>>,
    parents: Query<&ChildOf>,
    models: Query<(), With<ViewerModel>>,
    mut state: ResMut<ViewerState>,
) {
    let mut tagged = 0usize;
    for (entity, material) in &added {
        if !parents.iter_ancestors(entity).any(|a| models.contains(a)) {
            continue;
        }
        commands.entity(entity).insert(ModelMesh {
            original: material.0.clone(),
        });
        tagged += 1;
    }
    if tagged > 0 {
        tracing::debug!("Tagged {tagged} model meshes");
        state.materials_dirty = true;
    }
}

/// Union of the world-space boxes of every model mesh.
pub fn world_bounds<'a>(meshes: impl IntoIterator<Item = (&'a Aabb, &'a GlobalTransform)>) -> Option<Bounds> {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    let mut any = false;
    for (aabb, transform) in meshes {
        let center = Vec3::from(aabb.center);
        let half = Vec3::from(aabb.half_extents);
        for corner in 0..8u8 {
            let sign = Vec3::new(
                if corner & 1 == 0 { -1.0 } else { 1.0 },
                if corner & 2 == 0 { -1.0 } else { 1.0 },
                if corner & 4 == 0 { -1.0 } else { 1.0 },
            );
            let world = transform.transform_point(center + half * sign);
            min = min.min(world);
            max = max.max(world);
        }
        any = true;
    }
    any.then(|| Bounds::new(min, max))
}

/// Measure the model once its meshes have bounds, then frame it.
pub fn measure_model_bounds(
    mut state: ResMut<ViewerState>,
    meshes: Query<(&Aabb, &GlobalTransform), With<ModelMesh>>,
    mut changed: MessageWriter<ViewChanged>,
) {
    if !state.bounds_pending {
        return;
    }
    let Some(bounds) = world_bounds(&meshes) else {
        return;
    };
    state.bounds_pending = false;
    state.bounds = Some(bounds);
    if state.session.frame_model(&bounds) {
        state.camera_dirty = true;
    }
    tracing::info!("Model bounds {:?} .. {:?}", bounds.min, bounds.max);
    changed.write(ViewChanged);
}

fn override_material(ov: &MaterialOverride) -> StandardMaterial {
    let [r, g, b] = parse_hex_color(&ov.color).unwrap_or([1.0, 1.0, 1.0]);
    StandardMaterial {
        base_color: Color::srgb(r, g, b),
        metallic: ov.metalness,
        perceptual_roughness: ov.roughness,
        clearcoat: ov.clearcoat,
        clearcoat_perceptual_roughness: ov.clearcoat_roughness,
        ior: ov.ior,
        specular_transmission: ov.transmission,
        ..default()
    }
}

fn clay_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        metallic: 0.0,
        perceptual_roughness: 0.8,
        ..default()
    }
}

// Unlit approximation; per-pixel normals need a custom shader.
fn normal_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgb(0.5, 0.5, 1.0),
        unlit: true,
        ..default()
    }
}

fn upsert(
    materials: &mut Assets<StandardMaterial>,
    slot: &mut Option<Handle<StandardMaterial>>,
    material: StandardMaterial,
) -> Handle<StandardMaterial> {
    if let Some(handle) = slot
        && let Some(existing) = materials.get_mut(handle.id())
    {
        *existing = material;
        return handle.clone();
    }
    let handle = materials.add(material);
    *slot = Some(handle.clone());
    handle
}

/// Swap mesh materials to match the material mode and override.
pub fn apply_material_mode(
    mut state: ResMut<ViewerState>,
    mut preview: ResMut<PreviewMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: Query<(&ModelMesh, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    if !state.materials_dirty {
        return;
    }
    state.bypass_change_detection().materials_dirty = false;

    let env = state.session.environment();
    let preview = &mut *preview;
    let enabled_override = env.material_override.as_ref().filter(|o| o.enabled);
    let shared = match (env.material_mode, enabled_override) {
        (MaterialMode::Pbr, None) => None,
        (MaterialMode::Pbr, Some(ov)) => {
            Some(upsert(&mut materials, &mut preview.physical, override_material(ov)))
        }
        (MaterialMode::White, _) => Some(upsert(&mut materials, &mut preview.clay, clay_material())),
        (MaterialMode::Normal, _) => {
            Some(upsert(&mut materials, &mut preview.normal, normal_material()))
        }
    };

    for (mesh, mut material) in &mut meshes {
        let wanted = shared.clone().unwrap_or_else(|| mesh.original.clone());
        if material.0 != wanted {
            material.0 = wanted;
        }
    }
}

/// Fire `CaptureThumbnail` once the open model has rendered for the capture delay.
pub fn poll_thumbnail_capture(
    time: Res<Time>,
    mut state: ResMut<ViewerState>,
    mut capture: MessageWriter<CaptureThumbnail>,
) {
    if state.session.pending_thumbnail().is_none() || state.bounds_pending {
        return;
    }
    let now = time.elapsed();
    if let Some(model_id) = state.bypass_change_detection().session.poll_thumbnail_capture(now) {
        tracing::info!("Capturing thumbnail for {model_id}");
        capture.write(CaptureThumbnail { model_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3A;

    #[test]
    fn test_world_bounds_applies_transform() {
        let aabb = Aabb {
            center: Vec3A::ZERO,
            half_extents: Vec3A::splat(1.0),
        };
        let moved = GlobalTransform::from(Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
        let bounds = world_bounds([(&aabb, &moved)]).unwrap();
        assert_eq!(bounds.min, Vec3::new(8.0, -2.0, -2.0));
        assert_eq!(bounds.max, Vec3::new(12.0, 2.0, 2.0));
    }

    #[test]
    fn test_world_bounds_of_nothing() {
        assert!(world_bounds(std::iter::empty::<(&Aabb, &GlobalTransform)>()).is_none());
    }

    #[test]
    fn test_override_material_reads_color() {
        let ov = MaterialOverride {
            enabled: true,
            color: "#ff0000".into(),
            ..Default::default()
        };
        let material = override_material(&ov);
        assert_eq!(material.base_color, Color::srgb(1.0, 0.0, 0.0));
        assert_eq!(material.metallic, ov.metalness);
    }
}
