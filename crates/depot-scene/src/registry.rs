//! Model loading, asset registration and per-mesh material baselines

use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use depot_core::config::{AssetsConfig, Paint};
use depot_core::{classify, AssetKind, AssetRegistry, AssetSpec, BaselineSet};

use crate::types::ViewerSettings;

pub struct RegistryPlugin;

impl Plugin for RegistryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelCache>()
            .init_resource::<SceneAssets>()
            .init_resource::<MaterialBaselines>()
            .add_systems(Startup, request_models)
            .add_systems(Update, (spawn_loaded_models, tag_asset_parts).chain());
    }
}

/// Root of one spawned model instance
#[derive(Component, Debug, Clone)]
pub struct SceneAsset {
    pub identity: String,
    pub kind: AssetKind,
}

/// Mesh belonging to a registered asset
#[derive(Component, Debug, Clone)]
pub struct AssetPart {
    pub identity: String,
}

/// Mesh outside any registered asset (ground, helpers)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Untracked;

/// glTF loads still in flight
#[derive(Resource, Default)]
pub struct ModelCache {
    pub loading: HashMap<String, (AssetSpec, Handle<Gltf>)>,
    pub failed: Vec<String>,
}

/// Registered assets keyed by identity, with their mesh parts
#[derive(Resource, Default, Deref, DerefMut)]
pub struct SceneAssets(pub AssetRegistry<Entity>);

/// Material of each tagged mesh as it looked before any highlight
#[derive(Resource, Default, Deref, DerefMut)]
pub struct MaterialBaselines(pub BaselineSet<Entity, StandardMaterial>);

fn request_models(
    settings: Res<ViewerSettings>,
    asset_server: Res<AssetServer>,
    mut cache: ResMut<ModelCache>,
) {
    let assets = &settings.assets;
    let base = assets.base_path.trim_end_matches('/');
    for file in &assets.files {
        let spec = classify(file, &assets.aliases, &assets.keep_materials);
        if cache.loading.contains_key(&spec.identity) {
            tracing::warn!("Skipping {}: identity {} already requested", file, spec.identity);
            continue;
        }
        let path = if base.is_empty() {
            file.clone()
        } else {
            format!("{}/{}", base, file)
        };
        tracing::info!("Loading model {} as {:?} {}", path, spec.kind, spec.identity);
        let handle: Handle<Gltf> = asset_server.load(path);
        cache.loading.insert(spec.identity.clone(), (spec, handle));
    }
}

/// Poll pending loads and spawn a fresh scene instance for each finished one
fn spawn_loaded_models(
    mut commands: Commands,
    mut cache: ResMut<ModelCache>,
    mut registry: ResMut<SceneAssets>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
) {
    let keys: Vec<String> = cache.loading.keys().cloned().collect();
    for key in keys {
        let Some((_, handle)) = cache.loading.get(&key) else {
            continue;
        };

        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {
                let scene = gltf_assets
                    .get(handle)
                    .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
                let Some((spec, _)) = cache.loading.remove(&key) else {
                    continue;
                };
                let Some(scene) = scene else {
                    tracing::error!("Model {} has no scenes", spec.file);
                    cache.failed.push(spec.file);
                    continue;
                };

                let entity = commands
                    .spawn((
                        SceneRoot(scene),
                        Transform::default(),
                        SceneAsset {
                            identity: spec.identity.clone(),
                            kind: spec.kind,
                        },
                        Name::new(spec.identity.clone()),
                    ))
                    .id();
                if !registry.register(spec, entity) {
                    commands.entity(entity).despawn();
                }
            }
            Some(LoadState::Failed(e)) => {
                tracing::error!("Failed to load model {}: {}", key, e);
                if let Some((spec, _)) = cache.loading.remove(&key) {
                    cache.failed.push(spec.file);
                }
            }
            _ => {}
        }
    }
}

/// Tag each newly spawned mesh with its owning asset, give it its own
/// material (painted if configured) and capture the baseline
fn tag_asset_parts(
    mut commands: Commands,
    settings: Res<ViewerSettings>,
    mut registry: ResMut<SceneAssets>,
    mut baselines: ResMut<MaterialBaselines>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    new_meshes: Query<
        (Entity, Option<&MeshMaterial3d<StandardMaterial>>),
        (With<Mesh3d>, Without<AssetPart>, Without<Untracked>),
    >,
    parents: Query<&ChildOf>,
    roots: Query<&SceneAsset>,
) {
    for (entity, material) in new_meshes.iter() {
        let owner = parents
            .iter_ancestors(entity)
            .find_map(|ancestor| roots.get(ancestor).ok());
        let Some(owner) = owner else {
            commands.entity(entity).insert(Untracked);
            continue;
        };
        let Some(spec) = registry.get(&owner.identity).map(|a| a.spec.clone()) else {
            continue;
        };

        let source = material
            .and_then(|m| materials.get(&m.0))
            .cloned()
            .unwrap_or_default();
        let own = paint_for(&spec, &settings.assets)
            .map(|paint| painted(source.clone(), paint))
            .unwrap_or(source);

        baselines.capture(entity, || own.clone());
        let handle = materials.add(own);
        commands
            .entity(entity)
            .insert((MeshMaterial3d(handle), AssetPart { identity: spec.identity.clone() }));
        registry.attach_part(&spec.identity, entity);
    }
}

fn paint_for(spec: &AssetSpec, assets: &AssetsConfig) -> Option<Paint> {
    if !assets.paint || spec.keep_materials {
        return None;
    }
    match spec.kind {
        AssetKind::Unit => Some(assets.unit_paint),
        AssetKind::Bridge => Some(assets.bridge_paint),
        AssetKind::Other => None,
    }
}

fn painted(mut material: StandardMaterial, paint: Paint) -> StandardMaterial {
    let [r, g, b] = paint.color.0;
    material.base_color = Color::srgb_u8(r, g, b);
    material.base_color_texture = None;
    material.metallic = paint.metallic;
    material.perceptual_roughness = paint.roughness;
    material.metallic_roughness_texture = None;
    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_paint_selection() {
        let assets = AssetsConfig::default();
        let aliases = BTreeMap::new();

        let unit = classify("a1.glb", &aliases, &[]);
        assert_eq!(paint_for(&unit, &assets), Some(assets.unit_paint));

        let bridge = classify("a bridge.glb", &aliases, &[]);
        assert_eq!(paint_for(&bridge, &assets), Some(assets.bridge_paint));

        let shell = classify("warehouse.glb", &aliases, &[]);
        assert_eq!(paint_for(&shell, &assets), None);

        let kept = classify("update 2.glb", &assets.aliases, &assets.keep_materials);
        assert_eq!(kept.kind, AssetKind::Unit);
        assert_eq!(paint_for(&kept, &assets), None);
    }

    #[test]
    fn test_painted_material() {
        let paint = AssetsConfig::default().unit_paint;
        let material = painted(StandardMaterial::default(), paint);
        assert_eq!(material.base_color, Color::srgb_u8(0x46, 0x82, 0xb4));
        assert_eq!(material.metallic, 0.1);
        assert_eq!(material.perceptual_roughness, 0.7);
    }
}
