//! Pointer input, the interaction reducer and highlight animation

use bevy::prelude::*;
use bevy_picking::events::{Click, Out, Over, Pointer};
use depot_core::highlight::target_for;
use depot_core::{
    pointer_event, HighlightAnimator, InteractionEvent, PointerAction, SurfaceBaseline, Tint,
    UnitId, VisualParams,
};

use crate::registry::{AssetPart, MaterialBaselines, SceneAssets};
use crate::types::{InteractionMessage, UnitDirectory, UnitInteraction, ViewerSettings};

/// Emissive strength in linear units per unit of glow
pub const EMISSIVE_GAIN: f32 = 4.0;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UnitInteraction>()
            .init_resource::<UnitAnimator>()
            .add_message::<InteractionMessage>()
            .add_observer(on_pointer_over)
            .add_observer(on_pointer_out)
            .add_observer(on_pointer_click)
            .add_systems(Startup, configure_animator)
            .add_systems(
                Update,
                (
                    handle_deselection,
                    apply_interaction_messages,
                    retarget_highlights,
                    animate_highlights,
                )
                    .chain(),
            );
    }
}

/// Per-unit highlight transitions
#[derive(Resource, Default, Deref, DerefMut)]
pub struct UnitAnimator(pub HighlightAnimator);

fn configure_animator(settings: Res<ViewerSettings>, mut animator: ResMut<UnitAnimator>) {
    animator.0 = HighlightAnimator::new(settings.animation.duration_secs);
}

fn forward_pointer(
    entity: Entity,
    action: PointerAction,
    parts: &Query<&AssetPart>,
    registry: &SceneAssets,
    writer: &mut MessageWriter<InteractionMessage>,
) -> bool {
    let Ok(part) = parts.get(entity) else {
        return false;
    };
    if let Some(event) = pointer_event(&registry.0, &part.identity, action) {
        writer.write(InteractionMessage(event));
    }
    true
}

fn on_pointer_over(
    mut over: On<Pointer<Over>>,
    parts: Query<&AssetPart>,
    registry: Res<SceneAssets>,
    mut writer: MessageWriter<InteractionMessage>,
) {
    if forward_pointer(over.entity, PointerAction::Over, &parts, &registry, &mut writer) {
        over.propagate(false);
    }
}

fn on_pointer_out(
    mut out: On<Pointer<Out>>,
    parts: Query<&AssetPart>,
    registry: Res<SceneAssets>,
    mut writer: MessageWriter<InteractionMessage>,
) {
    if forward_pointer(out.entity, PointerAction::Out, &parts, &registry, &mut writer) {
        out.propagate(false);
    }
}

fn on_pointer_click(
    mut click: On<Pointer<Click>>,
    parts: Query<&AssetPart>,
    registry: Res<SceneAssets>,
    mut writer: MessageWriter<InteractionMessage>,
) {
    if forward_pointer(click.entity, PointerAction::Click, &parts, &registry, &mut writer) {
        click.propagate(false);
    }
}

/// Escape deselects
fn handle_deselection(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut writer: MessageWriter<InteractionMessage>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        writer.write(InteractionMessage(InteractionEvent::ClearSelection));
    }
}

/// The single writer of [`UnitInteraction`]
fn apply_interaction_messages(
    mut messages: MessageReader<InteractionMessage>,
    mut interaction: ResMut<UnitInteraction>,
) {
    for InteractionMessage(event) in messages.read() {
        // Only flag the resource as changed when the state actually moved
        let mut next = interaction.0.clone();
        if next.apply(event.clone()) {
            interaction.0 = next;
        }
    }
}

/// Recompute highlight targets when the interaction state or records change
fn retarget_highlights(
    interaction: Res<UnitInteraction>,
    directory: Res<UnitDirectory>,
    registry: Res<SceneAssets>,
    mut animator: ResMut<UnitAnimator>,
) {
    if !(interaction.is_changed() || directory.is_changed() || registry.is_changed()) {
        return;
    }
    for (unit, _) in registry.units() {
        let target = target_for(&interaction, &unit, directory.availability(&unit));
        animator.retarget(&unit, target);
    }
}

/// Advance transitions and push the results onto transforms and materials
fn animate_highlights(
    time: Res<Time>,
    registry: Res<SceneAssets>,
    baselines: Res<MaterialBaselines>,
    mut animator: ResMut<UnitAnimator>,
    mut transforms: Query<&mut Transform>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if animator.active_len() == 0 {
        return;
    }

    for (unit, params) in animator.tick(time.delta_secs()) {
        apply_visual(
            &unit,
            &params,
            &registry,
            &baselines,
            &mut transforms,
            &mesh_materials,
            &mut materials,
        );
    }
}

fn apply_visual(
    unit: &UnitId,
    params: &VisualParams,
    registry: &SceneAssets,
    baselines: &MaterialBaselines,
    transforms: &mut Query<&mut Transform>,
    mesh_materials: &Query<&MeshMaterial3d<StandardMaterial>>,
    materials: &mut Assets<StandardMaterial>,
) {
    let Some(asset) = registry.get(unit.as_str()) else {
        return;
    };
    if let Ok(mut transform) = transforms.get_mut(asset.root) {
        transform.scale = Vec3::splat(params.scale);
    }

    for &part in &asset.parts {
        let (Some(baseline), Ok(handle)) = (baselines.get(&part), mesh_materials.get(part)) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&handle.0) {
            *material = highlighted(baseline, params);
        }
    }
}

/// Material for `params`; at rest this is the baseline unchanged
pub fn highlighted(baseline: &StandardMaterial, params: &VisualParams) -> StandardMaterial {
    let mut material = baseline.clone();
    let surface = SurfaceBaseline {
        metallic: baseline.metallic,
        roughness: baseline.perceptual_roughness,
    };
    let (Some(patch), Some(tint)) = (surface.patch(params), params.tint) else {
        return material;
    };

    // Glow only; authored base colors and textures stay as they are
    let tint = tint_color(tint).to_linear();
    let glow = params.glow * EMISSIVE_GAIN;
    let emissive = baseline.emissive;
    material.emissive = LinearRgba::new(
        emissive.red + tint.red * glow,
        emissive.green + tint.green * glow,
        emissive.blue + tint.blue * glow,
        emissive.alpha,
    );
    material.metallic = patch.metallic;
    material.perceptual_roughness = patch.roughness;
    material
}

pub fn tint_color(tint: Tint) -> Color {
    Color::srgb_u8(tint.r, tint.g, tint.b)
}
