//! Orbit camera with smooth framing of the selected unit

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use depot_core::config::CameraConfig;
use depot_core::UnitId;

use crate::registry::SceneAssets;
use crate::types::{UnitInteraction, ViewerSettings};

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    /// Point the camera currently looks at
    pub target: Vec3,
    /// Point the camera is moving toward
    pub target_focus: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub home_focus: Vec3,
    pub home_distance: f32,
    pub focus_distance: f32,
    /// Maximum focus travel per second
    pub max_pan_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl CameraSettings {
    pub fn from_config(config: &CameraConfig) -> Self {
        let home_focus = Vec3::from_array(config.home_focus);
        Self {
            distance: config.home_distance,
            target_distance: config.home_distance,
            azimuth: 0.8,
            elevation: 0.6,
            target: home_focus,
            target_focus: home_focus,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: config.smoothing,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            home_focus,
            home_distance: config.home_distance,
            focus_distance: config.focus_distance,
            max_pan_speed: config.max_pan_speed,
        }
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }

    /// Frame `anchor`, or go home when there is nothing to frame
    pub fn focus(&mut self, anchor: Option<Vec3>) {
        match anchor {
            Some(anchor) => {
                self.target_focus = anchor;
                self.target_distance = self.clamp_distance(self.focus_distance);
            }
            None => self.home(),
        }
    }

    pub fn home(&mut self) {
        self.target_focus = self.home_focus;
        self.target_distance = self.clamp_distance(self.home_distance);
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, configure_camera)
            .add_systems(Update, (focus_on_selection, update_camera).chain());
    }
}

fn configure_camera(settings: Res<ViewerSettings>, mut camera: ResMut<CameraSettings>) {
    *camera = CameraSettings::from_config(&settings.camera);
}

/// Move `current` toward `target` by `lerp_factor`, never further than `max_step`
pub fn step_toward(current: Vec3, target: Vec3, lerp_factor: f32, max_step: f32) -> Vec3 {
    let step = (target - current) * lerp_factor.clamp(0.0, 1.0);
    current + step.clamp_length_max(max_step.max(0.0))
}

/// World-space center of the vertex bounds of `parts`
fn unit_anchor(
    parts: &[Entity],
    meshes: &Query<(&Mesh3d, &GlobalTransform)>,
    mesh_assets: &Assets<Mesh>,
) -> Option<Vec3> {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    let mut found = false;

    for &part in parts {
        let Ok((mesh_handle, transform)) = meshes.get(part) else {
            continue;
        };
        let Some(positions) = mesh_assets
            .get(&mesh_handle.0)
            .and_then(|mesh| mesh.attribute(Mesh::ATTRIBUTE_POSITION))
            .and_then(|attribute| attribute.as_float3())
        else {
            continue;
        };
        for position in positions {
            let world = transform.transform_point(Vec3::from_array(*position));
            min = min.min(world);
            max = max.max(world);
            found = true;
        }
    }

    found.then(|| (min + max) * 0.5)
}

/// Point the camera at the selected unit when the selection changes
fn focus_on_selection(
    interaction: Res<UnitInteraction>,
    registry: Res<SceneAssets>,
    meshes: Query<(&Mesh3d, &GlobalTransform)>,
    mesh_assets: Res<Assets<Mesh>>,
    mut settings: ResMut<CameraSettings>,
    mut last_selected: Local<Option<UnitId>>,
) {
    if !interaction.is_changed() || *last_selected == interaction.selected {
        return;
    }
    *last_selected = interaction.selected.clone();

    match &interaction.selected {
        Some(unit) => {
            let anchor = unit_anchor(registry.parts_of(unit), &meshes, &mesh_assets);
            if anchor.is_none() {
                tracing::debug!("Unit {} has no geometry, framing the default view", unit);
            }
            settings.focus(anchor);
        }
        None => settings.home(),
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        // Camera not spawned yet; drop this frame's input
        mouse_motion.clear();
        mouse_wheel.clear();
        return;
    };

    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    // Orbit with left drag
    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer {
        settings.azimuth -= total_motion.x * settings.sensitivity;
        settings.elevation = (settings.elevation + total_motion.y * settings.sensitivity).clamp(0.05, 1.5);
    }

    // Pan with right drag, in the camera's ground-plane frame
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        let right = Vec3::new(settings.azimuth.cos(), 0.0, -settings.azimuth.sin());
        let forward = Vec3::new(-settings.azimuth.sin(), 0.0, -settings.azimuth.cos());
        let pan_speed = settings.distance * 0.002;
        let offset = (-right * total_motion.x + forward * total_motion.y) * pan_speed;
        settings.target_focus += offset;
    }

    if !egui_wants_pointer {
        for scroll in mouse_wheel.read() {
            let zoom_factor = 1.0 - scroll.y * settings.zoom_speed * 0.3;
            settings.target_distance = settings.clamp_distance(settings.target_distance * zoom_factor);
        }
    } else {
        mouse_wheel.clear();
    }

    // One finger orbits
    if touch_input.iter().count() == 1 && !egui_wants_pointer {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                settings.azimuth -= delta.x * settings.sensitivity;
                settings.elevation = (settings.elevation + delta.y * settings.sensitivity).clamp(0.05, 1.5);
            }
        }
    }

    // Pinch to zoom
    let touches: Vec<_> = touch_input.iter().collect();
    if let [t1, t2] = touches.as_slice() {
        let curr_dist = t1.position().distance(t2.position());
        let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
        let zoom_factor = prev_dist / curr_dist.max(1.0);
        settings.target_distance = settings.clamp_distance(settings.target_distance * zoom_factor);
    }

    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance += (settings.target_distance - settings.distance) * lerp_factor;
    settings.target = step_toward(
        settings.target,
        settings.target_focus,
        lerp_factor,
        settings.max_pan_speed * dt,
    );

    // Spherical coordinates, Y up
    let horizontal = settings.distance * settings.elevation.cos();
    let offset = Vec3::new(
        horizontal * settings.azimuth.sin(),
        settings.distance * settings.elevation.sin(),
        horizontal * settings.azimuth.cos(),
    );
    transform.translation = settings.target + offset;
    transform.look_at(settings.target, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_is_bounded() {
        let next = step_toward(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), 0.5, 2.0);
        assert!((next - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_step_eases_when_close() {
        let next = step_toward(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.5, 2.0);
        assert_eq!(next, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(step_toward(Vec3::ONE, Vec3::ONE, 0.5, 2.0), Vec3::ONE);
    }

    #[test]
    fn test_focus_and_home() {
        let mut settings = CameraSettings::default();
        settings.focus(Some(Vec3::new(3.0, 0.0, -4.0)));
        assert_eq!(settings.target_focus, Vec3::new(3.0, 0.0, -4.0));
        assert_eq!(settings.target_distance, 8.0);

        settings.focus(None);
        assert_eq!(settings.target_focus, Vec3::ZERO);
        assert_eq!(settings.target_distance, 15.0);
    }

    #[test]
    fn test_distance_is_clamped() {
        let settings = CameraSettings::default();
        assert_eq!(settings.clamp_distance(1.0), 5.0);
        assert_eq!(settings.clamp_distance(100.0), 20.0);
        assert_eq!(settings.clamp_distance(12.0), 12.0);
    }
}
