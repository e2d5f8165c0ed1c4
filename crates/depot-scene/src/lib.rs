//! Depot Scene - Bevy side of the unit viewer
//!
//! Loads the configured models into an identity-tagged registry, turns pointer
//! input into interaction events, animates unit highlights and frames the
//! selected unit with the orbit camera. Panels live in the app crate and use
//! the shared pieces in [`ui`].

pub mod camera;
pub mod interaction;
pub mod registry;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

/// Plugin that sets up the shared 3D scene components
///
/// Insert [`ViewerSettings`] before adding the plugin to override the defaults.
pub struct DepotScenePlugin;

impl Plugin for DepotScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewerSettings>()
            .init_resource::<UnitDirectory>()
            .init_resource::<UiLayout>()
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(registry::RegistryPlugin)
            .add_plugins(interaction::InteractionPlugin);
    }
}

// Re-export commonly used types
pub use camera::CameraSettings;
pub use registry::{AssetPart, SceneAsset, SceneAssets};
pub use types::*;
