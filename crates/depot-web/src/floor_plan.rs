//! Floor plan image for the selected unit

use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_egui::{egui, EguiContexts, EguiTextureHandle};
use depot_core::UnitDetails;
use depot_scene::ui::FloorPlanView;
use depot_scene::{UnitDirectory, UnitInteraction, ViewerSettings};

const PLACEHOLDER_WIDTH: u32 = 320;
const PLACEHOLDER_HEIGHT: u32 = 240;
const PLACEHOLDER_BACKGROUND: [u8; 4] = [0xe5, 0xe7, 0xeb, 0xff];
const PLACEHOLDER_INK: [u8; 4] = [0x9c, 0xa3, 0xaf, 0xff];

pub struct FloorPlanPlugin;

impl Plugin for FloorPlanPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FloorPlanImage>()
            .add_systems(Startup, create_placeholder)
            .add_systems(Update, (track_selected_floor_plan, poll_floor_plan).chain());
    }
}

/// Image shown for the currently selected unit
#[derive(Resource, Default)]
pub struct FloorPlanImage {
    /// Path or URL being shown; `None` with nothing selected
    path: Option<String>,
    handle: Option<Handle<Image>>,
    view: Option<FloorPlanView>,
    placeholder: Handle<Image>,
}

impl FloorPlanImage {
    pub fn view(&self) -> FloorPlanView {
        self.view.unwrap_or(FloorPlanView::Loading)
    }

    /// Whether the generated placeholder is on display
    pub fn is_placeholder(&self) -> bool {
        self.handle.as_ref() == Some(&self.placeholder)
    }
}

/// RGBA pixels for the "no floor plan" image: a framed box with a cross
pub fn placeholder_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    let border = 3;
    for y in 0..height {
        for x in 0..width {
            let on_border = x < border || y < border || x >= width - border || y >= height - border;
            // Diagonals of the box, two pixels thick
            let dx = (x * height) as i64;
            let falling = (dx - (y * width) as i64).abs() <= width as i64;
            let rising = (dx - ((height - 1 - y) * width) as i64).abs() <= width as i64;
            let pixel = if on_border || falling || rising {
                PLACEHOLDER_INK
            } else {
                PLACEHOLDER_BACKGROUND
            };
            data.extend_from_slice(&pixel);
        }
    }
    data
}

fn placeholder_image() -> Image {
    Image::new(
        Extent3d {
            width: PLACEHOLDER_WIDTH,
            height: PLACEHOLDER_HEIGHT,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        placeholder_pixels(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

fn create_placeholder(mut images: ResMut<Assets<Image>>, mut floor_plan: ResMut<FloorPlanImage>) {
    floor_plan.placeholder = images.add(placeholder_image());
}

/// Start loading the image for a new selection
fn track_selected_floor_plan(
    interaction: Res<UnitInteraction>,
    directory: Res<UnitDirectory>,
    settings: Res<ViewerSettings>,
    asset_server: Res<AssetServer>,
    mut contexts: EguiContexts,
    mut floor_plan: ResMut<FloorPlanImage>,
) {
    if !(interaction.is_changed() || directory.is_changed()) {
        return;
    }

    let wanted = interaction
        .selected
        .as_ref()
        .map(|id| UnitDetails::resolve(id, directory.units(), &settings.floor_plans).floor_plan);
    if wanted == floor_plan.path {
        return;
    }

    if let Some(old) = floor_plan.handle.take() {
        if old != floor_plan.placeholder {
            contexts.remove_image(&old);
        }
    }

    match &wanted {
        Some(path) => {
            tracing::debug!("Loading floor plan {}", path);
            floor_plan.handle = Some(asset_server.load::<Image>(path.clone()));
            floor_plan.view = Some(FloorPlanView::Loading);
        }
        None => floor_plan.view = None,
    }
    floor_plan.path = wanted;
}

fn poll_floor_plan(
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    mut contexts: EguiContexts,
    mut floor_plan: ResMut<FloorPlanImage>,
) {
    if floor_plan.view != Some(FloorPlanView::Loading) {
        return;
    }
    let Some(handle) = floor_plan.handle.clone() else {
        return;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            if let Some(image) = images.get(&handle) {
                let size = egui::vec2(image.width() as f32, image.height() as f32);
                let texture = contexts.add_image(EguiTextureHandle::Strong(handle));
                floor_plan.view = Some(FloorPlanView::Ready { texture, size });
            }
        }
        Some(LoadState::Failed(e)) => {
            tracing::warn!(
                "Floor plan {} unavailable ({}), showing placeholder",
                floor_plan.path.as_deref().unwrap_or_default(),
                e
            );
            let placeholder = floor_plan.placeholder.clone();
            let texture = contexts.add_image(EguiTextureHandle::Strong(placeholder.clone()));
            floor_plan.handle = Some(placeholder);
            floor_plan.view = Some(FloorPlanView::Ready {
                texture,
                size: egui::vec2(PLACEHOLDER_WIDTH as f32, PLACEHOLDER_HEIGHT as f32),
            });
        }
        _ => {
            // Still loading
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [data[i], data[i + 1], data[i + 2], data[i + 3]]
    }

    #[test]
    fn test_placeholder_layout() {
        let data = placeholder_pixels(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
        assert_eq!(data.len(), (PLACEHOLDER_WIDTH * PLACEHOLDER_HEIGHT * 4) as usize);
        assert_eq!(pixel(&data, PLACEHOLDER_WIDTH, 0, 0), PLACEHOLDER_INK);
        assert_eq!(pixel(&data, PLACEHOLDER_WIDTH, 160, 120), PLACEHOLDER_INK);
        assert_eq!(pixel(&data, PLACEHOLDER_WIDTH, 160, 20), PLACEHOLDER_BACKGROUND);
    }

    #[test]
    fn test_empty_view_is_loading() {
        let floor_plan = FloorPlanImage::default();
        assert_eq!(floor_plan.view(), FloorPlanView::Loading);
        assert!(!floor_plan.is_placeholder());
    }
}
