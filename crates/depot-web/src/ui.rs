//! UI overlays using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use depot_core::{catalog_rows, InteractionEvent, UnitDetails, UnitId};
use depot_scene::ui::{
    render_catalog_controls, render_catalog_rows, render_data_status, render_model_failures,
    render_unit_details, CatalogState,
};
use depot_scene::registry::ModelCache;
use depot_scene::{InteractionMessage, UiLayout, UnitDirectory, UnitInteraction, ViewerSettings};

use crate::data::{FetchState, RefetchUnits};
use crate::floor_plan::FloorPlanImage;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CatalogPanel>()
            // UI layout updates run in Update
            .add_systems(Update, (update_ui_layout, reveal_details_on_selection))
            // Main UI system runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Catalog filter, sort and row hover
#[derive(Resource, Default, Deref, DerefMut)]
pub struct CatalogPanel(pub CatalogState);

/// Update UI layout based on window size
fn update_ui_layout(
    windows: Query<&Window>,
    mut ui_layout: ResMut<UiLayout>,
) {
    if let Ok(window) = windows.single() {
        let width = window.width();
        let height = window.height();

        // Only update if dimensions changed significantly
        if (ui_layout.screen_width - width).abs() > 1.0
            || (ui_layout.screen_height - height).abs() > 1.0
        {
            ui_layout.update_for_screen(width, height);
        }
    }
}

/// A new selection reopens the detail panel if the user had hidden it
fn reveal_details_on_selection(
    interaction: Res<UnitInteraction>,
    mut last_selected: Local<Option<UnitId>>,
    mut ui_layout: ResMut<UiLayout>,
) {
    if !interaction.is_changed() || *last_selected == interaction.selected {
        return;
    }
    *last_selected = interaction.selected.clone();
    if last_selected.is_some() && !ui_layout.show_right_panel {
        ui_layout.show_right_panel = true;
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    directory: Res<UnitDirectory>,
    interaction: Res<UnitInteraction>,
    settings: Res<ViewerSettings>,
    floor_plan: Res<FloorPlanImage>,
    fetch_state: Res<FetchState>,
    model_cache: Res<ModelCache>,
    mut catalog: ResMut<CatalogPanel>,
    mut ui_layout: ResMut<UiLayout>,
    mut interactions: MessageWriter<InteractionMessage>,
    mut refetch: MessageWriter<RefetchUnits>,
) {
    let is_mobile = ui_layout.is_mobile;
    let panel_width = ui_layout.panel_width();
    let ui_scale = ui_layout.ui_scale;
    let mut events: Vec<InteractionEvent> = Vec::new();

    // Get the egui context - early return if not available
    let Ok(ctx) = contexts.ctx_mut() else { return };

    // Set up style for mobile - larger text and touch targets
    if is_mobile {
        let mut style = (*ctx.style()).clone();
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
    }

    // Mobile: Show toggle buttons at top
    if is_mobile {
        egui::TopBottomPanel::top("mobile_toolbar")
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let menu_text = if ui_layout.show_left_panel { "✕ Units" } else { "☰ Units" };
                    if ui.button(egui::RichText::new(menu_text).size(16.0 * ui_scale)).clicked() {
                        ui_layout.show_left_panel = !ui_layout.show_left_panel;
                    }

                    if interaction.selected.is_some() {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let details_text = if ui_layout.show_right_panel { "Hide details" } else { "Details" };
                            if ui.button(egui::RichText::new(details_text).size(16.0 * ui_scale)).clicked() {
                                ui_layout.show_right_panel = !ui_layout.show_right_panel;
                            }
                        });
                    }
                });
            });
    }

    if ui_layout.show_left_panel {
        egui::SidePanel::left("catalog_panel")
            .default_width(panel_width)
            .resizable(!is_mobile)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(egui::RichText::new("Units").size(18.0 * ui_scale));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if settings.data.url().is_some() {
                            let refresh = ui.add_enabled(
                                !fetch_state.in_flight,
                                egui::Button::new(egui::RichText::new("⟳ Refresh").size(14.0 * ui_scale)),
                            );
                            if refresh.clicked() {
                                refetch.write(RefetchUnits);
                            }
                        }
                    });
                });
                render_data_status(ui, &directory.status());
                render_model_failures(ui, &model_cache.failed);
                ui.separator();

                render_catalog_controls(ui, &mut catalog);
                ui.separator();

                let rows = catalog_rows(directory.units(), catalog.filter, catalog.sort);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    events.extend(render_catalog_rows(
                        ui,
                        &rows,
                        interaction.selected.as_ref(),
                        &mut catalog,
                        &ui_layout,
                    ));
                });
            });
    } else {
        // Hidden rows cannot keep a unit hovered
        events.extend(catalog.hover_transition(None));
    }

    if let Some(selected) = interaction.selected.as_ref() {
        if ui_layout.show_right_panel {
            let details = UnitDetails::resolve(selected, directory.units(), &settings.floor_plans);
            egui::SidePanel::right("details_panel")
                .default_width(if is_mobile { panel_width } else { 300.0 })
                .resizable(!is_mobile)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        if render_unit_details(ui, &details, floor_plan.view(), &ui_layout) {
                            events.push(InteractionEvent::ClearSelection);
                        }
                        if floor_plan.is_placeholder() {
                            ui.label(
                                egui::RichText::new("Floor plan not available")
                                    .small()
                                    .color(egui::Color32::GRAY),
                            );
                        }
                    });
                });
        }
    }

    for event in events {
        interactions.write(InteractionMessage(event));
    }
}
