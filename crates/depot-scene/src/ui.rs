//! Shared UI pieces: unit details, catalog rows and the data status line

use bevy_egui::egui;
use depot_core::{
    Availability, AvailabilityFilter, DataStatus, InteractionEvent, SortOrder, Tint, UnitDetails,
    UnitId, UnitRecord,
};

use crate::types::UiLayout;

pub fn availability_color(availability: Availability) -> egui::Color32 {
    let tint = Tint::for_availability(availability);
    egui::Color32::from_rgb(tint.r, tint.g, tint.b)
}

/// Image shown in the detail panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloorPlanView {
    Loading,
    Ready { texture: egui::TextureId, size: egui::Vec2 },
}

/// Render the detail panel body. Returns `true` when the user dismissed it.
pub fn render_unit_details(
    ui: &mut egui::Ui,
    details: &UnitDetails,
    floor_plan: FloorPlanView,
    ui_layout: &UiLayout,
) -> bool {
    let ui_scale = ui_layout.ui_scale;
    let mut closed = false;

    ui.horizontal(|ui| {
        ui.heading(egui::RichText::new(&details.title).size(18.0 * ui_scale));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(egui::RichText::new("✕").size(16.0 * ui_scale)).clicked() {
                closed = true;
            }
        });
    });
    ui.separator();

    ui.horizontal(|ui| {
        ui.colored_label(availability_color(details.availability), "●");
        ui.label(details.availability.label());
    });
    ui.label(format!("Size: {}", details.size));
    ui.label(format!("Amenities: {}", details.amenities));

    ui.separator();
    ui.label(egui::RichText::new("Floor plan").strong());
    match floor_plan {
        FloorPlanView::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading floor plan...");
            });
        }
        FloorPlanView::Ready { texture, size } => {
            let width = ui.available_width().min(size.x.max(1.0));
            let height = width * size.y / size.x.max(1.0);
            ui.image(egui::load::SizedTexture::new(texture, egui::vec2(width, height)));
        }
    }

    closed
}

/// Filter, sort and hover bookkeeping for the catalog list
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub filter: AvailabilityFilter,
    pub sort: SortOrder,
    /// Row under the pointer last frame
    pub hovered_row: Option<UnitId>,
}

impl CatalogState {
    /// Events for the hovered row changing from the previous frame
    pub fn hover_transition(&mut self, now: Option<UnitId>) -> Vec<InteractionEvent> {
        if self.hovered_row == now {
            return Vec::new();
        }
        let mut events = Vec::new();
        if let Some(previous) = self.hovered_row.take() {
            events.push(InteractionEvent::HoverLeave(previous));
        }
        if let Some(current) = now.clone() {
            events.push(InteractionEvent::HoverEnter(current));
        }
        self.hovered_row = now;
        events
    }
}

/// Filter/sort controls
pub fn render_catalog_controls(ui: &mut egui::Ui, state: &mut CatalogState) {
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt("availability_filter")
            .selected_text(state.filter.label())
            .show_ui(ui, |ui| {
                for filter in AvailabilityFilter::ALL {
                    ui.selectable_value(&mut state.filter, filter, filter.label());
                }
            });
        egui::ComboBox::from_id_salt("sort_order")
            .selected_text(state.sort.label())
            .show_ui(ui, |ui| {
                for sort in SortOrder::ALL {
                    ui.selectable_value(&mut state.sort, sort, sort.label());
                }
            });
    });
}

/// Render the unit rows and return the interaction events they produced
pub fn render_catalog_rows(
    ui: &mut egui::Ui,
    rows: &[&UnitRecord],
    selected: Option<&UnitId>,
    state: &mut CatalogState,
    ui_layout: &UiLayout,
) -> Vec<InteractionEvent> {
    let mut events = Vec::new();
    let mut hovered_now = None;

    if rows.is_empty() {
        ui.label(egui::RichText::new("No units match").color(egui::Color32::GRAY));
    }

    for record in rows {
        let is_selected = selected == Some(&record.id);
        let response = ui
            .horizontal(|ui| {
                ui.colored_label(availability_color(record.availability), "●");
                let label = egui::RichText::new(record.id.as_str().to_uppercase()).size(14.0 * ui_layout.ui_scale);
                let row = ui.selectable_label(is_selected, label);
                ui.label(egui::RichText::new(&record.size).small().color(egui::Color32::GRAY));
                row
            })
            .inner;

        if response.hovered() {
            hovered_now = Some(record.id.clone());
        }
        if response.clicked() {
            events.push(InteractionEvent::Select(record.id.clone()));
        }
    }

    let mut transitions = state.hover_transition(hovered_now);
    transitions.append(&mut events);
    transitions
}

/// Small non-blocking line describing where the data comes from
pub fn render_data_status(ui: &mut egui::Ui, status: &DataStatus) {
    let (color, text) = match status {
        DataStatus::Loading => (egui::Color32::GRAY, "Loading unit data...".to_string()),
        DataStatus::Live { units } => (egui::Color32::from_rgb(0x7f, 0xb0, 0x8a), format!("Live data: {} units", units)),
        DataStatus::Fallback { reason } => (
            egui::Color32::from_rgb(0xd9, 0x90, 0x2f),
            format!("Using offline data ({})", reason),
        ),
    };
    ui.label(egui::RichText::new(text).small().color(color));
}

/// Status text for models that could not be loaded
pub fn failed_models_notice(failed: &[String]) -> Option<String> {
    match failed {
        [] => None,
        [file] => Some(format!("Model {} failed to load", file)),
        files => Some(format!("{} models failed to load", files.len())),
    }
}

/// Warning line under the data status, with the file list on hover
pub fn render_model_failures(ui: &mut egui::Ui, failed: &[String]) {
    let Some(text) = failed_models_notice(failed) else {
        return;
    };
    ui.label(egui::RichText::new(text).small().color(egui::Color32::from_rgb(0xd9, 0x90, 0x2f)))
        .on_hover_text(failed.join("\n"));
}
