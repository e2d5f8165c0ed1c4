//! Shared resources and messages for the unit viewer

use bevy::prelude::*;
use depot_core::{
    availability_of, Availability, DataStatus, IngestError, IngestReport, InteractionEvent,
    InteractionState, StoreUpdate, UnitId, UnitMap, UnitStore, ViewerConfig,
};

/// Loaded viewer configuration
#[derive(Debug, Clone, Resource, Default, Deref)]
pub struct ViewerSettings(pub ViewerConfig);

/// Unit records as the rest of the app sees them
///
/// `units` is the effective map: live records, or the built-in dataset while
/// there are none.
#[derive(Debug, Clone, Resource)]
pub struct UnitDirectory {
    store: UnitStore,
    units: UnitMap,
    attempted: bool,
}

impl Default for UnitDirectory {
    fn default() -> Self {
        let store = UnitStore::new();
        let units = store.effective().into_owned();
        Self {
            store,
            units,
            attempted: false,
        }
    }
}

impl UnitDirectory {
    /// Apply one ingestion attempt and refresh the effective map
    pub fn apply(&mut self, result: Result<IngestReport, IngestError>) -> StoreUpdate {
        self.attempted = true;
        let update = self.store.apply(result);
        if matches!(update, StoreUpdate::Replaced { .. }) || self.store.is_empty() {
            self.units = self.store.effective().into_owned();
        }
        update
    }

    /// No source is configured; the built-in dataset is final
    pub fn mark_static(&mut self) {
        self.attempted = true;
    }

    pub fn units(&self) -> &UnitMap {
        &self.units
    }

    pub fn availability(&self, id: &UnitId) -> Availability {
        availability_of(&self.units, id)
    }

    pub fn status(&self) -> DataStatus {
        self.store.status(self.attempted)
    }

    pub fn generation(&self) -> u64 {
        self.store.generation()
    }
}

/// Current hover and selection
#[derive(Debug, Clone, Resource, Default, Deref)]
pub struct UnitInteraction(pub InteractionState);

/// Every hover, selection and dismissal goes through this message
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct InteractionMessage(pub InteractionEvent);

/// UI layout settings for responsive design
#[derive(Debug, Clone, Resource)]
pub struct UiLayout {
    /// Whether the catalog panel is visible
    pub show_left_panel: bool,
    /// Whether the detail panel is visible
    pub show_right_panel: bool,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Whether we're on a small screen (mobile/tablet)
    pub is_mobile: bool,
    /// Scale factor for UI elements on mobile
    pub ui_scale: f32,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            show_left_panel: true,
            show_right_panel: true,
            screen_width: 1920.0,
            screen_height: 1080.0,
            is_mobile: false,
            ui_scale: 1.0,
        }
    }
}

impl UiLayout {
    /// Update layout based on screen dimensions
    pub fn update_for_screen(&mut self, width: f32, height: f32) {
        self.screen_width = width;
        self.screen_height = height;

        // Portrait phones count as mobile even above the width cutoff
        self.is_mobile = width < 800.0 || (width < height && width < 600.0);
        self.ui_scale = if self.is_mobile { 1.3 } else { 1.0 };
    }

    pub fn panel_width(&self) -> f32 {
        if self.is_mobile {
            (self.screen_width * 0.85).min(350.0)
        } else {
            280.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::UnitRecord;

    #[test]
    fn test_directory_starts_with_fallback() {
        let directory = UnitDirectory::default();
        assert_eq!(directory.units().len(), 24);
        assert_eq!(directory.status(), DataStatus::Loading);
    }

    #[test]
    fn test_directory_switches_to_live_records() {
        let mut directory = UnitDirectory::default();
        let id = UnitId::new("a1").unwrap();
        let report = IngestReport {
            records: vec![UnitRecord::new(id.clone(), "", Availability::Occupied, "")],
            dropped: 0,
        };
        directory.apply(Ok(report));
        assert_eq!(directory.units().len(), 1);
        assert_eq!(directory.availability(&id), Availability::Occupied);
        assert_eq!(directory.status(), DataStatus::Live { units: 1 });

        directory.apply(Err(IngestError::Empty));
        assert_eq!(directory.units().len(), 1);
        assert_eq!(directory.generation(), 1);
    }

    #[test]
    fn test_static_directory_reports_fallback() {
        let mut directory = UnitDirectory::default();
        directory.mark_static();
        assert_eq!(
            directory.status(),
            DataStatus::Fallback { reason: "no data source configured".to_string() }
        );
        assert_eq!(directory.units().len(), 24);
    }

    #[test]
    fn test_mobile_layout() {
        let mut layout = UiLayout::default();
        layout.update_for_screen(390.0, 844.0);
        assert!(layout.is_mobile);
        assert!(layout.panel_width() <= 350.0);
        layout.update_for_screen(1440.0, 900.0);
        assert!(!layout.is_mobile);
        assert_eq!(layout.ui_scale, 1.0);
    }
}
