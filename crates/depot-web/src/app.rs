//! Bevy application setup

use anyhow::{Context, Result};
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use depot_core::config::DEFAULT_SHEET_RANGE;
use depot_core::{DataSource, ViewerConfig};
use depot_scene::{DepotScenePlugin, ViewerSettings};

use crate::data::DataPlugin;
use crate::floor_plan::FloorPlanPlugin;
use crate::ui::UiPlugin;

/// Configuration compiled into the binary
const EMBEDDED_CONFIG: &str = include_str!("../depot.toml");

/// Build-time data source overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOverrides {
    pub csv_url: Option<String>,
    pub sheets_api_key: Option<String>,
    pub spreadsheet_id: Option<String>,
}

impl SourceOverrides {
    fn from_build_env() -> Self {
        let non_empty = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            csv_url: non_empty(option_env!("DEPOT_CSV_URL")),
            sheets_api_key: non_empty(option_env!("DEPOT_SHEETS_API_KEY")),
            spreadsheet_id: non_empty(option_env!("DEPOT_SPREADSHEET_ID")),
        }
    }

    /// A CSV URL wins over Sheets credentials; Sheets needs both key and id
    pub fn apply(&self, config: &mut ViewerConfig) {
        if let Some(url) = &self.csv_url {
            config.data = DataSource::Csv { url: url.clone() };
        } else if let (Some(api_key), Some(spreadsheet_id)) = (&self.sheets_api_key, &self.spreadsheet_id) {
            let range = match &config.data {
                DataSource::Sheets { range, .. } => range.clone(),
                _ => DEFAULT_SHEET_RANGE.to_string(),
            };
            config.data = DataSource::Sheets {
                api_key: api_key.clone(),
                spreadsheet_id: spreadsheet_id.clone(),
                range,
            };
        }
    }
}

/// Parse a query parameter from a search string
pub fn parse_query_param(search: &str, param: &str) -> Option<String> {
    let search = search.trim_start_matches('?');
    for pair in search.split('&') {
        let mut parts = pair.splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            if key == param && !value.is_empty() {
                let value = value.replace('+', " ");
                return Some(
                    urlencoding::decode(&value)
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| value.clone()),
                );
            }
        }
    }
    None
}

/// `?csv=<url>` on the page URL overrides the configured source
#[cfg(target_arch = "wasm32")]
fn browser_overrides() -> SourceOverrides {
    let search = web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default();
    SourceOverrides {
        csv_url: parse_query_param(&search, "csv"),
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn browser_overrides() -> SourceOverrides {
    SourceOverrides::default()
}

fn load_config() -> Result<ViewerConfig> {
    let mut config =
        ViewerConfig::from_toml_str(EMBEDDED_CONFIG).context("parsing embedded depot.toml")?;
    SourceOverrides::from_build_env().apply(&mut config);
    browser_overrides().apply(&mut config);
    config.validate().context("validating data source overrides")?;
    Ok(config)
}

/// Run the Bevy application
pub fn run() {
    let config = load_config().unwrap_or_else(|e| {
        tracing::error!("Configuration error, using defaults: {:#}", e);
        ViewerConfig::default()
    });
    tracing::info!("Unit data source: {:?}", config.data);

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.85, 0.88, 0.92)))
        .insert_resource(ViewerSettings(config))
        // Bevy 0.17+ has built-in https:// asset loading via the "https" feature
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Depot - Storage Unit Viewer".to_string(),
                    canvas: Some("#depot-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Models and floor plans are served next to the page
                file_path: "".to_string(),
                // Static hosting has no .meta files
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Picking plugins must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(DepotScenePlugin)
        .add_plugins(DataPlugin)
        .add_plugins(FloorPlanPlugin)
        .add_plugins(UiPlugin)
        .run();
}
