//! Viewer configuration loading and validation

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub data: DataSource,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub floor_plans: FloorPlanConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

/// Where unit records come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DataSource {
    /// Published CSV export
    Csv { url: String },
    /// Sheets values API
    Sheets {
        api_key: String,
        spreadsheet_id: String,
        #[serde(default = "default_sheet_range")]
        range: String,
    },
    /// Built-in dataset only
    #[default]
    Static,
}

/// Range read when none is configured
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A:E";

fn default_sheet_range() -> String {
    DEFAULT_SHEET_RANGE.to_string()
}

impl DataSource {
    /// Request URL for the configured source
    pub fn url(&self) -> Option<String> {
        match self {
            Self::Csv { url } => Some(url.clone()),
            Self::Sheets {
                api_key,
                spreadsheet_id,
                range,
            } => Some(format!(
                "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}?key={}",
                urlencoding::encode(spreadsheet_id),
                urlencoding::encode(range),
                urlencoding::encode(api_key)
            )),
            Self::Static => None,
        }
    }
}

/// Load-time paint for a class of meshes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    /// sRGB hex, e.g. `#4682b4`
    pub color: HexColor,
    pub metallic: f32,
    pub roughness: f32,
}

/// sRGB color written as `#rrggbb` in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub [u8; 3]);

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #rrggbb, got {:?}", value));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("{:?}: {}", value, e))
        };
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        let [r, g, b] = color.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory (relative to the asset root) holding the model files
    #[serde(default = "default_assets_base")]
    pub base_path: String,
    /// Model files to load, in order
    #[serde(default = "default_asset_files")]
    pub files: Vec<String>,
    /// File name -> unit id, for files that do not follow the naming rule
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
    /// Files whose authored materials are kept as-is
    #[serde(default = "default_keep_materials")]
    pub keep_materials: Vec<String>,
    /// Paint unit and bridge meshes at load time
    #[serde(default = "default_true")]
    pub paint: bool,
    #[serde(default = "default_unit_paint")]
    pub unit_paint: Paint,
    #[serde(default = "default_bridge_paint")]
    pub bridge_paint: Paint,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_path: default_assets_base(),
            files: default_asset_files(),
            aliases: default_aliases(),
            keep_materials: default_keep_materials(),
            paint: true,
            unit_paint: default_unit_paint(),
            bridge_paint: default_bridge_paint(),
        }
    }
}

fn default_assets_base() -> String {
    "models".to_string()
}

fn default_asset_files() -> Vec<String> {
    let mut files = vec!["warehouse.glb".to_string()];
    files.extend((1..=6).map(|n| format!("a{n}.glb")));
    files.push("b1.glb".to_string());
    files.extend((1..=13).map(|n| format!("c{n}.glb")));
    files.extend((1..=3).map(|n| format!("e{n}.glb")));
    files.extend(
        ["a bridge.glb", "b bridge.glb", "c bridge 1.glb", "c bridge 2.glb", "update 2.glb"]
            .into_iter()
            .map(str::to_string),
    );
    files
}

fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("update 2.glb".to_string(), "b2".to_string())])
}

fn default_keep_materials() -> Vec<String> {
    vec!["update 2.glb".to_string()]
}

fn default_unit_paint() -> Paint {
    Paint {
        color: HexColor([0x46, 0x82, 0xb4]),
        metallic: 0.1,
        roughness: 0.7,
    }
}

fn default_bridge_paint() -> Paint {
    Paint {
        color: HexColor([0x88, 0x88, 0x88]),
        metallic: 0.2,
        roughness: 0.8,
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorPlanConfig {
    /// Directory (relative to the asset root) holding floor plan images
    #[serde(default = "default_floor_plan_base")]
    pub base_path: String,
    #[serde(default = "default_floor_plan_ext")]
    pub extension: String,
    /// Unit id -> image file name, for units not following `{id}.{ext}`
    #[serde(default = "default_floor_plan_overrides")]
    pub overrides: BTreeMap<String, String>,
}

impl Default for FloorPlanConfig {
    fn default() -> Self {
        Self {
            base_path: default_floor_plan_base(),
            extension: default_floor_plan_ext(),
            overrides: default_floor_plan_overrides(),
        }
    }
}

impl FloorPlanConfig {
    /// Conventional image path for `unit`
    pub fn path_for(&self, unit: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        let file = match self.overrides.get(unit) {
            Some(file) => file.clone(),
            None => format!("{}.{}", unit, self.extension),
        };
        if base.is_empty() {
            file
        } else {
            format!("{}/{}", base, file)
        }
    }
}

fn default_floor_plan_base() -> String {
    "floorplans".to_string()
}

fn default_floor_plan_ext() -> String {
    "png".to_string()
}

fn default_floor_plan_overrides() -> BTreeMap<String, String> {
    BTreeMap::from([("b2".to_string(), "f280.png".to_string())])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Distance on startup and after clearing the selection
    #[serde(default = "default_home_distance")]
    pub home_distance: f32,
    /// Distance when framing a selected unit
    #[serde(default = "default_focus_distance")]
    pub focus_distance: f32,
    /// Default look-at point
    #[serde(default)]
    pub home_focus: [f32; 3],
    /// Smoothing rate; higher settles faster
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    /// Maximum focus travel in world units per second
    #[serde(default = "default_max_pan_speed")]
    pub max_pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            home_distance: default_home_distance(),
            focus_distance: default_focus_distance(),
            home_focus: [0.0; 3],
            smoothing: default_smoothing(),
            max_pan_speed: default_max_pan_speed(),
        }
    }
}

fn default_min_distance() -> f32 {
    5.0
}

fn default_max_distance() -> f32 {
    20.0
}

fn default_home_distance() -> f32 {
    15.0
}

fn default_focus_distance() -> f32 {
    8.0
}

fn default_smoothing() -> f32 {
    0.08
}

fn default_max_pan_speed() -> f32 {
    25.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Highlight transition time in seconds
    #[serde(default = "default_duration")]
    pub duration_secs: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
        }
    }
}

fn default_duration() -> f32 {
    0.75
}

impl ViewerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.data {
            DataSource::Csv { url } if url.trim().is_empty() => {
                return Err(ConfigError::Invalid("data.url is empty".into()));
            }
            DataSource::Sheets {
                api_key,
                spreadsheet_id,
                ..
            } if api_key.trim().is_empty() || spreadsheet_id.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "data.api_key and data.spreadsheet_id are required".into(),
                ));
            }
            _ => {}
        }

        let camera = &self.camera;
        if !(camera.min_distance > 0.0 && camera.min_distance <= camera.max_distance) {
            return Err(ConfigError::Invalid(format!(
                "camera distance range {}..{} is invalid",
                camera.min_distance, camera.max_distance
            )));
        }
        if !(self.animation.duration_secs > 0.0) {
            return Err(ConfigError::Invalid(
                "animation.duration_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config.data, DataSource::Static);
        assert_eq!(config.assets.files.len(), 29);
        assert_eq!(config.assets.aliases.get("update 2.glb").map(String::as_str), Some("b2"));
        assert_eq!(config.assets.unit_paint.color, HexColor([0x46, 0x82, 0xb4]));
        assert_eq!(config.camera.min_distance, 5.0);
        assert_eq!(config.camera.max_distance, 20.0);
        assert_eq!(config.animation.duration_secs, 0.75);
    }

    #[test]
    fn test_csv_source() {
        let config = ViewerConfig::from_toml_str(
            r##"
            [data]
            source = "csv"
            url = "https://example.com/units.csv"

            [assets]
            files = ["a1.glb"]
            unit_paint = { color = "#112233", metallic = 0.5, roughness = 0.5 }
            "##,
        )
        .unwrap();
        assert_eq!(config.data.url().as_deref(), Some("https://example.com/units.csv"));
        assert_eq!(config.assets.files, vec!["a1.glb"]);
        assert_eq!(config.assets.unit_paint.color, HexColor([0x11, 0x22, 0x33]));
    }

    #[test]
    fn test_sheets_url() {
        let source = DataSource::Sheets {
            api_key: "KEY".into(),
            spreadsheet_id: "SHEET".into(),
            range: default_sheet_range(),
        };
        assert_eq!(
            source.url().unwrap(),
            "https://sheets.googleapis.com/v4/spreadsheets/SHEET/values/Sheet1%21A%3AE?key=KEY"
        );

        let odd_name = DataSource::Sheets {
            api_key: "KEY".into(),
            spreadsheet_id: "SHEET".into(),
            range: "Units #2?!A:E".into(),
        };
        let url = odd_name.url().unwrap();
        assert!(url.ends_with("/values/Units%20%232%3F%21A%3AE?key=KEY"));
        assert_eq!(url.matches('?').count(), 1);
        assert!(!url.contains('#'));
    }

    #[test]
    fn test_validation() {
        let empty_url = "[data]\nsource = \"csv\"\nurl = \"  \"\n";
        assert!(matches!(
            ViewerConfig::from_toml_str(empty_url),
            Err(ConfigError::Invalid(_))
        ));

        let inverted = "[camera]\nmin_distance = 30.0\nmax_distance = 10.0\n";
        assert!(matches!(
            ViewerConfig::from_toml_str(inverted),
            Err(ConfigError::Invalid(_))
        ));

        let frozen = "[animation]\nduration_secs = 0.0\n";
        assert!(matches!(
            ViewerConfig::from_toml_str(frozen),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            ViewerConfig::from_toml_str("[camera\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_bad_hex_color_is_rejected() {
        let text = "[assets.bridge_paint]\ncolor = \"grey\"\nmetallic = 0.2\nroughness = 0.8\n";
        assert!(ViewerConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_floor_plan_paths() {
        let plans = FloorPlanConfig::default();
        assert_eq!(plans.path_for("a1"), "floorplans/a1.png");
        assert_eq!(plans.path_for("b2"), "floorplans/f280.png");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[animation]\nduration_secs = 1.5").unwrap();
        let config = ViewerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.animation.duration_secs, 1.5);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            ViewerConfig::from_file(&missing),
            Err(ConfigError::Io(_))
        ));
    }
}
