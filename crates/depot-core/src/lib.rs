//! Depot Core - Unit records, ingestion, and the interaction model
//!
//! This crate holds everything in the viewer that does not need the engine:
//! - Unit records and availability normalization
//! - CSV and Sheets ingestion with header aliasing
//! - The last-good-value unit store and its fallback dataset
//! - Asset classification and the identity-tagged asset registry
//! - Hover/selection reducer, highlight targets and the transition animator
//! - Catalog filtering/sorting and detail resolution
//! - Viewer configuration

pub mod asset;
pub mod catalog;
pub mod config;
pub mod fallback;
pub mod highlight;
pub mod ingest;
pub mod interaction;
pub mod store;
pub mod unit;

pub use asset::{classify, AssetKind, AssetRegistry, AssetSpec, BaselineSet, RegisteredAsset};
pub use catalog::{catalog_rows, AvailabilityFilter, SortOrder, UnitDetails};
pub use config::{ConfigError, DataSource, FloorPlanConfig, ViewerConfig};
pub use fallback::fallback_units;
pub use highlight::{highlight_target, HighlightAnimator, SurfaceBaseline, Tint, VisualParams};
pub use ingest::{parse_csv, parse_sheet_json, IngestError, IngestReport};
pub use interaction::{pointer_event, InteractionEvent, InteractionState, PointerAction};
pub use store::{availability_of, DataStatus, StoreUpdate, UnitMap, UnitStore};
pub use unit::{Availability, UnitId, UnitRecord};
