//! Tabular ingestion of unit records
//!
//! Spreadsheets in the wild use whatever header names the owner typed, so each
//! field is resolved through an ordered list of header aliases. The first alias
//! whose cell is non-empty wins. Two sources are supported:
//! - a public CSV export (header row required)
//! - the Sheets values API (first row is headers; when no identifier header is
//!   recognized the columns are read positionally)

use serde::Deserialize;
use thiserror::Error;

use crate::unit::{Availability, UnitId, UnitRecord};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("No unit rows found")]
    Empty,
}

/// Header aliases for the unit identifier, in priority order
pub const ID_HEADERS: &[&str] = &["Product", "Unit Name", "Building ID", "Building", "Unit", "Name"];
pub const SIZE_HEADERS: &[&str] = &["Size", "Square Feet", "Sq Ft"];
pub const AVAILABILITY_HEADERS: &[&str] = &["Availability", "Status", "Available"];
pub const AMENITIES_HEADERS: &[&str] = &["Amenities", "Features", "Package"];
pub const FLOOR_PLAN_HEADERS: &[&str] = &["Floor Plan", "Floorplan", "Floor Plan URL", "Image"];

/// Outcome of ingesting one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub records: Vec<UnitRecord>,
    /// Rows skipped because no identifier could be resolved
    pub dropped: usize,
}

/// Column indices for each field, each list in alias priority order
#[derive(Debug, Clone, Default)]
struct ColumnMap {
    id: Vec<usize>,
    size: Vec<usize>,
    availability: Vec<usize>,
    amenities: Vec<usize>,
    floor_plan: Vec<usize>,
}

impl ColumnMap {
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let lookup = |aliases: &[&str]| -> Vec<usize> {
            aliases
                .iter()
                .filter_map(|alias| {
                    let alias = alias.to_lowercase();
                    normalized.iter().position(|h| *h == alias)
                })
                .collect()
        };

        Self {
            id: lookup(ID_HEADERS),
            size: lookup(SIZE_HEADERS),
            availability: lookup(AVAILABILITY_HEADERS),
            amenities: lookup(AMENITIES_HEADERS),
            floor_plan: lookup(FLOOR_PLAN_HEADERS),
        }
    }

    /// Fixed `[UnitName, Size, Availability, Amenities]` layout
    fn positional() -> Self {
        Self {
            id: vec![0],
            size: vec![1],
            availability: vec![2],
            amenities: vec![3],
            floor_plan: Vec::new(),
        }
    }

    fn resolve_row<S: AsRef<str>>(&self, row: &[S]) -> Option<UnitRecord> {
        let id = UnitId::new(pick(row, &self.id)?)?;
        let availability = pick(row, &self.availability)
            .map(Availability::parse)
            .unwrap_or(Availability::Unknown);
        let record = UnitRecord::new(
            id,
            pick(row, &self.size).unwrap_or_default(),
            availability,
            pick(row, &self.amenities).unwrap_or_default(),
        )
        .with_floor_plan(pick(row, &self.floor_plan).map(str::to_string));
        Some(record)
    }
}

/// First non-empty cell among `columns`
fn pick<'a, S: AsRef<str>>(row: &'a [S], columns: &[usize]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|&i| row.get(i))
        .map(|cell| cell.as_ref().trim())
        .find(|cell| !cell.is_empty())
}

fn collect_rows(columns: &ColumnMap, rows: &[Vec<String>]) -> IngestReport {
    let mut report = IngestReport::default();
    for (index, row) in rows.iter().enumerate() {
        match columns.resolve_row(row) {
            Some(record) => {
                tracing::debug!("Mapped unit: {} -> {:?}", record.id, record.availability);
                report.records.push(record);
            }
            None => {
                tracing::warn!("Dropping row {}: no unit identifier", index + 1);
                report.dropped += 1;
            }
        }
    }
    report
}

/// Parse a CSV export with a header row
pub fn parse_csv(text: &str) -> Result<IngestReport, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = ColumnMap::from_headers(&headers);
    if columns.id.is_empty() {
        tracing::warn!("CSV has no recognizable unit column in headers {:?}", headers);
    }

    let mut rows = Vec::new();
    let mut unreadable = 0;
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect::<Vec<_>>()),
            Err(e) => {
                tracing::warn!("Skipping malformed CSV row: {}", e);
                unreadable += 1;
            }
        }
    }

    let mut report = collect_rows(&columns, &rows);
    report.dropped += unreadable;
    tracing::info!(
        "Parsed {} units from CSV ({} rows dropped)",
        report.records.len(),
        report.dropped
    );
    Ok(report)
}

/// Body of a Sheets `values.get` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetValues {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl SheetValues {
    /// Cells as display strings; numbers and booleans keep their JSON spelling
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Ingest a rectangular range whose first row holds the headers
pub fn parse_sheet_rows(rows: &[Vec<String>]) -> Result<IngestReport, IngestError> {
    let Some((headers, data)) = rows.split_first() else {
        return Err(IngestError::Empty);
    };
    if data.is_empty() {
        return Err(IngestError::Empty);
    }

    let mut columns = ColumnMap::from_headers(headers);
    if columns.id.is_empty() {
        tracing::info!("No known headers in sheet, reading columns positionally");
        columns = ColumnMap::positional();
    }

    let report = collect_rows(&columns, data);
    tracing::info!(
        "Parsed {} units from sheet ({} rows dropped)",
        report.records.len(),
        report.dropped
    );
    Ok(report)
}

/// Ingest the raw JSON body of a Sheets `values.get` call
pub fn parse_sheet_json(body: &str) -> Result<IngestReport, IngestError> {
    let values: SheetValues = serde_json::from_str(body)?;
    parse_sheet_rows(&values.rows())
}
