//! Unit record store with last-good-value semantics
//!
//! Each successful ingestion replaces the whole map at once. Failures and empty
//! results leave the previous map in place; readers that need something to show
//! go through [`UnitStore::effective`], which substitutes the fallback dataset
//! while the live map is empty.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::fallback::fallback_units;
use crate::ingest::{IngestError, IngestReport};
use crate::unit::{Availability, UnitId, UnitRecord};

pub type UnitMap = BTreeMap<UnitId, UnitRecord>;

/// Where the currently displayed records come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataStatus {
    /// No fetch has resolved yet
    #[default]
    Loading,
    /// Live records from the configured source
    Live { units: usize },
    /// The live source produced nothing usable; showing built-in data
    Fallback { reason: String },
}

/// Result of applying one ingestion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreUpdate {
    /// The map was replaced
    Replaced { units: usize },
    /// The previous map was kept
    Retained,
}

#[derive(Debug, Clone, Default)]
pub struct UnitStore {
    units: UnitMap,
    generation: u64,
    last_error: Option<String>,
}

impl UnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the outcome of an ingestion run
    pub fn apply(&mut self, result: Result<IngestReport, IngestError>) -> StoreUpdate {
        let report = match result {
            Ok(report) if !report.records.is_empty() => report,
            Ok(_) => return self.retain(IngestError::Empty),
            Err(e) => return self.retain(e),
        };

        let mut units = UnitMap::new();
        for record in report.records {
            if units.contains_key(&record.id) {
                tracing::debug!("Duplicate unit {}, keeping the later row", record.id);
            }
            units.insert(record.id.clone(), record);
        }

        let count = units.len();
        self.units = units;
        self.generation += 1;
        self.last_error = None;
        tracing::info!("Loaded {} units (generation {})", count, self.generation);
        StoreUpdate::Replaced { units: count }
    }

    fn retain(&mut self, error: IngestError) -> StoreUpdate {
        if self.units.is_empty() {
            tracing::warn!("Unit data unavailable ({}), using fallback data", error);
        } else {
            tracing::warn!(
                "Unit data refresh failed ({}), keeping {} previous units",
                error,
                self.units.len()
            );
        }
        self.last_error = Some(error.to_string());
        StoreUpdate::Retained
    }

    /// Live records only
    pub fn live(&self) -> &UnitMap {
        &self.units
    }

    /// Live records, or the fallback dataset while there are none
    pub fn effective(&self) -> Cow<'_, UnitMap> {
        if self.units.is_empty() {
            Cow::Owned(fallback_units())
        } else {
            Cow::Borrowed(&self.units)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Incremented on every successful replacement
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Status line for the UI; `Loading` until the first attempt resolves
    pub fn status(&self, attempted: bool) -> DataStatus {
        if !self.units.is_empty() {
            DataStatus::Live { units: self.units.len() }
        } else if !attempted {
            DataStatus::Loading
        } else {
            DataStatus::Fallback {
                reason: self
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "no data source configured".to_string()),
            }
        }
    }
}

/// Availability of `id` in `units`; a unit with no record is `Unknown`
pub fn availability_of(units: &UnitMap, id: &UnitId) -> Availability {
    units
        .get(id)
        .map(|record| record.availability)
        .unwrap_or(Availability::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, availability: Availability) -> UnitRecord {
        UnitRecord::new(UnitId::new(id).unwrap(), "100 sq ft", availability, "Basic")
    }

    fn report(records: Vec<UnitRecord>) -> Result<IngestReport, IngestError> {
        Ok(IngestReport { records, dropped: 0 })
    }

    #[test]
    fn test_replaces_atomically() {
        let mut store = UnitStore::new();
        store.apply(report(vec![record("a1", Availability::Available), record("a2", Availability::Occupied)]));
        let update = store.apply(report(vec![record("c1", Availability::Occupied)]));

        assert_eq!(update, StoreUpdate::Replaced { units: 1 });
        assert_eq!(store.live().len(), 1);
        assert!(store.live().contains_key(&UnitId::new("c1").unwrap()));
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_failure_keeps_previous_records() {
        let mut store = UnitStore::new();
        store.apply(report(vec![record("a1", Availability::Occupied)]));

        let update = store.apply(Err(IngestError::Network("connection refused".into())));
        assert_eq!(update, StoreUpdate::Retained);
        assert_eq!(store.live().len(), 1);
        assert_eq!(store.effective().len(), 1);
        assert!(store.last_error().unwrap().contains("connection refused"));
        assert_eq!(store.status(true), DataStatus::Live { units: 1 });
    }

    #[test]
    fn test_empty_result_keeps_previous_records() {
        let mut store = UnitStore::new();
        store.apply(report(vec![record("a1", Availability::Occupied)]));
        assert_eq!(store.apply(report(Vec::new())), StoreUpdate::Retained);
        assert_eq!(store.live().len(), 1);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_unreachable_source_without_history_uses_fallback() {
        let mut store = UnitStore::new();
        assert_eq!(store.status(false), DataStatus::Loading);

        store.apply(Err(IngestError::Http { status: 404, status_text: "Not Found".into() }));
        assert!(store.is_empty());

        let effective = store.effective();
        assert_eq!(effective.len(), 24);
        assert!(effective.values().all(|r| r.availability != Availability::Unknown));
        assert!(matches!(store.status(true), DataStatus::Fallback { .. }));
    }

    #[test]
    fn test_duplicate_ids_keep_later_row() {
        let mut store = UnitStore::new();
        store.apply(report(vec![record("a1", Availability::Available), record("A1", Availability::Occupied)]));
        let id = UnitId::new("a1").unwrap();
        assert_eq!(store.live().len(), 1);
        assert_eq!(availability_of(store.live(), &id), Availability::Occupied);
    }

    #[test]
    fn test_missing_unit_is_unknown() {
        let units = UnitMap::new();
        assert_eq!(availability_of(&units, &UnitId::new("z9").unwrap()), Availability::Unknown);
    }
}
