//! Unit listing, filtering and detail resolution

use std::cmp::Ordering;

use crate::config::FloorPlanConfig;
use crate::store::UnitMap;
use crate::unit::{Availability, UnitId, UnitRecord, AMENITIES_PLACEHOLDER, SIZE_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityFilter {
    #[default]
    All,
    Available,
    /// Occupied units and units without availability data
    Occupied,
}

impl AvailabilityFilter {
    pub const ALL: [AvailabilityFilter; 3] = [Self::All, Self::Available, Self::Occupied];

    pub fn matches(self, availability: Availability) -> bool {
        match self {
            Self::All => true,
            Self::Available => availability.is_available(),
            Self::Occupied => !availability.is_available(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All units",
            Self::Available => "Available",
            Self::Occupied => "Occupied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Name,
    SizeAsc,
    SizeDesc,
    /// Available first, then by name
    Availability,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [Self::Name, Self::SizeAsc, Self::SizeDesc, Self::Availability];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::SizeAsc => "Size (small first)",
            Self::SizeDesc => "Size (large first)",
            Self::Availability => "Availability",
        }
    }
}

/// Numeric size from display text: the first run of digits and commas.
/// `"1,200 sq ft"` is 1200; text without digits is 0.
pub fn parse_size(text: &str) -> u32 {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Order ids so that `c2` sorts before `c10`
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let split = |s: &str| {
        let pos = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (prefix, number) = s.split_at(pos);
        (prefix.to_string(), number.parse::<u64>().ok())
    };
    let (pa, na) = split(a);
    let (pb, nb) = split(b);
    pa.cmp(&pb).then(na.cmp(&nb)).then_with(|| a.cmp(b))
}

/// Records passing `filter`, ordered by `sort`
pub fn catalog_rows(units: &UnitMap, filter: AvailabilityFilter, sort: SortOrder) -> Vec<&UnitRecord> {
    let mut rows: Vec<&UnitRecord> = units
        .values()
        .filter(|r| filter.matches(r.availability))
        .collect();

    let by_name = |a: &&UnitRecord, b: &&UnitRecord| natural_cmp(a.id.as_str(), b.id.as_str());
    match sort {
        SortOrder::Name => rows.sort_by(by_name),
        SortOrder::SizeAsc => {
            rows.sort_by(|a, b| parse_size(&a.size).cmp(&parse_size(&b.size)).then_with(|| by_name(a, b)))
        }
        SortOrder::SizeDesc => {
            rows.sort_by(|a, b| parse_size(&b.size).cmp(&parse_size(&a.size)).then_with(|| by_name(a, b)))
        }
        SortOrder::Availability => rows.sort_by(|a, b| {
            b.availability
                .is_available()
                .cmp(&a.availability.is_available())
                .then_with(|| by_name(a, b))
        }),
    }
    rows
}

/// Everything the detail panel shows for one unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDetails {
    pub id: UnitId,
    pub title: String,
    pub size: String,
    pub amenities: String,
    pub availability: Availability,
    /// Image path or URL to try; a placeholder is shown if it fails to load
    pub floor_plan: String,
}

impl UnitDetails {
    /// Details for `id`; a unit without a record gets placeholder values
    pub fn resolve(id: &UnitId, units: &UnitMap, floor_plans: &FloorPlanConfig) -> Self {
        let record = units.get(id);
        Self {
            id: id.clone(),
            title: format!("Unit {}", id.as_str().to_uppercase()),
            size: record
                .map(|r| r.size.clone())
                .unwrap_or_else(|| SIZE_PLACEHOLDER.to_string()),
            amenities: record
                .map(|r| r.amenities.clone())
                .unwrap_or_else(|| AMENITIES_PLACEHOLDER.to_string()),
            availability: record.map(|r| r.availability).unwrap_or(Availability::Unknown),
            floor_plan: record
                .and_then(|r| r.floor_plan.clone())
                .unwrap_or_else(|| floor_plans.path_for(id.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_units;

    fn ids(rows: &[&UnitRecord]) -> Vec<String> {
        rows.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1,200 sq ft"), 1200);
        assert_eq!(parse_size("approx. 650"), 650);
        assert_eq!(parse_size("N/A"), 0);
        assert_eq!(parse_size("900 sq ft (2 doors)"), 900);
    }

    #[test]
    fn test_natural_order() {
        let mut ids = vec!["c10", "c2", "a1", "c1", "b2"];
        ids.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(ids, vec!["a1", "b2", "c1", "c2", "c10"]);
    }

    #[test]
    fn test_filter_and_sort() {
        let units = fallback_units();

        let available = catalog_rows(&units, AvailabilityFilter::Available, SortOrder::Name);
        assert!(available.iter().all(|r| r.availability == Availability::Available));
        assert_eq!(ids(&available)[..3], ["a1", "a3", "a5"]);

        let occupied = catalog_rows(&units, AvailabilityFilter::Occupied, SortOrder::Name);
        assert_eq!(available.len() + occupied.len(), units.len());

        let largest = catalog_rows(&units, AvailabilityFilter::All, SortOrder::SizeDesc);
        assert_eq!(largest[0].id.as_str(), "b2");
        let smallest = catalog_rows(&units, AvailabilityFilter::All, SortOrder::SizeAsc);
        assert_eq!(smallest[0].id.as_str(), "c1");

        let by_availability = catalog_rows(&units, AvailabilityFilter::All, SortOrder::Availability);
        let first_occupied = by_availability
            .iter()
            .position(|r| !r.availability.is_available())
            .unwrap();
        assert!(by_availability[first_occupied..]
            .iter()
            .all(|r| !r.availability.is_available()));
    }

    #[test]
    fn test_unknown_counts_as_occupied_in_filter() {
        assert!(AvailabilityFilter::Occupied.matches(Availability::Unknown));
        assert!(!AvailabilityFilter::Available.matches(Availability::Unknown));
    }

    #[test]
    fn test_details_for_unit_without_record() {
        let units = UnitMap::new();
        let id = UnitId::new("z7").unwrap();
        let details = UnitDetails::resolve(&id, &units, &FloorPlanConfig::default());
        assert_eq!(details.title, "Unit Z7");
        assert_eq!(details.size, "N/A");
        assert_eq!(details.amenities, "None listed");
        assert_eq!(details.availability, Availability::Unknown);
        assert_eq!(details.floor_plan, "floorplans/z7.png");
    }

    #[test]
    fn test_details_prefer_record_floor_plan() {
        let mut units = fallback_units();
        let id = UnitId::new("b2").unwrap();
        let plans = FloorPlanConfig::default();
        assert_eq!(UnitDetails::resolve(&id, &units, &plans).floor_plan, "floorplans/f280.png");

        if let Some(record) = units.get_mut(&id) {
            record.floor_plan = Some("https://example.com/b2.jpg".into());
        }
        let details = UnitDetails::resolve(&id, &units, &plans);
        assert_eq!(details.floor_plan, "https://example.com/b2.jpg");
        assert_eq!(details.size, "2,800 sq ft");
    }
}
