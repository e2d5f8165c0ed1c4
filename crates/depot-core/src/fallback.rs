//! Built-in dataset used while the live source is empty or unreachable

use std::collections::BTreeMap;

use crate::unit::{Availability, UnitId, UnitRecord};

/// (id, size, available, amenities)
const FALLBACK_UNITS: &[(&str, &str, bool, &str)] = &[
    ("a1", "600 sq ft", true, "Roll-up door, Power"),
    ("a2", "600 sq ft", false, "Roll-up door, Power"),
    ("a3", "600 sq ft", true, "Roll-up door, Power"),
    ("a4", "750 sq ft", false, "Roll-up door, Power, Lighting"),
    ("a5", "750 sq ft", true, "Roll-up door, Power, Lighting"),
    ("a6", "900 sq ft", true, "Roll-up door, Power, Lighting"),
    ("b1", "1,200 sq ft", false, "Loading dock, Power"),
    ("b2", "2,800 sq ft", true, "Loading dock, Office, Restroom"),
    ("c1", "400 sq ft", true, "Basic"),
    ("c2", "400 sq ft", false, "Basic"),
    ("c3", "400 sq ft", true, "Basic"),
    ("c4", "400 sq ft", true, "Basic"),
    ("c5", "500 sq ft", false, "Basic, Power"),
    ("c6", "500 sq ft", true, "Basic, Power"),
    ("c7", "500 sq ft", false, "Basic, Power"),
    ("c8", "500 sq ft", true, "Basic, Power"),
    ("c9", "650 sq ft", true, "Power, Climate control"),
    ("c10", "650 sq ft", false, "Power, Climate control"),
    ("c11", "650 sq ft", true, "Power, Climate control"),
    ("c12", "800 sq ft", false, "Power, Climate control"),
    ("c13", "1,000 sq ft", true, "Power, Climate control, Office"),
    ("e1", "1,500 sq ft", true, "Loading dock, Power, Water"),
    ("e2", "1,500 sq ft", false, "Loading dock, Power, Water"),
    ("e3", "2,000 sq ft", true, "Loading dock, Power, Water, Office"),
];

/// The fallback records keyed by id
pub fn fallback_units() -> BTreeMap<UnitId, UnitRecord> {
    FALLBACK_UNITS
        .iter()
        .filter_map(|&(id, size, available, amenities)| {
            let id = UnitId::new(id)?;
            let availability = if available {
                Availability::Available
            } else {
                Availability::Occupied
            };
            Some((id.clone(), UnitRecord::new(id, size, availability, amenities)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_covers_expected_units() {
        let units = fallback_units();
        assert_eq!(units.len(), 24);

        let mut expected: Vec<String> = Vec::new();
        expected.extend((1..=6).map(|n| format!("a{n}")));
        expected.extend(["b1".to_string(), "b2".to_string()]);
        expected.extend((1..=13).map(|n| format!("c{n}")));
        expected.extend((1..=3).map(|n| format!("e{n}")));

        for id in expected {
            let record = units
                .get(&UnitId::new(&id).unwrap())
                .unwrap_or_else(|| panic!("missing {id}"));
            assert_ne!(record.availability, Availability::Unknown, "{id}");
        }
    }
}
