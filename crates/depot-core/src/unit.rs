//! Unit records and availability normalization

use serde::{Deserialize, Serialize};

/// Identifier of a rentable unit, e.g. `a1` or `c13`.
///
/// Always trimmed and lowercased so it matches the stem of the unit's model file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(String);

impl UnitId {
    /// Normalize a raw identifier. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let id = raw.trim().to_lowercase();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupancy of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Occupied,
    /// No data for the unit, or the source left the cell empty
    #[default]
    Unknown,
}

impl Availability {
    /// Normalize a spreadsheet cell.
    ///
    /// Recognized truthy/falsy spellings map to `Available`/`Occupied`, a blank
    /// cell is `Unknown`, and any other text counts as `Available`.
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        match value.as_str() {
            "" => Self::Unknown,
            "true" | "1" | "yes" | "available" => Self::Available,
            "false" | "0" | "no" | "occupied" | "unavailable" => Self::Occupied,
            _ => {
                tracing::debug!("Unrecognized availability {:?}, treating as available", raw);
                Self::Available
            }
        }
    }

    pub fn is_available(self) -> bool {
        self == Self::Available
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Available for Rent",
            Self::Occupied => "Currently Unavailable",
            Self::Unknown => "Availability Unknown",
        }
    }
}

/// Descriptive record for one rentable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: UnitId,
    pub size: String,
    pub availability: Availability,
    pub amenities: String,
    /// Floor plan image URL or asset path, when the source supplies one
    pub floor_plan: Option<String>,
}

/// Shown when a unit has no size on record
pub const SIZE_PLACEHOLDER: &str = "N/A";
/// Shown when a unit has no amenities on record
pub const AMENITIES_PLACEHOLDER: &str = "None listed";

impl UnitRecord {
    pub fn new(id: UnitId, size: &str, availability: Availability, amenities: &str) -> Self {
        Self {
            id,
            size: non_blank_or(size, SIZE_PLACEHOLDER),
            availability,
            amenities: non_blank_or(amenities, AMENITIES_PLACEHOLDER),
            floor_plan: None,
        }
    }

    pub fn with_floor_plan(mut self, floor_plan: Option<String>) -> Self {
        self.floor_plan = floor_plan.filter(|f| !f.trim().is_empty());
        self
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_normalizes() {
        let id = UnitId::new("  C13 ").unwrap();
        assert_eq!(id.as_str(), "c13");
        assert!(UnitId::new("   ").is_none());
    }

    #[test]
    fn test_availability_table() {
        for raw in ["TRUE", "true", "1", "yes", "Available", "available"] {
            assert_eq!(Availability::parse(raw), Availability::Available, "{raw}");
        }
        for raw in ["FALSE", "false", "0", "no", "Occupied", "unavailable"] {
            assert_eq!(Availability::parse(raw), Availability::Occupied, "{raw}");
        }
        for raw in ["maybe", "Reserved", "call office", "2"] {
            assert_eq!(Availability::parse(raw), Availability::Available, "{raw}");
        }
    }

    #[test]
    fn test_blank_availability_is_unknown() {
        assert_eq!(Availability::parse(""), Availability::Unknown);
        assert_eq!(Availability::parse("  "), Availability::Unknown);
    }

    #[test]
    fn test_record_placeholders() {
        let record = UnitRecord::new(UnitId::new("a1").unwrap(), "", Availability::Occupied, " ");
        assert_eq!(record.size, SIZE_PLACEHOLDER);
        assert_eq!(record.amenities, AMENITIES_PLACEHOLDER);
        assert!(record.floor_plan.is_none());
    }
}
