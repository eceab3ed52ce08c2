use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::distance::Coordinates;

// ---------------------------------------------------------------------------
// Status – operational state of a property
// ---------------------------------------------------------------------------

/// Operational status. Empty or missing status cells load as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Active,
    Inactive,
    Unknown,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Inactive, Status::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Unknown => "Unknown",
        }
    }

    /// Parse a raw status cell. Returns `None` for values outside the
    /// vocabulary so the caller can decide how loudly to complain.
    pub fn parse(raw: Option<&str>) -> Option<Status> {
        let Some(s) = raw.map(str::trim) else {
            return Some(Status::Unknown);
        };
        match s.to_ascii_lowercase().as_str() {
            "" | "unknown" => Some(Status::Unknown),
            "active" => Some(Status::Active),
            "inactive" => Some(Status::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Property – one row of the source table
// ---------------------------------------------------------------------------

/// A single mining property (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Display name, used as the selection identifier.
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub province: String,
    pub district: String,
    pub primary_commodity: String,
    pub commodity_2: Option<String>,
    pub commodity_3: Option<String>,
    pub status: Status,
    /// Straight-line distance from the base location, kilometres.
    pub distance_from_base_km: f64,
    /// Estimated travel time from the base location, hours.
    pub travel_time_hours: f64,
    pub town: Option<String>,
    pub reserves: Option<String>,
    pub geology_classification: Option<String>,
    pub geology_description: Option<String>,
    /// Coordinates were marked as questionable in the source, or fall outside
    /// the configured region.
    pub coordinates_questionable: bool,
}

impl Property {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Primary commodity followed by any secondary commodities, in column order.
    pub fn commodities(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_commodity.as_str())
            .chain(self.commodity_2.as_deref())
            .chain(self.commodity_3.as_deref())
    }

    /// Whether `commodity` appears in any of the three commodity slots.
    pub fn has_commodity(&self, commodity: &str) -> bool {
        self.commodities().any(|c| c == commodity)
    }
}

// ---------------------------------------------------------------------------
// Universe – the categories present in the unfiltered dataset
// ---------------------------------------------------------------------------

/// Category vocabularies of the full dataset, used to populate filter widgets
/// and to validate filter values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    pub provinces: BTreeSet<String>,
    /// Province → districts that occur within it.
    pub districts: BTreeMap<String, BTreeSet<String>>,
    /// Every commodity named in any commodity slot.
    pub commodities: BTreeSet<String>,
    /// Largest `distance_from_base_km` in the dataset (0 when empty).
    pub max_distance_km: f64,
}

impl Universe {
    pub fn from_properties(properties: &[Property]) -> Self {
        let mut universe = Universe::default();
        for p in properties {
            universe.provinces.insert(p.province.clone());
            universe
                .districts
                .entry(p.province.clone())
                .or_default()
                .insert(p.district.clone());
            for c in p.commodities() {
                universe.commodities.insert(c.to_string());
            }
            universe.max_distance_km = universe.max_distance_km.max(p.distance_from_base_km);
        }
        universe
    }

    /// Districts belonging to `province` (empty when the province is unknown).
    pub fn districts_of(&self, province: &str) -> impl Iterator<Item = &String> {
        self.districts.get(province).into_iter().flatten()
    }

    pub fn district_in_province(&self, province: &str, district: &str) -> bool {
        self.districts
            .get(province)
            .is_some_and(|ds| ds.contains(district))
    }
}

// ---------------------------------------------------------------------------
// PropertyDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with its pre-computed universe.
#[derive(Debug, Clone)]
pub struct PropertyDataset {
    /// All properties in source order.
    pub properties: Vec<Property>,
    pub universe: Universe,
}

impl PropertyDataset {
    pub fn from_properties(properties: Vec<Property>) -> Self {
        let universe = Universe::from_properties(&properties);
        PropertyDataset {
            properties,
            universe,
        }
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn questionable_count(&self) -> usize {
        self.properties
            .iter()
            .filter(|p| p.coordinates_questionable)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn status_parsing_normalises_missing_values() {
        assert_eq!(Status::parse(None), Some(Status::Unknown));
        assert_eq!(Status::parse(Some("")), Some(Status::Unknown));
        assert_eq!(Status::parse(Some("  active ")), Some(Status::Active));
        assert_eq!(Status::parse(Some("Inactive")), Some(Status::Inactive));
        assert_eq!(Status::parse(Some("Dormant")), None);
    }

    #[test]
    fn commodities_skip_missing_secondaries() {
        let mut p = fixtures::property("Kansanshi", "North-Western Province", "Solwezi");
        p.primary_commodity = "Copper".into();
        p.commodity_2 = None;
        p.commodity_3 = Some("Gold".into());
        assert_eq!(p.commodities().collect::<Vec<_>>(), vec!["Copper", "Gold"]);
        assert!(p.has_commodity("Gold"));
        assert!(!p.has_commodity("Cobalt"));
    }

    #[test]
    fn universe_tracks_categories() {
        let ds = fixtures::reference_dataset();
        assert_eq!(ds.len(), 239);
        assert_eq!(ds.universe.provinces.len(), 10);
        assert!(ds
            .universe
            .district_in_province("Copperbelt Province", "Chingola"));
        assert!(!ds
            .universe
            .district_in_province("Lusaka Province", "Chingola"));
        let max = ds
            .properties
            .iter()
            .map(|p| p.distance_from_base_km)
            .fold(0.0, f64::max);
        assert_eq!(ds.universe.max_distance_km, max);
    }
}
