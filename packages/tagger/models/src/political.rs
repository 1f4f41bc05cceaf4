//! Typed political hierarchy: continents own countries, countries own
//! regions, regions own states.
//!
//! The tree is built by the political tagger from overlay rows; every
//! node carries its coverage figures relative to the footprint
//! (`pcover`) and to the entity's own area (`gcover`).

use serde::Serialize;

/// Geoname identifiers for the continent nodes, keyed by the
/// normalized continent name as stored in the reference table.
pub const CONTINENT_GEONAME_IDS: &[(&str, i64)] = &[
    ("Australia", 2_077_456),
    ("Africa", 6_255_146),
    ("Asia", 6_255_147),
    ("Europe", 6_255_148),
    ("NorthAmerica", 6_255_149),
    ("SouthAmerica", 6_255_150),
    ("Oceania", 6_255_151),
    ("Antartica", 6_255_152),
];

/// Looks up the geoname id for a normalized continent name.
#[must_use]
pub fn continent_geoname_id(normalized: &str) -> Option<i64> {
    CONTINENT_GEONAME_IDS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, id)| *id)
}

/// A populated place attached to a state when toponym computation is
/// requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateToponym {
    /// Place name.
    pub name: String,
    /// Longitude of the place.
    #[serde(rename = "geo:lon")]
    pub lon: f64,
    /// Latitude of the place.
    #[serde(rename = "geo:lat")]
    pub lat: f64,
    /// Geonames feature code (e.g. `PPLC` for a capital).
    pub fcode: String,
    /// Population count.
    pub population: i64,
}

/// Admin-1 unit (state/province) node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    /// State name.
    pub name: String,
    /// Synthesized id (`state:<normalized>:<geonameid>`).
    pub id: String,
    /// Percent of the footprint covered by this state.
    pub pcover: f64,
    /// Percent of the state covered by the footprint.
    pub gcover: f64,
    /// Populated places inside the intersected part of the state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toponyms: Option<Vec<StateToponym>>,
}

/// Region node. Rows without a distinct region id are collected in a
/// single anonymous bucket (no name/id/cover fields).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// Region name, absent for the anonymous bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Synthesized id (`region:<normalized>:<geonameid>`), absent for
    /// the anonymous bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Percent of the footprint covered by this region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pcover: Option<f64>,
    /// Percent of the region covered by the footprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcover: Option<f64>,
    /// States attached under this region.
    pub states: Vec<State>,
}

impl Region {
    /// Creates the anonymous bucket for rows without a region id.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            name: None,
            id: None,
            pcover: None,
            gcover: None,
            states: Vec::new(),
        }
    }
}

/// Country node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    /// Country name as stored in the reference table.
    pub name: String,
    /// Synthesized id (`country:<normalized>:<geonameid>`).
    pub id: String,
    /// Percent of the footprint covered by this country.
    pub pcover: f64,
    /// Percent of the country covered by the footprint.
    pub gcover: f64,
    /// Regions attached under this country, absent until a state row
    /// matches it.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<Region>,
}

/// Continent node. Created lazily on the first matching country, in
/// overlay query order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Continent {
    /// Continent name.
    pub name: String,
    /// Synthesized id (`continent:<normalized>:<geonameid>`).
    pub id: String,
    /// Countries attached under this continent.
    pub countries: Vec<Country>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continent_ids_complete() {
        assert_eq!(CONTINENT_GEONAME_IDS.len(), 8);
        assert_eq!(continent_geoname_id("Europe"), Some(6_255_148));
        assert_eq!(continent_geoname_id("Atlantis"), None);
    }

    #[test]
    fn anonymous_region_serializes_states_only() {
        let region = Region::anonymous();
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert!(json.get("states").is_some());
    }

    #[test]
    fn country_without_regions_omits_key() {
        let country = Country {
            name: "France".to_string(),
            id: "country:France:3017382".to_string(),
            pcover: 32.9,
            gcover: 0.18,
            regions: Vec::new(),
        };
        let json = serde_json::to_value(&country).unwrap();
        assert!(json.get("regions").is_none());
    }
}
