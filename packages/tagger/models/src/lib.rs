#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data types shared across the geotag tagging engine.
//!
//! This crate defines the request/response envelope, per-tagger option
//! records, the typed political hierarchy, the land-cover taxonomy and
//! the static country/continent lookup tables. No database or HTTP
//! concerns live here.

pub mod countries;
pub mod landcover;
pub mod political;
pub mod toponyms;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Separator used when synthesizing tag identifiers
/// (e.g. `country:france:3017382`).
pub const TAG_SEPARATOR: char = ':';

/// Provenance record for a reference dataset consumed by a tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Dataset name (e.g. "Admin level 0 - Countries").
    pub dataset: &'static str,
    /// Dataset author or publisher.
    pub author: &'static str,
    /// License terms.
    pub license: &'static str,
    /// Canonical download or documentation URL.
    pub url: &'static str,
}

/// Toponym computation mode for the political tagger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToponymsMode {
    /// Only capitals and admin-1 capitals.
    Main,
    /// All populated place classes (honored below the area limit only).
    All,
}

/// Per-tagger option record.
///
/// Unrecognized keys in the incoming JSON are ignored; missing keys
/// take the defaults below. `hierarchical` and `ordered` are legacy
/// output-shape toggles that are accepted but have no effect.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaggerOptions {
    /// Skip heavy computation when the footprint exceeds this area (km²).
    pub area_limit: Option<f64>,
    /// Database schema override for table-driven taggers.
    pub schema: Option<String>,
    /// Whether overlay queries should compute intersection areas.
    pub compute_area: bool,
    /// Toponym attachment mode for the political tagger.
    pub toponyms: Option<ToponymsMode>,
    /// Restrict the political tagger to countries (no regions/states).
    pub limit_to_countries: bool,
    /// Restrict the political tagger to continents only.
    pub limit_to_continents: bool,
    /// Legacy output shape toggle, ignored.
    pub hierarchical: bool,
    /// Legacy output shape toggle, ignored.
    pub ordered: bool,
}

/// A single requested tagger: its name plus options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaggerSpec {
    /// Tagger name, matched case-insensitively after trimming.
    pub name: String,
    /// Options for this tagger.
    #[serde(default)]
    pub options: TaggerOptions,
}

/// A tagging request as consumed by the engine.
///
/// The footprint is normalized exactly once; taggers treat it as
/// immutable afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaggingRequest {
    /// Footprint WKT, optionally prefixed with `SRID=<n>;`.
    pub geometry: String,
    /// Optional ISO-8601 acquisition date, used for season inference.
    pub timestamp: Option<String>,
    /// Target planet; taggers restricted to another planet are skipped.
    #[serde(default = "default_planet")]
    pub planet: String,
    /// Requested taggers in execution order.
    #[serde(default)]
    pub taggers: Vec<TaggerSpec>,
}

fn default_planet() -> String {
    "earth".to_string()
}

/// Failure record for a single tagger when the engine runs in
/// partial-result mode.
#[derive(Debug, Clone, Serialize)]
pub struct TaggerFailure {
    /// Name of the tagger that failed.
    pub tagger: String,
    /// Failure description.
    pub message: String,
}

/// The final tagging envelope returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TagResult {
    /// Input geometry before reprojection, present only when
    /// normalization changed it.
    #[serde(rename = "originalGeometry", skip_serializing_if = "Option::is_none")]
    pub original_geometry: Option<String>,
    /// Normalized footprint WKT (EPSG:4326).
    pub geometry: String,
    /// Planet the request was evaluated against.
    pub planet: String,
    /// Request timestamp, echoed back.
    pub timestamp: Option<String>,
    /// Unit for every `area` value in the content tree.
    pub area_unit: &'static str,
    /// Unit for every `pcover`/`gcover` value in the content tree.
    pub cover_unit: &'static str,
    /// Per-tagger sub-trees keyed by tagger namespace.
    pub content: serde_json::Map<String, serde_json::Value>,
    /// Provenance of every dataset that contributed to `content`.
    pub references: Vec<Reference>,
    /// Per-tagger failures, omitted when every tagger succeeded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<TaggerFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_defaults() {
        let options: TaggerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, TaggerOptions::default());
        assert!(options.area_limit.is_none());
        assert!(!options.compute_area);
    }

    #[test]
    fn options_ignore_unknown_keys() {
        let options: TaggerOptions =
            serde_json::from_str(r#"{"areaLimit": 500.0, "noSuchKey": true}"#).unwrap();
        assert_eq!(options.area_limit, Some(500.0));
    }

    #[test]
    fn options_toponyms_modes() {
        let options: TaggerOptions = serde_json::from_str(r#"{"toponyms": "all"}"#).unwrap();
        assert_eq!(options.toponyms, Some(ToponymsMode::All));
        let options: TaggerOptions = serde_json::from_str(r#"{"toponyms": "main"}"#).unwrap();
        assert_eq!(options.toponyms, Some(ToponymsMode::Main));
    }

    #[test]
    fn request_defaults() {
        let request: TaggingRequest =
            serde_json::from_str(r#"{"geometry": "POLYGON((0 0,1 0,1 1,0 1,0 0))"}"#).unwrap();
        assert_eq!(request.planet, "earth");
        assert!(request.taggers.is_empty());
        assert!(request.timestamp.is_none());
    }

    #[test]
    fn envelope_omits_empty_optionals() {
        let result = TagResult {
            original_geometry: None,
            geometry: "POLYGON((0 0,1 0,1 1,0 1,0 0))".to_string(),
            planet: "earth".to_string(),
            timestamp: None,
            area_unit: "km2",
            cover_unit: "%",
            content: serde_json::Map::new(),
            references: Vec::new(),
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("originalGeometry").is_none());
        assert!(json.get("errors").is_none());
        assert_eq!(json["area_unit"], "km2");
        assert_eq!(json["cover_unit"], "%");
    }
}
