//! Tagger capability interface and registry.
//!
//! Each tagger computes one category of semantic tags for a
//! normalized footprint. Taggers are resolved by name from a
//! compile-time registry; an unknown name resolves to `None` and is
//! skipped by the engine without error, tolerating tagger-list drift
//! between client and server versions.

pub mod always;
pub mod generic;
pub mod geology;
pub mod hydrology;
pub mod landcover;
pub mod physical;
pub mod political;
pub mod population;
pub mod toponyms;

use async_trait::async_trait;
use geotag_tagger_models::{Reference, TaggerOptions};
use switchy_database::{Database, DatabaseValue};

use crate::{TagConfig, TagError};

/// Per-request context handed to every tagger.
///
/// The geometry is the normalized footprint; `area` is the canonical
/// footprint area in km² seeded by the always-tagger and never
/// recomputed downstream.
pub struct TagContext<'a> {
    /// Database connection, owned by the request.
    pub db: &'a dyn Database,
    /// Engine configuration.
    pub config: &'a TagConfig,
    /// Normalized footprint WKT (EPSG:4326).
    pub geometry: &'a str,
    /// Optional ISO-8601 acquisition date.
    pub timestamp: Option<&'a str>,
    /// Planet the request targets.
    pub planet: &'a str,
    /// Footprint area in km².
    pub area: f64,
}

/// A pluggable unit computing one category of semantic tags.
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Planet this tagger is restricted to, if any. The engine skips
    /// the tagger silently on a mismatch.
    fn planet(&self) -> Option<&'static str> {
        None
    }

    /// Provenance of the reference datasets this tagger consumes.
    fn references(&self) -> &'static [Reference];

    /// Computes this tagger's sub-tree for the footprint.
    async fn tag(
        &self,
        ctx: &TagContext<'_>,
        options: &TaggerOptions,
    ) -> Result<serde_json::Map<String, serde_json::Value>, TagError>;
}

/// Resolves a tagger by name (already trimmed and lowercased).
/// Unknown names yield `None`.
#[must_use]
pub fn resolve(name: &str) -> Option<Box<dyn Tagger>> {
    match name {
        "political" => Some(Box::new(political::PoliticalTagger)),
        "population" => Some(Box::new(population::PopulationTagger)),
        "landcover" => Some(Box::new(landcover::LandCoverTagger)),
        "hydrology" => Some(Box::new(hydrology::HydrologyTagger)),
        "geology" => Some(Box::new(geology::GeologyTagger)),
        "physical" => Some(Box::new(physical::PhysicalTagger)),
        "toponyms" => Some(Box::new(toponyms::ToponymsTagger)),
        _ => None,
    }
}

/// True when the query returns at least one row.
pub(crate) async fn has_results(
    db: &dyn Database,
    sql: &str,
    params: &[DatabaseValue],
) -> Result<bool, TagError> {
    let rows = db.query_raw_params(sql, params).await?;
    Ok(!rows.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_taggers() {
        for name in [
            "political",
            "population",
            "landcover",
            "hydrology",
            "geology",
            "physical",
            "toponyms",
        ] {
            assert!(resolve(name).is_some(), "{name} should resolve");
        }
    }

    #[test]
    fn unknown_tagger_is_none() {
        assert!(resolve("geology2").is_none());
        assert!(resolve("").is_none());
    }

    #[test]
    fn earth_only_restrictions() {
        for name in ["political", "population", "hydrology", "toponyms", "geology", "physical"] {
            let tagger = resolve(name).unwrap();
            assert_eq!(tagger.planet(), Some("earth"), "{name}");
        }
        // Land cover carries no planet restriction.
        assert_eq!(resolve("landcover").unwrap().planet(), None);
    }
}
