//! Request orchestration: footprint normalization, tagger dispatch and
//! envelope assembly.

use geotag_tagger_models::{Reference, TagResult, TaggerFailure, TaggerOptions, TaggingRequest};
use switchy_database::Database;

use crate::{
    TagConfig, TagError, geometry,
    taggers::{self, TagContext, Tagger as _, always::AlwaysTagger},
};

/// The tagging engine. One instance serves many requests; all mutable
/// state is per-request.
#[derive(Debug, Clone, Default)]
pub struct TagEngine {
    config: TagConfig,
}

impl TagEngine {
    #[must_use]
    pub const fn new(config: TagConfig) -> Self {
        Self { config }
    }

    /// Tags a footprint.
    ///
    /// The footprint is normalized to EPSG:4326 and validated, the
    /// universal tags are computed, then the requested taggers run in
    /// request order. A failing tagger does not abort the request; its
    /// failure is reported in the envelope's `errors` array.
    ///
    /// # Errors
    ///
    /// Fails only on normalization and validation errors, or when the
    /// universal tags themselves cannot be computed.
    pub async fn tag(
        &self,
        db: &dyn Database,
        request: &TaggingRequest,
    ) -> Result<TagResult, TagError> {
        if request.geometry.trim().is_empty() {
            return Err(TagError::MissingGeometry);
        }

        let geometry = geometry::to_epsg4326(db, &request.geometry).await?;
        geometry::topology_analysis(db, &geometry).await?;

        let planet = request.planet.trim().to_lowercase();
        let area = geometry::footprint_area(db, &geometry).await?;

        let ctx = TagContext {
            db,
            config: &self.config,
            geometry: &geometry,
            timestamp: request.timestamp.as_deref(),
            planet: &planet,
            area,
        };

        let always = AlwaysTagger;
        let mut content = always.tag(&ctx, &TaggerOptions::default()).await?;
        let mut references: Vec<Reference> = if planet == "earth" {
            always.references().to_vec()
        } else {
            Vec::new()
        };
        let mut errors = Vec::new();

        for spec in &request.taggers {
            let name = spec.name.trim().to_lowercase();
            // Unknown tagger names are skipped silently.
            let Some(tagger) = taggers::resolve(&name) else {
                continue;
            };

            // A tagger bound to another planet silently does nothing.
            if let Some(restriction) = tagger.planet()
                && restriction != planet
            {
                continue;
            }

            match tagger.tag(&ctx, &spec.options).await {
                Ok(sub) => {
                    merge_content(&mut content, sub);
                    references.extend_from_slice(tagger.references());
                }
                Err(err) => {
                    log::warn!("tagger {name} failed: {err}");
                    errors.push(TaggerFailure {
                        tagger: name,
                        message: err.to_string(),
                    });
                }
            }
        }

        let original_geometry =
            (request.geometry != geometry).then(|| request.geometry.clone());

        Ok(TagResult {
            original_geometry,
            geometry,
            planet,
            timestamp: request.timestamp.clone(),
            area_unit: "km2",
            cover_unit: "%",
            content,
            references,
            errors,
        })
    }
}

/// Merges a tagger's sub-tree into the content map. Namespaces should
/// be disjoint; on a collision the later tagger wins.
fn merge_content(
    content: &mut serde_json::Map<String, serde_json::Value>,
    sub: serde_json::Map<String, serde_json::Value>,
) {
    for (key, value) in sub {
        if content.insert(key.clone(), value).is_some() {
            log::warn!("content key {key} overwritten");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_disjoint_namespaces() {
        let mut content = serde_json::Map::new();
        content.insert("area".to_string(), serde_json::json!(42.0));

        let mut sub = serde_json::Map::new();
        sub.insert("toponyms".to_string(), serde_json::json!([]));
        merge_content(&mut content, sub);

        assert_eq!(content.len(), 2);
        assert_eq!(content["area"], serde_json::json!(42.0));
    }

    #[test]
    fn merge_collision_last_wins() {
        let mut content = serde_json::Map::new();
        content.insert("toponyms".to_string(), serde_json::json!([1]));

        let mut sub = serde_json::Map::new();
        sub.insert("toponyms".to_string(), serde_json::json!([2]));
        merge_content(&mut content, sub);

        assert_eq!(content["toponyms"], serde_json::json!([2]));
    }
}
