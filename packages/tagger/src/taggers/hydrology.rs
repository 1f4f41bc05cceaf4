//! Hydrology tagger: river and lake centerline names.

use async_trait::async_trait;
use geotag_tagger_models::{Reference, TaggerOptions};

use super::{TagContext, Tagger, generic};
use crate::TagError;

const REFERENCES: &[Reference] = &[Reference {
    dataset: "Rivers and lake centerlines",
    author: "Natural Earth",
    license: "Free of charge",
    url: "http://www.naturalearthdata.com/downloads/10m-physical-vectors/10m-rivers-lake-centerlines/",
}];

const MAPPINGS: &[generic::TableMapping] = &[generic::TableMapping {
    table: "rivers",
    columns: &[("name", "name")],
}];

pub struct HydrologyTagger;

#[async_trait]
impl Tagger for HydrologyTagger {
    fn planet(&self) -> Option<&'static str> {
        Some("earth")
    }

    fn references(&self) -> &'static [Reference] {
        REFERENCES
    }

    async fn tag(
        &self,
        ctx: &TagContext<'_>,
        options: &TaggerOptions,
    ) -> Result<serde_json::Map<String, serde_json::Value>, TagError> {
        // Reference tables live in the datasources schema regardless
        // of any caller-supplied override.
        let mut options = options.clone();
        options.schema = Some("datasources".to_string());

        let mut content = serde_json::Map::new();
        content.insert(
            "hydrology".to_string(),
            serde_json::Value::Object(generic::process(ctx, &options, MAPPINGS).await?),
        );
        Ok(content)
    }
}
