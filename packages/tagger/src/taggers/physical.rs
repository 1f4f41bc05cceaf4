//! Physical tagger: named physical features (seas, bays, gulfs and
//! other marine regions).

use async_trait::async_trait;
use geotag_tagger_models::{Reference, TaggerOptions};

use super::{TagContext, Tagger, generic};
use crate::TagError;

const REFERENCES: &[Reference] = &[Reference {
    dataset: "Marine Regions",
    author: "Natural Earth",
    license: "Free of charge",
    url: "http://www.naturalearthdata.com/downloads/10m-physical-vectors/10m-physical-labels/",
}];

const MAPPINGS: &[generic::TableMapping] = &[generic::TableMapping {
    table: "physical",
    columns: &[("name", "name"), ("type", "type")],
}];

pub struct PhysicalTagger;

#[async_trait]
impl Tagger for PhysicalTagger {
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
        let mut options = options.clone();
        options.schema = Some("datasources".to_string());

        // The table name doubles as the result key.
        generic::process(ctx, &options, MAPPINGS).await
    }
}
