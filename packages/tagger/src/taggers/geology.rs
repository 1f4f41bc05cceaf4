//! Geology tagger: tectonic plates, fault types, volcanoes and a
//! glaciated-area flag.

use async_trait::async_trait;
use geotag_database::postgis;
use geotag_tagger_models::{Reference, TaggerOptions};
use switchy_database::DatabaseValue;

use super::{TagContext, Tagger, generic, has_results};
use crate::TagError;

const REFERENCES: &[Reference] = &[
    Reference {
        dataset: "Major world tectonic plates",
        author: "ESRI",
        license: "Access granted to Licensee only",
        url: "http://edcommunity.esri.com/Resources/Collections/mapping-our-world",
    },
    Reference {
        dataset: "Major world fault lines",
        author: "ESRI",
        license: "Access granted to Licensee only",
        url: "http://edcommunity.esri.com/Resources/Collections/mapping-our-world",
    },
    Reference {
        dataset: "Major volcanos of the world",
        author: "ESRI",
        license: "Access granted to Licensee only",
        url: "http://edcommunity.esri.com/Resources/Collections/mapping-our-world",
    },
    Reference {
        dataset: "World Glacier Inventory",
        author: "NSIDC",
        license: "Free of Charge",
        url: "http://nsidc.org/data/docs/noaa/g01130_glacier_inventory/#data_descriptions",
    },
    Reference {
        dataset: "Glaciated area",
        author: "Natural Earth",
        license: "Free of Charge",
        url: "http://www.naturalearthdata.com/downloads/10m-physical-vectors/10m-glaciated-areas/",
    },
];

const MAPPINGS: &[generic::TableMapping] = &[
    generic::TableMapping {
        table: "plates",
        columns: &[("name", "name")],
    },
    generic::TableMapping {
        table: "faults",
        columns: &[("name", "type")],
    },
    generic::TableMapping {
        table: "volcanoes",
        columns: &[("name", "name")],
    },
];

pub struct GeologyTagger;

#[async_trait]
impl Tagger for GeologyTagger {
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

        let mut geology = generic::process(ctx, &options, MAPPINGS).await?;

        if self.has_glaciers(ctx).await? {
            geology.insert("hasGlaciers".to_string(), serde_json::json!(true));
        }

        let mut content = serde_json::Map::new();
        content.insert("geology".to_string(), serde_json::Value::Object(geology));
        Ok(content)
    }
}

impl GeologyTagger {
    async fn has_glaciers(&self, ctx: &TagContext<'_>) -> Result<bool, TagError> {
        has_results(
            ctx.db,
            &format!(
                "{cte} SELECT objectid FROM prequery,datasources.glaciers WHERE st_intersects(geom, {corrected}) LIMIT 1",
                cte = postgis::corrected_geometry_cte("$1"),
                corrected = postgis::CORRECTED_GEOMETRY,
            ),
            &[DatabaseValue::String(ctx.geometry.to_string())],
        )
        .await
    }
}
