//! Toponyms tagger: populated places inside the footprint, nearest to
//! the footprint centroid first.

use async_trait::async_trait;
use geotag_database::postgis;
use geotag_tagger_models::{Reference, TaggerOptions, toponyms::{PLACE_CODES, Toponym}};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::DatabaseValue;

use super::{TagContext, Tagger};
use crate::TagError;

const REFERENCES: &[Reference] = &[Reference {
    dataset: "Geonames",
    author: "Geonames",
    license: "Free of Charge",
    url: "http://www.geonames.org/",
}];

pub struct ToponymsTagger;

#[async_trait]
impl Tagger for ToponymsTagger {
    fn planet(&self) -> Option<&'static str> {
        Some("earth")
    }

    fn references(&self) -> &'static [Reference] {
        REFERENCES
    }

    async fn tag(
        &self,
        ctx: &TagContext<'_>,
        _options: &TaggerOptions,
    ) -> Result<serde_json::Map<String, serde_json::Value>, TagError> {
        let codes = PLACE_CODES
            .iter()
            .map(|code| format!("'{code}'"))
            .collect::<Vec<_>>()
            .join(", ");

        let footprint = postgis::geom_from_text("$1");
        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "WITH prequery AS (SELECT {footprint} AS {corrected}, ST_centroid({footprint}) AS corrected_centroid) \
                     SELECT geonameid, name, normalize_initcap(name) as normalized, country, countryname, longitude, latitude, fcode, population, ST_Distance(geom, corrected_centroid) as distance \
                     FROM prequery, gazetteer.geoname WHERE st_intersects(geom, {corrected}) AND fcode IN ({codes}) ORDER BY distance ASC",
                    corrected = postgis::CORRECTED_GEOMETRY,
                ),
                &[DatabaseValue::String(ctx.geometry.to_string())],
            )
            .await?;

        let mut toponyms = Vec::with_capacity(rows.len());
        for row in &rows {
            toponyms.push(Toponym {
                id: row.to_value::<Option<i64>>("geonameid").unwrap_or(None).unwrap_or(0),
                name: row.to_value::<Option<String>>("name").unwrap_or(None).unwrap_or_default(),
                normalized: row
                    .to_value::<Option<String>>("normalized")
                    .unwrap_or(None)
                    .unwrap_or_default(),
                country: row
                    .to_value::<Option<String>>("countryname")
                    .unwrap_or(None)
                    .unwrap_or_default(),
                ccode: row.to_value::<Option<String>>("country").unwrap_or(None).unwrap_or_default(),
                lon: row.to_value::<Option<f64>>("longitude").unwrap_or(None).unwrap_or(0.0),
                lat: row.to_value::<Option<f64>>("latitude").unwrap_or(None).unwrap_or(0.0),
                fcode: row.to_value::<Option<String>>("fcode").unwrap_or(None).unwrap_or_default(),
                population: row.to_value::<Option<i64>>("population").unwrap_or(None).unwrap_or(0),
                distance_to_centroid: row
                    .to_value::<Option<f64>>("distance")
                    .unwrap_or(None)
                    .unwrap_or(0.0),
            });
        }

        let mut content = serde_json::Map::new();
        content.insert("toponyms".to_string(), serde_json::json!(toponyms));
        Ok(content)
    }
}
