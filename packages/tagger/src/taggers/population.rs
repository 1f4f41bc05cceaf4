//! Population tagger: estimated population count and density from the
//! gridded population of the world dataset.
//!
//! The grid resolution is chosen from the footprint area so large
//! polygons never hit the high resolution table.

use async_trait::async_trait;
use geotag_database::postgis;
use geotag_tagger_models::{Reference, TaggerOptions};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::DatabaseValue;

use super::{TagContext, Tagger};
use crate::TagError;

const REFERENCES: &[Reference] = &[Reference {
    dataset: "Gridded Population of the World - 2015",
    author: "SEDAC",
    license: "Free of Charge",
    url: "http://sedac.ciesin.columbia.edu/data/set/gpw-v3-population-count-future-estimates/data-download",
}];

pub struct PopulationTagger;

#[async_trait]
impl Tagger for PopulationTagger {
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
        let mut content = serde_json::Map::new();

        if let Some(limit) = options.area_limit
            && ctx.area > limit
        {
            content.insert("population".to_string(), serde_json::json!({}));
            return Ok(content);
        }

        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "{cte} SELECT pcount FROM prequery, gpw.{table} WHERE ST_intersects(footprint, {corrected})",
                    cte = postgis::corrected_geometry_cte("$1"),
                    table = grid_table(ctx.area),
                    corrected = postgis::CORRECTED_GEOMETRY,
                ),
                &[DatabaseValue::String(ctx.geometry.to_string())],
            )
            .await?;

        let mut total = 0.0;
        for row in &rows {
            total += row.to_value::<Option<f64>>("pcount").unwrap_or(None).unwrap_or(0.0);
        }

        content.insert(
            "population".to_string(),
            serde_json::json!({
                "count": (total + 0.5).floor(),
                "densityPerSquareKm": density_per_square_km(total, ctx.area),
            }),
        );
        Ok(content)
    }
}

/// Grid table for the footprint area; coarser grids for larger
/// footprints. A zero or unknown area falls back to the coarsest grid.
fn grid_table(area: f64) -> &'static str {
    if area > 0.0 && area < 6_000.0 {
        "glp15ag"
    } else if (6_000.0..60_000.0).contains(&area) {
        "glp15ag15"
    } else if (60_000.0..120_000.0).contains(&area) {
        "glp15ag30"
    } else {
        "glp15ag60"
    }
}

/// People per km², rounded to two decimals.
fn density_per_square_km(total: f64, area: f64) -> f64 {
    if area > 0.0 {
        (total / area * 100.0).round() / 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_table_resolution_bands() {
        assert_eq!(grid_table(1.0), "glp15ag");
        assert_eq!(grid_table(5_999.9), "glp15ag");
        assert_eq!(grid_table(6_000.0), "glp15ag15");
        assert_eq!(grid_table(59_999.9), "glp15ag15");
        assert_eq!(grid_table(60_000.0), "glp15ag30");
        assert_eq!(grid_table(119_999.9), "glp15ag30");
        assert_eq!(grid_table(120_000.0), "glp15ag60");
        assert_eq!(grid_table(1_000_000.0), "glp15ag60");
    }

    #[test]
    fn grid_table_zero_area_uses_coarsest() {
        assert_eq!(grid_table(0.0), "glp15ag60");
        assert_eq!(grid_table(-1.0), "glp15ag60");
    }

    #[test]
    fn density_rounds_two_decimals() {
        assert!((density_per_square_km(1000.0, 3.0) - 333.33).abs() < 1e-9);
        assert!((density_per_square_km(1.0, 3.0) - 0.33).abs() < 1e-9);
        assert!((density_per_square_km(0.0, 3.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn density_zero_area() {
        assert!((density_per_square_km(1000.0, 0.0)).abs() < f64::EPSILON);
    }
}
