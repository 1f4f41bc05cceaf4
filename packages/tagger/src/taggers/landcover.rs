//! Land cover tagger: aggregates raster-derived land cover polygons
//! into the two-level taxonomy (8 parent classes, 22 leaf classes).

use std::collections::BTreeMap;

use async_trait::async_trait;
use geotag_database::postgis;
use geotag_tagger_models::{
    Reference, TAG_SEPARATOR, TaggerOptions,
    landcover::{LINKAGE, LandCoverDetail, LandCoverMain, leaf_class_name, parent_class_name, parent_of_leaf},
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::DatabaseValue;

use super::{TagContext, Tagger};
use crate::{TagError, coverage};

const REFERENCES: &[Reference] = &[Reference {
    dataset: "Global Land Cover 2000",
    author: "JRC",
    license: "Free of Charge for non-commercial use",
    url: "http://bioval.jrc.ec.europa.eu/products/glc2000/data_access.php",
}];

/// Raw per-class accumulation, keyed by leaf class code.
type RawLandCover = BTreeMap<u32, RawClass>;

#[derive(Default)]
struct RawClass {
    area: f64,
    geometries: Vec<String>,
}

pub struct LandCoverTagger;

#[async_trait]
impl Tagger for LandCoverTagger {
    fn references(&self) -> &'static [Reference] {
        REFERENCES
    }

    async fn tag(
        &self,
        ctx: &TagContext<'_>,
        options: &TaggerOptions,
    ) -> Result<serde_json::Map<String, serde_json::Value>, TagError> {
        let gated = options.area_limit.is_some_and(|limit| ctx.area > limit)
            || !coverage::is_valid_area(ctx.area, ctx.config.area_limit);

        let (main, details) = if gated {
            // Sentinel shape so callers can distinguish "not computed"
            // from "computed, nothing found".
            (Vec::new(), Vec::new())
        } else {
            let raw = self.retrieve_raw(ctx).await?;
            (
                main_classes(&raw, ctx.area),
                detail_classes(&raw, ctx.area, ctx.config.return_geometries),
            )
        };

        let mut content = serde_json::Map::new();
        content.insert(
            "landcover".to_string(),
            serde_json::json!({ "main": main, "details": details }),
        );
        Ok(content)
    }
}

impl LandCoverTagger {
    async fn retrieve_raw(&self, ctx: &TagContext<'_>) -> Result<RawLandCover, TagError> {
        let intersection = postgis::intersection("wkb_geometry", postgis::CORRECTED_GEOMETRY);
        let wkt_column = if ctx.config.return_geometries {
            format!(
                ", {} as wkt",
                postgis::as_wkt(&postgis::simplify(&intersection, ctx.config.geometry_tolerance))
            )
        } else {
            String::new()
        };

        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "{cte} SELECT dn as dn, {area} as area{wkt_column} FROM prequery, landcover.landcover WHERE st_intersects(wkb_geometry, {corrected})",
                    cte = postgis::corrected_geometry_cte("$1"),
                    area = postgis::area(&intersection),
                    corrected = postgis::CORRECTED_GEOMETRY,
                ),
                &[DatabaseValue::String(ctx.geometry.to_string())],
            )
            .await?;

        let mut classes = RawLandCover::new();
        for row in &rows {
            let Some(dn) = row.to_value::<Option<i64>>("dn").unwrap_or(None) else {
                continue;
            };
            let code = u32::try_from(dn).unwrap_or(0);
            let area = row.to_value::<Option<f64>>("area").unwrap_or(None).unwrap_or(0.0);
            let class = classes.entry(code).or_default();
            class.area += area;

            if ctx.config.return_geometries
                && let Some(wkt) = row.to_value::<Option<String>>("wkt").unwrap_or(None)
                && let Some(part) = multipolygon_part(&wkt)
            {
                class.geometries.push(part);
            }
        }

        Ok(classes)
    }
}

/// Parent classes ranked by aggregated intersection area, dropping
/// classes whose footprint coverage truncates to zero.
fn main_classes(raw: &RawLandCover, footprint_area: f64) -> Vec<LandCoverMain> {
    let mut sums: Vec<(u32, f64)> = LINKAGE
        .iter()
        .map(|(parent, leaves)| {
            let sum = leaves
                .iter()
                .filter_map(|leaf| raw.get(leaf).map(|class| class.area))
                .sum();
            (*parent, sum)
        })
        .collect();
    sums.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    sums.into_iter()
        .filter_map(|(parent, sum)| {
            let area = coverage::to_square_km(sum);
            let pcover = coverage::percentage(area, footprint_area);
            if sum == 0.0 || pcover <= 0.0 {
                return None;
            }
            let name = parent_class_name(parent);
            Some(LandCoverMain {
                name,
                id: format!("lc{TAG_SEPARATOR}{name}"),
                area,
                pcover,
            })
        })
        .collect()
}

/// Leaf classes in code order, each linked to its parent class.
fn detail_classes(
    raw: &RawLandCover,
    footprint_area: f64,
    return_geometries: bool,
) -> Vec<LandCoverDetail> {
    raw.iter()
        .filter(|(_, class)| class.area != 0.0)
        .map(|(code, class)| {
            let name = leaf_class_name(*code);
            let area = coverage::to_square_km(class.area);
            let geometry = if return_geometries && !class.geometries.is_empty() {
                Some(format!("MULTIPOLYGON({})", class.geometries.join(",")))
            } else {
                None
            };
            LandCoverDetail {
                name,
                id: format!("lcd{TAG_SEPARATOR}{}", compact_name(name)),
                parent_id: format!("lc{TAG_SEPARATOR}{}", parent_of_leaf(*code)),
                code: *code,
                area,
                pcover: coverage::percentage(area, footprint_area),
                geometry,
            }
        })
        .collect()
}

/// Strips separators from a class name for identifier use.
fn compact_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | ',' | ' ' | '-'))
        .collect()
}

/// Rewrites a `POLYGON(...)` WKT as one `MULTIPOLYGON` component.
/// Multi-geometries and non-polygons are skipped.
fn multipolygon_part(wkt: &str) -> Option<String> {
    wkt.strip_prefix("POLYGON").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(u32, f64)]) -> RawLandCover {
        entries
            .iter()
            .map(|(code, area)| {
                (*code, RawClass { area: *area, geometries: Vec::new() })
            })
            .collect()
    }

    #[test]
    fn main_classes_ranked_by_area() {
        // Forest leaves 1 and 2, water leaf 20; water dominates.
        let classes = main_classes(&raw(&[(1, 10e6), (2, 10e6), (20, 50e6)]), 100.0);
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].name, "Water");
        assert_eq!(classes[0].id, "lc:Water");
        assert!((classes[0].area - 50.0).abs() < 1e-9);
        assert!((classes[0].pcover - 50.0).abs() < 1e-9);
        assert_eq!(classes[1].name, "Forest");
        assert!((classes[1].area - 20.0).abs() < 1e-9);
    }

    #[test]
    fn main_classes_drop_insignificant() {
        // 1 m² over 100 km² truncates to zero coverage.
        assert!(main_classes(&raw(&[(1, 1.0)]), 100.0).is_empty());
    }

    #[test]
    fn detail_ids_and_parents() {
        let details = detail_classes(&raw(&[(21, 30e6)]), 100.0, false);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].name, "Snow And Ice");
        assert_eq!(details[0].id, "lcd:SnowAndIce");
        assert_eq!(details[0].parent_id, "lc:Ice");
        assert_eq!(details[0].code, 21);
        assert!((details[0].pcover - 30.0).abs() < 1e-9);
        assert!(details[0].geometry.is_none());
    }

    #[test]
    fn detail_geometry_concatenation() {
        let mut classes = raw(&[(20, 10e6)]);
        classes.get_mut(&20).unwrap().geometries = vec![
            "((0 0,1 0,1 1,0 0))".to_string(),
            "((2 2,3 2,3 3,2 2))".to_string(),
        ];
        let details = detail_classes(&classes, 100.0, true);
        assert_eq!(
            details[0].geometry.as_deref(),
            Some("MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((2 2,3 2,3 3,2 2)))")
        );
    }

    #[test]
    fn polygon_wkt_becomes_multipolygon_part() {
        assert_eq!(
            multipolygon_part("POLYGON((0 0,1 0,1 1,0 0))").as_deref(),
            Some("((0 0,1 0,1 1,0 0))")
        );
        assert!(multipolygon_part("MULTIPOLYGON(((0 0,1 0,1 1,0 0)))").is_none());
        assert!(multipolygon_part("POINT(0 0)").is_none());
    }

    #[test]
    fn unknown_code_maps_to_unknown_name() {
        let details = detail_classes(&raw(&[(99, 10e6)]), 100.0, false);
        assert_eq!(details[0].name, "unknown");
        assert_eq!(details[0].parent_id, "lc:unknown");
    }
}
