//! Table-driven overlay engine shared by the hydrology, geology and
//! physical taggers.
//!
//! Each tagger declares a static table-to-columns mapping; the engine
//! builds one intersection query per table against the dateline
//! corrected footprint, synthesizes composite identifiers and coverage
//! percentages, and drops rows whose coverage truncates to zero.

use geotag_database::postgis;
use geotag_tagger_models::{TAG_SEPARATOR, TaggerOptions};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::DatabaseValue;

use super::TagContext;
use crate::{TagError, coverage};

/// Output columns selected from one reference table.
pub struct TableMapping {
    /// Unqualified table name, also used as the result key.
    pub table: &'static str,
    /// `(as_name, column)` pairs. The `name` alias expands to a
    /// `distinct` select plus a `normalize_initcap` normalized form.
    pub columns: &'static [(&'static str, &'static str)],
}

/// Runs every table of the mapping against the footprint and returns
/// the non-empty results keyed by table name.
pub async fn process(
    ctx: &TagContext<'_>,
    options: &TaggerOptions,
    mappings: &[TableMapping],
) -> Result<serde_json::Map<String, serde_json::Value>, TagError> {
    let mut result = serde_json::Map::new();

    if let Some(limit) = options.area_limit
        && ctx.area > limit
    {
        return Ok(result);
    }

    for mapping in mappings {
        let entries = retrieve(ctx, options, mapping).await?;
        if !entries.is_empty() {
            result.insert(mapping.table.to_string(), serde_json::Value::Array(entries));
        }
    }

    Ok(result)
}

async fn retrieve(
    ctx: &TagContext<'_>,
    options: &TaggerOptions,
    mapping: &TableMapping,
) -> Result<Vec<serde_json::Value>, TagError> {
    let table = options.schema.as_ref().map_or_else(
        || mapping.table.to_string(),
        |schema| format!("{schema}.{}", mapping.table),
    );

    let sql = build_query(
        &table,
        mapping.columns,
        options.compute_area,
        ctx.config.return_geometries,
        ctx.config.geometry_tolerance,
    );

    let rows = ctx
        .db
        .query_raw_params(&sql, &[DatabaseValue::String(ctx.geometry.to_string())])
        .await?;

    let mut entries = Vec::new();
    for row in &rows {
        let overlay = OverlayRow {
            name: row.to_value::<Option<String>>("name").unwrap_or(None),
            normalized: row.to_value::<Option<String>>("normalized").unwrap_or(None),
            kind: row.to_value::<Option<String>>("type").unwrap_or(None),
            geonameid: row.to_value::<Option<i64>>("geonameid").unwrap_or(None),
            area: row.to_value::<Option<f64>>("area").unwrap_or(None),
            entity_area: row.to_value::<Option<f64>>("entityarea").unwrap_or(None),
            geometry: row.to_value::<Option<String>>("geometry").unwrap_or(None),
        };
        if let Some(entry) = entry_from_row(overlay, ctx.area) {
            entries.push(serde_json::Value::Object(entry));
        }
    }

    Ok(entries)
}

/// Builds the per-table intersection query. The footprint is bound as
/// `$1` and dateline-corrected once in the prequery CTE.
pub(crate) fn build_query(
    table: &str,
    columns: &[(&str, &str)],
    compute_area: bool,
    return_geometries: bool,
    tolerance: f64,
) -> String {
    let mut properties = Vec::new();

    for (as_name, column) in columns {
        if *as_name == "name" {
            properties.push(format!("distinct({column}) as name"));
            properties.push(format!("normalize_initcap({column}) as normalized"));
        } else {
            properties.push(format!("{column} as {as_name}"));
        }
    }

    if return_geometries {
        properties.push(format!(
            "{} as geometry",
            postgis::as_wkt(&postgis::simplify(
                &postgis::intersection("geom", postgis::CORRECTED_GEOMETRY),
                tolerance,
            ))
        ));
    }

    let mut order_by = String::new();
    if compute_area {
        properties.push(format!(
            "{} as area",
            postgis::area(&postgis::intersection("geom", postgis::CORRECTED_GEOMETRY))
        ));
        properties.push(format!("{} as entityarea", postgis::area("geom")));
        order_by = " ORDER BY area DESC".to_string();
    }

    format!(
        "{cte} SELECT {properties} FROM prequery,{table} WHERE st_intersects(geom, {corrected}){order_by}",
        cte = postgis::corrected_geometry_cte("$1"),
        properties = properties.join(","),
        corrected = postgis::CORRECTED_GEOMETRY,
    )
}

/// One decoded overlay row, before id/coverage synthesis.
pub(crate) struct OverlayRow {
    pub name: Option<String>,
    pub normalized: Option<String>,
    pub kind: Option<String>,
    pub geonameid: Option<i64>,
    pub area: Option<f64>,
    pub entity_area: Option<f64>,
    pub geometry: Option<String>,
}

/// Turns a decoded row into a result entry. Returns `None` for rows
/// whose footprint coverage truncates to zero.
pub(crate) fn entry_from_row(
    row: OverlayRow,
    footprint_area: f64,
) -> Option<serde_json::Map<String, serde_json::Value>> {
    let mut entry = serde_json::Map::new();

    if let Some(name) = row.name {
        entry.insert("name".to_string(), serde_json::json!(name));
    }

    if let Some(kind) = &row.kind {
        let mut id = format!(
            "{}{TAG_SEPARATOR}{}",
            kind.to_lowercase(),
            row.normalized.as_deref().unwrap_or_default()
        );
        if let Some(geonameid) = row.geonameid {
            id.push(TAG_SEPARATOR);
            id.push_str(&geonameid.to_string());
        }
        entry.insert("id".to_string(), serde_json::json!(id));
    }

    if let Some(area) = row.area {
        let area_km = coverage::to_square_km(area);
        let pcover = coverage::percentage(area_km, footprint_area);
        if pcover <= 0.0 {
            return None;
        }
        entry.insert("pcover".to_string(), serde_json::json!(pcover));

        if let Some(entity_area) = row.entity_area {
            entry.insert(
                "gcover".to_string(),
                serde_json::json!(coverage::percentage(area_km, coverage::to_square_km(entity_area))),
            );
        }
    }

    if let Some(geometry) = row.geometry {
        entry.insert("geometry".to_string(), serde_json::json!(geometry));
    }

    if entry.is_empty() { None } else { Some(entry) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> OverlayRow {
        OverlayRow {
            name: Some(name.to_string()),
            normalized: Some(name.to_lowercase()),
            kind: None,
            geonameid: None,
            area: None,
            entity_area: None,
            geometry: None,
        }
    }

    #[test]
    fn query_name_expansion() {
        let sql = build_query("datasources.rivers", &[("name", "name")], false, false, 0.1);
        assert!(sql.starts_with("WITH prequery AS (SELECT ST_SplitDateLine(ST_GeomFromText($1, 4326)) AS corrected_geometry)"));
        assert!(sql.contains("distinct(name) as name"));
        assert!(sql.contains("normalize_initcap(name) as normalized"));
        assert!(sql.contains("FROM prequery,datasources.rivers"));
        assert!(sql.contains("st_intersects(geom, corrected_geometry)"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn query_compute_area() {
        let sql = build_query("datasources.physical", &[("name", "name"), ("type", "type")], true, false, 0.1);
        assert!(sql.contains("type as type"));
        assert!(sql.contains("as area"));
        assert!(sql.contains("as entityarea"));
        assert!(sql.ends_with(" ORDER BY area DESC"));
    }

    #[test]
    fn query_geometry_column() {
        let sql = build_query("datasources.rivers", &[("name", "name")], false, true, 0.25);
        assert!(sql.contains("ST_AsText(ST_SimplifyPreserveTopology(ST_Intersection(geom, corrected_geometry), 0.25)) as geometry"));
    }

    #[test]
    fn entry_name_only() {
        let entry = entry_from_row(row("Loire"), 100.0).unwrap();
        assert_eq!(entry.get("name"), Some(&serde_json::json!("Loire")));
        assert!(!entry.contains_key("id"));
        assert!(!entry.contains_key("pcover"));
    }

    #[test]
    fn entry_composite_id() {
        let mut r = row("Celtic Sea");
        r.normalized = Some("celtic sea".to_string());
        r.kind = Some("Sea".to_string());
        let entry = entry_from_row(r, 100.0).unwrap();
        assert_eq!(entry.get("id"), Some(&serde_json::json!("sea:celtic sea")));
    }

    #[test]
    fn entry_id_with_geonameid() {
        let mut r = row("Celtic Sea");
        r.normalized = Some("celtic sea".to_string());
        r.kind = Some("Sea".to_string());
        r.geonameid = Some(2_960_856);
        let entry = entry_from_row(r, 100.0).unwrap();
        assert_eq!(entry.get("id"), Some(&serde_json::json!("sea:celtic sea:2960856")));
    }

    #[test]
    fn entry_coverage() {
        let mut r = row("Loire");
        // 37.02951 km² over a 100 km² footprint truncates to 37.02.
        r.area = Some(37_029_510.0);
        r.entity_area = Some(100_000_000.0);
        let entry = entry_from_row(r, 100.0).unwrap();
        assert_eq!(entry.get("pcover"), Some(&serde_json::json!(37.02)));
        assert_eq!(entry.get("gcover"), Some(&serde_json::json!(37.02)));
    }

    #[test]
    fn entry_insignificant_coverage_dropped() {
        let mut r = row("Loire");
        r.area = Some(1.0);
        assert!(entry_from_row(r, 100_000.0).is_none());
    }

    #[test]
    fn entry_empty_row_dropped() {
        let r = OverlayRow {
            name: None,
            normalized: None,
            kind: None,
            geonameid: None,
            area: None,
            entity_area: None,
            geometry: None,
        };
        assert!(entry_from_row(r, 100.0).is_none());
    }
}
