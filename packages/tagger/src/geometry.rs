//! Footprint normalization: SRID handling, reprojection and topology
//! validation.
//!
//! The footprint is normalized exactly once per request. Validation
//! runs twice against the oracle: once on the raw geometry and once
//! after the dateline-split correction, so polygons that only become
//! invalid when wrapped across the antimeridian are still rejected
//! with a useful diagnostic.

use geotag_database::postgis;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::TagError;

/// Parses an optional `SRID=<n>;` prefix, returning the SRID and the
/// bare WKT that follows it.
#[must_use]
pub fn parse_srid_prefix(wkt: &str) -> Option<(i32, &str)> {
    let (head, rest) = wkt.split_once(';')?;
    if !head.to_lowercase().starts_with("srid=") {
        return None;
    }
    Some((head[5..].trim().parse().unwrap_or(0), rest))
}

/// Converts an input WKT with an explicit SRID prefix to EPSG:4326.
///
/// Input without a prefix, or with `SRID=4326`, is returned unchanged.
///
/// # Errors
///
/// Returns [`TagError::GeometryTransform`] when the oracle cannot
/// reproject the geometry.
pub async fn to_epsg4326(db: &dyn Database, wkt: &str) -> Result<String, TagError> {
    let Some((srid, bare)) = parse_srid_prefix(wkt) else {
        return Ok(wkt.to_string());
    };

    if srid == 4326 {
        return Ok(wkt.to_string());
    }

    let rows = db
        .query_raw_params(
            &format!(
                "SELECT ST_AsText(ST_Transform(ST_GeomFromText($1, {srid}), 4326)) as wkt"
            ),
            &[DatabaseValue::String(bare.to_string())],
        )
        .await
        .map_err(|_| TagError::GeometryTransform)?;

    rows.first()
        .and_then(|row| row.to_value::<Option<String>>("wkt").unwrap_or(None))
        .ok_or(TagError::GeometryTransform)
}

/// Validates the footprint's topology, both as-is and after the
/// dateline-split correction.
///
/// # Errors
///
/// * [`TagError::MissingGeometry`] for an empty input, without any
///   oracle round-trip.
/// * [`TagError::InvalidGeometry`] carrying the oracle's diagnostic
///   (prefixed `[GEOMETRY]` or `[SPLITTED]` depending on which check
///   failed to execute) or `Invalid geometry` when the corrected
///   geometry is well-formed SQL but topologically invalid.
pub async fn topology_analysis(db: &dyn Database, wkt: &str) -> Result<(), TagError> {
    if wkt.trim().is_empty() {
        return Err(TagError::MissingGeometry);
    }

    // The raw check only surfaces oracle parse errors; its boolean
    // verdict is superseded by the dateline-split check below.
    is_topology_valid(db, "ST_IsValid(ST_GeomFromText($1, 4326))", wkt)
        .await
        .map_err(|diag| TagError::InvalidGeometry(format!("[GEOMETRY] {diag}")))?;

    let valid = is_topology_valid(
        db,
        "ST_IsValid(ST_SplitDateLine(ST_GeomFromText($1, 4326)))",
        wkt,
    )
    .await
    .map_err(|diag| TagError::InvalidGeometry(format!("[SPLITTED] {diag}")))?;

    if valid {
        Ok(())
    } else {
        Err(TagError::InvalidGeometry("Invalid geometry".to_string()))
    }
}

async fn is_topology_valid(
    db: &dyn Database,
    predicate: &str,
    wkt: &str,
) -> Result<bool, String> {
    let rows = db
        .query_raw_params(
            &format!("SELECT CASE WHEN {predicate} THEN 1 ELSE 0 END as valid"),
            &[DatabaseValue::String(wkt.to_string())],
        )
        .await
        .map_err(|e| e.to_string())?;

    Ok(rows
        .first()
        .map(|row| row.to_value::<i64>("valid").unwrap_or(0))
        .unwrap_or(0)
        == 1)
}

/// Geodesic footprint area in km², computed by the oracle.
///
/// # Errors
///
/// Returns [`TagError::Database`] when the area query fails.
pub async fn footprint_area(db: &dyn Database, wkt: &str) -> Result<f64, TagError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {} as area", postgis::area(&postgis::geom_from_text("$1"))),
            &[DatabaseValue::String(wkt.to_string())],
        )
        .await?;

    Ok(rows
        .first()
        .and_then(|row| row.to_value::<Option<f64>>("area").unwrap_or(None))
        .map_or(0.0, crate::coverage::to_square_km))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srid_prefix_parsing() {
        assert_eq!(
            parse_srid_prefix("SRID=3857;POLYGON((0 0,1 0,1 1,0 1,0 0))"),
            Some((3857, "POLYGON((0 0,1 0,1 1,0 1,0 0))"))
        );
        assert_eq!(
            parse_srid_prefix("srid=4326;POINT(0 0)"),
            Some((4326, "POINT(0 0)"))
        );
        assert_eq!(parse_srid_prefix("POLYGON((0 0,1 0,1 1,0 1,0 0))"), None);
    }

    #[test]
    fn srid_prefix_garbage_srid_is_zero() {
        assert_eq!(parse_srid_prefix("SRID=abc;POINT(0 0)"), Some((0, "POINT(0 0)")));
    }
}
