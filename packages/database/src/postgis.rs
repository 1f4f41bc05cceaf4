//! `PostGIS` SQL fragment builders shared by every overlay query.
//!
//! Footprints always enter SQL through [`geom_from_text`], which wraps
//! `ST_SplitDateLine` around the parse so polygons crossing the ±180°
//! antimeridian are corrected before any predicate runs. Overlay
//! queries start from [`corrected_geometry_cte`] so the corrected
//! footprint is computed once per statement.

/// Name of the corrected footprint column exposed by
/// [`corrected_geometry_cte`].
pub const CORRECTED_GEOMETRY: &str = "corrected_geometry";

/// Parses a WKT bind parameter (e.g. `"$1"`) into an EPSG:4326
/// geometry with antimeridian correction applied.
#[must_use]
pub fn geom_from_text(param: &str) -> String {
    format!("ST_SplitDateLine(ST_GeomFromText({param}, 4326))")
}

/// Geodesic area of a geometry expression, in square meters.
#[must_use]
pub fn area(expr: &str) -> String {
    format!("ST_Area(geography({expr}), false)")
}

/// Intersection of two geometry expressions.
#[must_use]
pub fn intersection(a: &str, b: &str) -> String {
    format!("ST_Intersection({a}, {b})")
}

/// Topology-preserving simplification of a geometry expression.
#[must_use]
pub fn simplify(expr: &str, tolerance: f64) -> String {
    format!("ST_SimplifyPreserveTopology({expr}, {tolerance})")
}

/// WKT rendering of a geometry expression.
#[must_use]
pub fn as_wkt(expr: &str) -> String {
    format!("ST_AsText({expr})")
}

/// `WITH prequery AS (...)` clause computing the corrected footprint
/// once per statement; downstream select lists reference it through
/// [`CORRECTED_GEOMETRY`].
#[must_use]
pub fn corrected_geometry_cte(param: &str) -> String {
    format!(
        "WITH prequery AS (SELECT {} AS {CORRECTED_GEOMETRY})",
        geom_from_text(param)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geom_from_text_wraps_dateline_split() {
        assert_eq!(
            geom_from_text("$1"),
            "ST_SplitDateLine(ST_GeomFromText($1, 4326))"
        );
    }

    #[test]
    fn area_uses_geography() {
        assert_eq!(area("geom"), "ST_Area(geography(geom), false)");
    }

    #[test]
    fn cte_composes() {
        let cte = corrected_geometry_cte("$1");
        assert!(cte.starts_with("WITH prequery AS (SELECT ST_SplitDateLine"));
        assert!(cte.ends_with("AS corrected_geometry)"));
    }

    #[test]
    fn nested_fragments() {
        let expr = as_wkt(&simplify(&intersection("geom", CORRECTED_GEOMETRY), 0.1));
        assert_eq!(
            expr,
            "ST_AsText(ST_SimplifyPreserveTopology(ST_Intersection(geom, corrected_geometry), 0.1))"
        );
    }
}
