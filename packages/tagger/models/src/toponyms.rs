//! Populated-place record returned by the toponyms tagger.

use serde::Serialize;

/// Geonames feature codes considered populated places.
pub const PLACE_CODES: &[&str] = &["PPL", "PPLC", "PPLA", "PPLA2", "PPLA3", "PPLA4", "STLMT"];

/// Restricted code set used for `main` toponym attachment and as the
/// fallback when the footprint exceeds the area limit.
pub const MAIN_PLACE_CODES: &[&str] = &["PPLA", "PPLC"];

/// A populated place intersecting the footprint, annotated with its
/// distance from the footprint centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toponym {
    /// Geonames id.
    pub id: i64,
    /// Place name.
    pub name: String,
    /// Normalized place name.
    pub normalized: String,
    /// Country name.
    pub country: String,
    /// ISO country code.
    pub ccode: String,
    /// Longitude of the place.
    #[serde(rename = "geo:lon")]
    pub lon: f64,
    /// Latitude of the place.
    #[serde(rename = "geo:lat")]
    pub lat: f64,
    /// Geonames feature code.
    pub fcode: String,
    /// Population count.
    pub population: i64,
    /// Distance from the footprint centroid, in degrees.
    #[serde(rename = "distanceToCentroid")]
    pub distance_to_centroid: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_sets() {
        assert_eq!(PLACE_CODES.len(), 7);
        for code in MAIN_PLACE_CODES {
            assert!(PLACE_CODES.contains(code));
        }
    }
}
