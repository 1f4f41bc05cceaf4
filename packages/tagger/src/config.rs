//! Engine configuration.

/// Configuration threaded from the orchestrator down to every tagger.
#[derive(Debug, Clone)]
pub struct TagConfig {
    /// Maximum footprint area (km²) above which expensive computation
    /// (land cover, extended toponyms) is skipped.
    pub area_limit: f64,
    /// Attach simplified intersection WKT to overlay results.
    pub return_geometries: bool,
    /// Simplification tolerance, in degrees.
    pub geometry_tolerance: f64,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            area_limit: 200_000.0,
            return_geometries: false,
            geometry_tolerance: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TagConfig::default();
        assert!((config.area_limit - 200_000.0).abs() < f64::EPSILON);
        assert!(!config.return_geometries);
        assert!((config.geometry_tolerance - 0.1).abs() < f64::EPSILON);
    }
}
