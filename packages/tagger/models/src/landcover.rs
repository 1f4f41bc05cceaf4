//! Land-cover taxonomy: 22 GLC2000 leaf classes grouped into 8 parent
//! classes through a fixed linkage table.

use serde::Serialize;

/// Parent (aggregated) land-cover class names, keyed by class code.
pub const PARENT_CLASS_NAMES: &[(u32, &str)] = &[
    (100, "Urban"),
    (200, "Cultivated"),
    (310, "Forest"),
    (320, "Herbaceous"),
    (330, "Desert"),
    (335, "Ice"),
    (400, "Flooded"),
    (500, "Water"),
];

/// GLC2000 leaf class names, keyed by the `dn` code stored in the
/// land-cover reference table.
pub const LEAF_CLASS_NAMES: &[(u32, &str)] = &[
    (1, "Tree Cover, Broadleaved, Evergreen"),
    (2, "Tree Cover, Broadleaved, Deciduous, Closed"),
    (3, "Tree Cover, Broadleaved, Feciduous, Open"),
    (4, "Tree Cover, Needle-leaved, Evergreen"),
    (5, "Tree Cover, Needle-leaved, Deciduous"),
    (6, "Tree Cover, Mixed Leaf Type"),
    (7, "Tree Cover, Regularly Fooded, Fresh  Water"),
    (8, "Tree Cover, Regularly Flooded, Saline Water"),
    (9, "Mosaic - Tree Cover / Other Natural Vegetation"),
    (10, "Tree Cover, Burnt"),
    (11, "Shrub Cover, Closed-open, Evergreen"),
    (12, "Shrub Cover, Closed-open, Deciduous"),
    (13, "Herbaceous Cover, Closed-open"),
    (14, "Sparse Herbaceous Or Sparse Shrub Cover"),
    (15, "Regularly Flooded Shrub And/Or Herbaceous Cover"),
    (16, "Cultivated And Managed Areas"),
    (17, "Mosaic - Cropland / Tree Cover / Other Natural Vegetation"),
    (18, "Mosaic - Cropland / Shrub Or Grass Cover"),
    (19, "Bare Areas"),
    (20, "Water Bodies"),
    (21, "Snow And Ice"),
    (22, "Artificial Surfaces And Associated Areas"),
];

/// Parent-to-leaf linkage. Every leaf code belongs to exactly one
/// parent.
pub const LINKAGE: &[(u32, &[u32])] = &[
    (100, &[22]),               // Urban
    (200, &[15, 16, 17, 18]),   // Cultivated
    (310, &[1, 2, 3, 4, 5, 6]), // Forest
    (320, &[9, 11, 12, 13]),    // Herbaceous
    (330, &[10, 14, 19]),       // Desert
    (335, &[21]),               // Ice
    (400, &[7, 8]),             // Flooded
    (500, &[20]),               // Water
];

/// Returns the parent class name for a parent code, or "unknown".
#[must_use]
pub fn parent_class_name(code: u32) -> &'static str {
    PARENT_CLASS_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or("unknown", |(_, name)| *name)
}

/// Returns the leaf class name for a leaf code, or "unknown".
#[must_use]
pub fn leaf_class_name(code: u32) -> &'static str {
    LEAF_CLASS_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or("unknown", |(_, name)| *name)
}

/// Returns the parent class name owning a leaf code, or "unknown".
#[must_use]
pub fn parent_of_leaf(code: u32) -> &'static str {
    LINKAGE
        .iter()
        .find(|(_, leaves)| leaves.contains(&code))
        .map_or("unknown", |(parent, _)| parent_class_name(*parent))
}

/// A ranked parent-class entry in the `main` land-cover list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandCoverMain {
    /// Parent class name.
    pub name: &'static str,
    /// Synthesized id (`lc:<name>`).
    pub id: String,
    /// Aggregated intersection area in km².
    pub area: f64,
    /// Percent of the footprint covered by this class.
    pub pcover: f64,
}

/// A leaf-class entry in the `details` land-cover list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandCoverDetail {
    /// Leaf class name.
    pub name: &'static str,
    /// Synthesized id (`lcd:<name without separators>`).
    pub id: String,
    /// Id of the owning parent class (`lc:<parent name>`).
    #[serde(rename = "parentId")]
    pub parent_id: String,
    /// Leaf class code.
    pub code: u32,
    /// Intersection area in km².
    pub area: f64,
    /// Percent of the footprint covered by this class.
    pub pcover: f64,
    /// Simplified intersection geometry, when geometry return is
    /// enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_counts() {
        assert_eq!(LEAF_CLASS_NAMES.len(), 22);
        assert_eq!(PARENT_CLASS_NAMES.len(), 8);
        assert_eq!(LINKAGE.len(), 8);
    }

    #[test]
    fn every_leaf_has_exactly_one_parent() {
        for (code, _) in LEAF_CLASS_NAMES {
            let owners = LINKAGE
                .iter()
                .filter(|(_, leaves)| leaves.contains(code))
                .count();
            assert_eq!(owners, 1, "leaf {code} owned by {owners} parents");
        }
    }

    #[test]
    fn linkage_codes_are_known_leaves() {
        for (parent, leaves) in LINKAGE {
            assert_ne!(parent_class_name(*parent), "unknown");
            for leaf in *leaves {
                assert_ne!(leaf_class_name(*leaf), "unknown", "leaf {leaf}");
            }
        }
    }

    #[test]
    fn forest_parent() {
        assert_eq!(parent_of_leaf(4), "Forest");
        assert_eq!(parent_of_leaf(22), "Urban");
        assert_eq!(parent_of_leaf(99), "unknown");
    }
}
