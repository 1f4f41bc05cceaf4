//! Shared coverage arithmetic used by every tagger.

/// Percentage of `part` relative to `total`, truncated (not rounded)
/// to two decimals. Callers must exclude records with a zero or
/// undefined `total` before calling.
#[must_use]
pub fn percentage(part: f64, total: f64) -> f64 {
    (10_000.0 * (part / total)).floor() / 100.0
}

/// Converts an oracle-reported area (square meters) to km².
#[must_use]
pub const fn to_square_km(area_m2: f64) -> f64 {
    area_m2 / 1_000_000.0
}

/// True iff the area is positive and within the configured ceiling.
/// Used as admission control for expensive per-tagger computation.
#[must_use]
pub fn is_valid_area(area: f64, limit: f64) -> bool {
    area > 0.0 && area <= limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_truncates() {
        // 37.029% truncates to 37.02, never rounds to 37.03.
        assert!((percentage(37.029, 100.0) - 37.02).abs() < 1e-9);
        assert!((percentage(0.999_99, 100.0) - 0.99).abs() < 1e-9);
        assert!((percentage(50.0, 100.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_full_cover() {
        assert!((percentage(123.456, 123.456) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_insignificant_is_zero() {
        // Below 0.01% truncates to exactly 0, which callers drop.
        assert!((percentage(0.000_01, 100.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn square_km_conversion() {
        assert!((to_square_km(1_000_000.0) - 1.0).abs() < f64::EPSILON);
        assert!((to_square_km(3_483_535_110.0) - 3_483.535_11).abs() < 1e-9);
    }

    #[test]
    fn area_admission_control() {
        assert!(is_valid_area(1.0, 200_000.0));
        assert!(is_valid_area(200_000.0, 200_000.0));
        assert!(!is_valid_area(200_000.1, 200_000.0));
        assert!(!is_valid_area(0.0, 200_000.0));
        assert!(!is_valid_area(-5.0, 200_000.0));
    }
}
