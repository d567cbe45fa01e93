//! Segment naming: turns opaque cluster statistics into business labels.
//!
//! Naming is a pure function of cluster monetary average, overall monetary
//! average, and relative cluster size — no randomness, so identical clustering
//! output always yields identical names. Two clusters may legitimately
//! receive the same name; downstream aggregation groups by name.
//!
//! The monetary basis is the RAW per-cluster mean of the primary monetary
//! field (not the normalized centroid value): simpler to explain and
//! independent of the scaler.

/// Ratio of cluster average to overall average above which a cluster is
/// high-value.
const HIGH_VALUE_RATIO: f64 = 1.5;
/// Ratio above which a cluster is around the norm.
const CORE_RATIO: f64 = 0.8;
/// Ratio above which a low-value cluster still shows growth potential.
const GROWTH_RATIO: f64 = 0.3;

/// Label a cluster from its raw monetary average.
///
/// `overall_avg == 0` is guarded by treating the ratio as 0, pushing the
/// cluster into the lowest band instead of producing NaN.
pub fn name_by_value(avg_value: f64, overall_avg: f64, relative_size: f64) -> &'static str {
    let ratio = if overall_avg == 0.0 {
        0.0
    } else {
        avg_value / overall_avg
    };

    if ratio > HIGH_VALUE_RATIO {
        if relative_size > 0.15 {
            "High Value"
        } else {
            "Premium"
        }
    } else if ratio > CORE_RATIO {
        if relative_size > 0.25 {
            "Core Customers"
        } else {
            "Regular"
        }
    } else if ratio > GROWTH_RATIO {
        "Potential Growth"
    } else if relative_size > 0.2 {
        "Entry Level"
    } else {
        "At Risk"
    }
}

/// Size-only fallback labels, used when no monetary feature exists.
pub fn name_by_size(relative_size: f64) -> &'static str {
    if relative_size > 0.3 {
        "Majority Segment"
    } else if relative_size > 0.2 {
        "Significant Group"
    } else if relative_size > 0.1 {
        "Niche Segment"
    } else {
        "Emerging Group"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_bands() {
        // ratio 2.0
        assert_eq!(name_by_value(200.0, 100.0, 0.5), "High Value");
        assert_eq!(name_by_value(200.0, 100.0, 0.1), "Premium");
        // ratio 1.0
        assert_eq!(name_by_value(100.0, 100.0, 0.5), "Core Customers");
        assert_eq!(name_by_value(100.0, 100.0, 0.2), "Regular");
        // ratio 0.5
        assert_eq!(name_by_value(50.0, 100.0, 0.5), "Potential Growth");
        // ratio 0.1
        assert_eq!(name_by_value(10.0, 100.0, 0.5), "Entry Level");
        assert_eq!(name_by_value(10.0, 100.0, 0.1), "At Risk");
    }

    #[test]
    fn test_zero_overall_average_guard() {
        assert_eq!(name_by_value(0.0, 0.0, 0.05), "At Risk");
        assert_eq!(name_by_value(100.0, 0.0, 0.5), "Entry Level");
    }

    #[test]
    fn test_size_bands() {
        assert_eq!(name_by_size(0.6), "Majority Segment");
        assert_eq!(name_by_size(0.25), "Significant Group");
        assert_eq!(name_by_size(0.15), "Niche Segment");
        assert_eq!(name_by_size(0.05), "Emerging Group");
    }

    #[test]
    fn test_naming_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(name_by_value(930.0, 1090.0, 0.9), name_by_value(930.0, 1090.0, 0.9));
            assert_eq!(name_by_size(0.42), name_by_size(0.42));
        }
    }

    #[test]
    fn test_outlier_scenario_bands() {
        // One 10000 outlier among nine 100s: overall average is 1090.
        let overall = 1090.0;
        assert_eq!(name_by_value(10_000.0, overall, 0.1), "Premium");
        assert_eq!(name_by_value(100.0, overall, 0.9), "Entry Level");
    }
}
