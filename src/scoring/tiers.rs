use super::config::{Threshold, Tier};

/// Classify a hazard index against an ordered threshold table.
///
/// Returns the first entry whose upper bound is >= `index`, otherwise the
/// final (unbounded) entry. `None` only for an empty table.
pub fn classify(index: f64, thresholds: &[Threshold]) -> Option<&Threshold> {
    thresholds
        .iter()
        .find(|t| match t.upper {
            Some(upper) => index <= upper,
            None => true,
        })
        .or_else(|| thresholds.last())
}

/// Build a three-entry table from two cutoffs.
pub fn three_tier_table(
    low_upper: f64,
    moderate_upper: f64,
    labels: [&str; 3],
    colors: [&str; 3],
    recommendations: [&str; 3],
) -> Vec<Threshold> {
    let tiers = [Tier::Low, Tier::Moderate, Tier::High];
    let uppers = [Some(low_upper), Some(moderate_upper), None];
    (0..3)
        .map(|i| Threshold {
            upper: uppers[i],
            tier: tiers[i],
            label: labels[i].to_string(),
            color: Some(colors[i].to_string()),
            recommendation: recommendations[i].to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_tier(index: f64, thresholds: &[Threshold]) -> Option<Tier> {
        classify(index, thresholds).map(|t| t.tier)
    }

    fn table(low: f64, moderate: f64) -> Vec<Threshold> {
        three_tier_table(
            low,
            moderate,
            ["gering", "mäßig", "hoch"],
            ["#4CAF50", "#ffa500", "#ff4b4b"],
            ["", "", ""],
        )
    }

    #[test]
    fn test_classify_bounds_are_inclusive() {
        let t = table(2.2, 3.3);
        assert_eq!(classify_tier(2.2, &t), Some(Tier::Low));
        assert_eq!(classify_tier(2.21, &t), Some(Tier::Moderate));
        assert_eq!(classify_tier(3.3, &t), Some(Tier::Moderate));
        assert_eq!(classify_tier(3.31, &t), Some(Tier::High));
    }

    #[test]
    fn test_classify_below_first_bound() {
        let t = table(3.26, 4.21);
        assert_eq!(classify_tier(0.0, &t), Some(Tier::Low));
        assert_eq!(classify(1.0, &t).unwrap().label, "gering");
    }

    #[test]
    fn test_classify_above_all_bounds() {
        let t = table(2.0, 4.0);
        assert_eq!(classify_tier(100.0, &t), Some(Tier::High));
    }

    #[test]
    fn test_classify_falls_back_to_last_entry() {
        // Table with no unbounded entry still yields its last tier
        let mut t = table(2.0, 4.0);
        t[2].upper = Some(5.0);
        assert_eq!(classify_tier(9.0, &t), Some(Tier::High));
    }

    #[test]
    fn test_classify_empty_table() {
        assert!(classify(1.0, &[]).is_none());
    }

    #[test]
    fn test_classify_is_monotonic() {
        for t in [table(2.2, 3.3), table(3.26, 4.21), table(3.15, 3.7), table(2.0, 4.0)] {
            let mut previous = Tier::Low;
            for step in 0..=1000 {
                let index = step as f64 * 0.01;
                let tier = classify_tier(index, &t).unwrap();
                assert!(tier >= previous, "tier dropped at index {}", index);
                previous = tier;
            }
        }
    }
}
