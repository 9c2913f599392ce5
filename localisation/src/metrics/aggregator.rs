//! Reduction of per-sample scores to a single value.

use crate::config::AggregationFunc;

/// Reduces `scores` with `func`. An empty slice reduces to NaN.
pub fn aggregate(scores: &[f64], func: &AggregationFunc) -> f64 {
    if scores.is_empty() {
        return f64::NAN;
    }

    match func {
        AggregationFunc::Mean => scores.iter().sum::<f64>() / scores.len() as f64,
        AggregationFunc::Median => {
            let mut sorted = scores.to_vec();
            sorted.sort_unstable_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_scores() {
        assert_relative_eq!(aggregate(&[1.0, 0.0, 0.5, 0.5], &AggregationFunc::Mean), 0.5);
    }

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_relative_eq!(aggregate(&[0.9, 0.1, 0.4], &AggregationFunc::Median), 0.4);
        assert_relative_eq!(
            aggregate(&[1.0, 0.0, 0.2, 0.6], &AggregationFunc::Median),
            0.4
        );
    }

    #[test]
    fn empty_scores_aggregate_to_nan() {
        assert!(aggregate(&[], &AggregationFunc::Mean).is_nan());
        assert!(aggregate(&[], &AggregationFunc::Median).is_nan());
    }
}
