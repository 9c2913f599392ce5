//! # Ranking and region membership
//!
//! Selection of the most relevant positions of a flattened attribution map and
//! membership tests of those positions against a binary region of interest.
//!
//! Every ordering in this module is total and deterministic: values are
//! compared in descending order and ties are resolved in favour of the lower
//! flat index, so a map always ranks the same way regardless of the sort
//! algorithm underneath.

use core::cmp::Ordering;

/// Maps a value onto the key used for ranking.
///
/// `-0.0` collapses onto `0.0` and NaN sinks below every finite value.
#[inline]
pub(crate) fn rank_key(value: f32) -> f32 {
    if value.is_nan() {
        f32::NEG_INFINITY
    } else {
        value + 0.0
    }
}

#[inline]
fn rank_order(values: &[f32], a: usize, b: usize) -> Ordering {
    rank_key(values[b])
        .total_cmp(&rank_key(values[a]))
        .then(a.cmp(&b))
}

/// Returns the flat indices of the `k` largest values, most relevant first.
///
/// `k` is clamped to `values.len()`. Ties are broken by the lower flat index.
pub fn top_k_indices(values: &[f32], k: usize) -> Vec<usize> {
    let k = k.min(values.len());
    if k == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..values.len()).collect();
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, |&a, &b| rank_order(values, a, b));
        indices.truncate(k);
    }
    indices.sort_unstable_by(|&a, &b| rank_order(values, a, b));
    indices
}

/// Returns every flat index holding the maximum value, in ascending order.
pub fn max_indices(values: &[f32]) -> Vec<usize> {
    let Some(max) = values
        .iter()
        .map(|&v| rank_key(v))
        .max_by(|a, b| a.total_cmp(b))
    else {
        return Vec::new();
    };

    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| rank_key(v) == max)
        .map(|(i, _)| i)
        .collect()
}

/// Counts how many of `indices` fall inside `mask`.
///
/// Indices beyond the mask are treated as outside the region.
pub fn region_membership(indices: &[usize], mask: &[bool]) -> usize {
    indices
        .iter()
        .filter(|&&i| mask.get(i).copied().unwrap_or(false))
        .count()
}

/// Fraction of `indices` that fall inside `mask`; zero for an empty selection.
pub fn region_fraction(indices: &[usize], mask: &[bool]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    region_membership(indices, mask) as f64 / indices.len() as f64
}

/// Number of set entries in a binary mask.
pub fn region_size(mask: &[bool]) -> usize {
    mask.iter().filter(|&&m| m).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn top_k_prefers_larger_values() {
        let values = [0.1, 0.9, 0.3, 0.7];
        assert_eq!(top_k_indices(&values, 2), vec![1, 3]);
    }

    #[test]
    fn top_k_breaks_ties_by_lower_index() {
        let values = [0.5, 1.0, 0.5, 1.0, 0.5];
        assert_eq!(top_k_indices(&values, 3), vec![1, 3, 0]);
        assert_eq!(top_k_indices(&values, 4), vec![1, 3, 0, 2]);
    }

    #[test]
    fn top_k_clamps_to_length() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(top_k_indices(&values, 10), vec![0, 2, 1]);
        assert!(top_k_indices(&values, 0).is_empty());
        assert!(top_k_indices(&[], 4).is_empty());
    }

    #[test]
    fn top_k_treats_signed_zeros_as_ties() {
        let values = [-0.0, 0.0, -0.0];
        assert_eq!(top_k_indices(&values, 2), vec![0, 1]);
    }

    #[test]
    fn top_k_ranks_nan_last() {
        let values = [f32::NAN, -5.0, 2.0];
        assert_eq!(top_k_indices(&values, 3), vec![2, 1, 0]);
    }

    #[test]
    fn max_indices_returns_every_tie() {
        let values = [0.2, 0.8, 0.8, 0.1];
        assert_eq!(max_indices(&values), vec![1, 2]);
        assert!(max_indices(&[]).is_empty());
    }

    #[test]
    fn membership_counts_only_masked_positions() {
        let mask = [true, false, true, false];
        assert_eq!(region_membership(&[0, 1, 2], &mask), 2);
        assert_eq!(region_membership(&[7], &mask), 0);
        assert!((region_fraction(&[0, 1], &mask) - 0.5).abs() < f64::EPSILON);
        assert_eq!(region_fraction(&[], &mask), 0.0);
        assert_eq!(region_size(&mask), 2);
    }

    proptest! {
        #[test]
        fn top_k_is_sorted_and_stable(
            values in prop::collection::vec(-4i8..4, 1..96),
            k in 0usize..128,
        ) {
            let values: Vec<f32> = values.into_iter().map(f32::from).collect();
            let top = top_k_indices(&values, k);
            prop_assert_eq!(top.len(), k.min(values.len()));

            for pair in top.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(values[a] > values[b] || (values[a] == values[b] && a < b));
            }

            // Nothing left out ranks above the weakest selected position.
            if let Some(&last) = top.last() {
                for i in (0..values.len()).filter(|i| !top.contains(i)) {
                    prop_assert!(values[i] < values[last] || (values[i] == values[last] && i > last));
                }
            }
        }

        #[test]
        fn full_selection_recovers_mask_density(
            mask in prop::collection::vec(any::<bool>(), 1..64),
        ) {
            let values = vec![1.0_f32; mask.len()];
            let top = top_k_indices(&values, mask.len());
            let expected = region_size(&mask) as f64 / mask.len() as f64;
            prop_assert!((region_fraction(&top, &mask) - expected).abs() < 1e-12);
        }
    }
}
