//! Receiver operating characteristic over pixel-level binary labels.
//!
//! Every pixel is a sample, the attribution value is its score and the mask
//! marks the positive class. The threshold sweeps every distinct score from
//! the highest down; tied scores enter the curve together, so a tie between
//! a positive and a negative contributes half a unit of area.

use crate::ranking::rank_key;

/// Area under the ROC curve of `scores` against `labels`.
///
/// Returns `None` when the labels contain a single class, for which the
/// curve is undefined.
///
/// # Panics
///
/// Panics if `scores` and `labels` differ in length.
pub fn roc_auc(scores: &[f32], labels: &[bool]) -> Option<f64> {
    assert_eq!(
        scores.len(),
        labels.len(),
        "scores and labels must have the same length"
    );

    let positives = labels.iter().filter(|&&l| l).count() as u64;
    let negatives = labels.len() as u64 - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_unstable_by(|&a, &b| rank_key(scores[b]).total_cmp(&rank_key(scores[a])));

    // Twice the area, in units of one positive by one negative.
    let mut doubled_area: u64 = 0;
    let (mut tp, mut fp) = (0_u64, 0_u64);
    let mut i = 0;
    while i < order.len() {
        let threshold = rank_key(scores[order[i]]);
        let (prev_tp, prev_fp) = (tp, fp);
        while i < order.len() && rank_key(scores[order[i]]) == threshold {
            if labels[order[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        doubled_area += (fp - prev_fp) * (tp + prev_tp);
    }

    Some(doubled_area as f64 / (2 * positives * negatives) as f64)
}
