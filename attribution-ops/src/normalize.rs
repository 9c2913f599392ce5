//! Value-range helpers for flattened attribution maps.

/// Smallest and largest finite value of a map, or `None` when there is none.
pub fn value_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Whether every finite value of the map is identical.
pub fn is_constant(values: &[f32]) -> bool {
    value_range(values).map_or(true, |(lo, hi)| lo == hi)
}

/// Rescales the map in place to `[0, 1]` with `(x - min) / (max - min)`.
///
/// A map without spread is left untouched. Returns whether the map was rescaled.
pub fn normalize(values: &mut [f32]) -> bool {
    let Some((lo, hi)) = value_range(values) else {
        return false;
    };
    let range = hi - lo;
    if range <= 0.0 {
        return false;
    }
    for v in values.iter_mut() {
        *v = (*v - lo) / range;
    }
    true
}

/// Thresholds a map: positions at or above `threshold` become `true`.
pub fn binarize(values: &[f32], threshold: f32) -> Vec<bool> {
    values.iter().map(|&v| v >= threshold).collect()
}

/// Sum of the strictly positive entries, accumulated in `f64`.
pub fn positive_mass(values: &[f32]) -> f64 {
    values
        .iter()
        .filter(|&&v| v > 0.0)
        .map(|&v| f64::from(v))
        .sum()
}
