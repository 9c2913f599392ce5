//! Mosaic construction for the focus metric.
//!
//! A mosaic tiles four same-shaped images into a 2x2 grid. Quadrants are
//! numbered column-major: top-left, bottom-left, top-right, bottom-right.

use std::collections::BTreeMap;

use burn::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    error::{LocalisationError, LocalisationResult},
    metrics::MosaicBatch,
};

/// Tiles four `[C, H, W]` images into one `[C, 2H, 2W]` mosaic.
///
/// # Errors
///
/// Returns `Err(LocalisationError::ShapeMismatch)` if the tiles differ in shape.
pub fn compose_mosaic<B: Backend>(tiles: [Tensor<B, 3>; 4]) -> LocalisationResult<Tensor<B, 3>> {
    let shape = tiles[0].dims();
    if let Some(tile) = tiles.iter().find(|tile| tile.dims() != shape) {
        return Err(LocalisationError::ShapeMismatch {
            expected: format!("four tiles of shape {shape:?}"),
            actual: format!("a tile of shape {:?}", tile.dims()),
        });
    }

    let [top_left, bottom_left, top_right, bottom_right] = tiles;
    let left = Tensor::cat(vec![top_left, bottom_left], 1);
    let right = Tensor::cat(vec![top_right, bottom_right], 1);
    Ok(Tensor::cat(vec![left, right], 2))
}

/// Mosaics built from a labelled image batch.
#[derive(Debug, Clone)]
pub struct MosaicSet<B: Backend> {
    /// `[M, C, 2H, 2W]`.
    pub mosaics: Tensor<B, 4>,
    /// Source image index of each quadrant.
    pub quadrant_indices: Vec<[usize; 4]>,
    /// Class label of each quadrant.
    pub quadrant_labels: Vec<[i64; 4]>,
    /// Whether each quadrant shows the mosaic's target class.
    pub quadrant_flags: Vec<[bool; 4]>,
    /// Target class of each mosaic.
    pub targets: Vec<i64>,
}

impl<B: Backend> MosaicSet<B> {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Converts the set into a focus batch, optionally with attributions.
    pub fn into_batch(self, attributions: Option<Tensor<B, 4>>) -> MosaicBatch<B> {
        let device = self.mosaics.device();
        let count = self.targets.len();
        let targets = Tensor::from_data(TensorData::new(self.targets, [count]), &device);
        let batch = MosaicBatch::new(self.mosaics, targets, self.quadrant_flags);
        match attributions {
            Some(attributions) => batch.with_attributions(attributions),
            None => batch,
        }
    }
}

/// Builds `mosaics_per_class` mosaics for every class with at least two
/// images.
///
/// Each mosaic holds two images of its target class and two images of one
/// other randomly chosen class, at shuffled positions. The result is fully
/// determined by `seed`.
///
/// # Errors
///
/// - `ShapeMismatch` if `labels` does not hold one label per image
/// - `UnsupportedConfiguration` if `mosaics_per_class` is zero or fewer than
///   two classes have at least two images
pub fn mosaic_creation<B: Backend>(
    images: Tensor<B, 4>,
    labels: &[i64],
    mosaics_per_class: usize,
    seed: u64,
) -> LocalisationResult<MosaicSet<B>> {
    let [count, channels, height, width] = images.dims();
    if labels.len() != count {
        return Err(LocalisationError::ShapeMismatch {
            expected: format!("{count} labels"),
            actual: format!("{} labels", labels.len()),
        });
    }
    if mosaics_per_class == 0 {
        return Err(LocalisationError::UnsupportedConfiguration {
            reason: "mosaics_per_class must be at least 1".to_owned(),
        });
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (index, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(index);
    }
    by_class.retain(|_, indices| indices.len() >= 2);
    if by_class.len() < 2 {
        return Err(LocalisationError::UnsupportedConfiguration {
            reason: "mosaics need at least two classes with two images each".to_owned(),
        });
    }
    let classes: Vec<i64> = by_class.keys().copied().collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let tile = |index: usize| {
        images
            .clone()
            .narrow(0, index, 1)
            .reshape([channels, height, width])
    };

    let capacity = classes.len() * mosaics_per_class;
    let mut mosaics = Vec::with_capacity(capacity);
    let mut quadrant_indices = Vec::with_capacity(capacity);
    let mut quadrant_labels = Vec::with_capacity(capacity);
    let mut quadrant_flags = Vec::with_capacity(capacity);
    let mut targets = Vec::with_capacity(capacity);

    for &target in &classes {
        let others: Vec<i64> = classes.iter().copied().filter(|&c| c != target).collect();
        for _ in 0..mosaics_per_class {
            let Some(&other) = others.choose(&mut rng) else {
                continue;
            };

            let mut quadrants: Vec<(usize, i64)> = by_class[&target]
                .choose_multiple(&mut rng, 2)
                .map(|&index| (index, target))
                .chain(
                    by_class[&other]
                        .choose_multiple(&mut rng, 2)
                        .map(|&index| (index, other)),
                )
                .collect();
            quadrants.shuffle(&mut rng);

            let indices: [usize; 4] = core::array::from_fn(|q| quadrants[q].0);
            let tile_labels: [i64; 4] = core::array::from_fn(|q| quadrants[q].1);

            mosaics.push(compose_mosaic(indices.map(&tile))?);
            quadrant_indices.push(indices);
            quadrant_labels.push(tile_labels);
            quadrant_flags.push(tile_labels.map(|label| label == target));
            targets.push(target);
        }
    }

    tracing::debug!(
        mosaics = targets.len(),
        classes = classes.len(),
        "created mosaics"
    );
    Ok(MosaicSet {
        mosaics: Tensor::stack(mosaics, 0),
        quadrant_indices,
        quadrant_labels,
        quadrant_flags,
        targets,
    })
}
