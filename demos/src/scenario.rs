//! Synthetic localisation scenarios.
//!
//! Every sample is a `side x side` image whose mask marks the top-left
//! quarter. The attribution map is low noise plus a hot patch the size of the
//! mask, placed according to [`Placement`].

use burn::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use localisation::Batch;

const HOT_VALUE: f32 = 1.0;
const NOISE: f32 = 0.1;

/// Where the hot patch of the attribution map sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// On the mask.
    Inside,
    /// Half on the mask, half beside it.
    Straddling,
    /// In the bottom-right quarter, disjoint from the mask.
    Outside,
}

impl Placement {
    pub const ALL: [Self; 3] = [Self::Inside, Self::Straddling, Self::Outside];

    /// Top-left corner of the hot patch.
    const fn origin(self, half: usize) -> (usize, usize) {
        match self {
            Self::Inside => (0, 0),
            Self::Straddling => (0, half / 2),
            Self::Outside => (half, half),
        }
    }
}

/// Builds a scenario batch of `samples` single-channel images.
///
/// Inputs are uniform noise; targets cycle through ten classes.
pub fn synthetic_batch<B: Backend>(
    placement: Placement,
    samples: usize,
    side: usize,
    seed: u64,
    device: &B::Device,
) -> Batch<B, 4> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = side / 2;
    let (top, left) = placement.origin(half);
    let pixels = side * side;

    let mut inputs = Vec::with_capacity(samples * pixels);
    let mut attributions = Vec::with_capacity(samples * pixels);
    let mut masks = Vec::with_capacity(samples * pixels);
    for _ in 0..samples {
        inputs.extend((0..pixels).map(|_| rng.gen::<f32>()));
        for row in 0..side {
            for col in 0..side {
                let hot = (top..top + half).contains(&row) && (left..left + half).contains(&col);
                attributions.push(if hot {
                    HOT_VALUE
                } else {
                    rng.gen_range(0.0..NOISE)
                });
                masks.push(if row < half && col < half { 1.0f32 } else { 0.0 });
            }
        }
    }

    let shape = [samples, 1, side, side];
    let labels: Vec<i64> = (0..samples as i64).map(|i| i % 10).collect();
    Batch::new(
        Tensor::from_data(TensorData::new(inputs, shape), device),
        Tensor::from_data(TensorData::new(labels, [samples]), device),
    )
    .with_attributions(Tensor::from_data(TensorData::new(attributions, shape), device))
    .with_masks(Tensor::from_data(TensorData::new(masks, shape), device))
}

/// Labelled single-channel images for mosaic construction.
///
/// Class `c` images carry a bright vertical bar at a class-specific column,
/// which the Sobel baseline responds to.
pub fn labelled_images<B: Backend>(
    classes: usize,
    per_class: usize,
    side: usize,
    seed: u64,
    device: &B::Device,
) -> (Tensor<B, 4>, Vec<i64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let pixels = side * side;
    let count = classes * per_class;

    let mut values = Vec::with_capacity(count * pixels);
    let mut labels = Vec::with_capacity(count);
    for class in 0..classes {
        let bar = (class + 1) * side / (classes + 1);
        for _ in 0..per_class {
            for _ in 0..side {
                for col in 0..side {
                    values.push(if col == bar {
                        1.0
                    } else {
                        rng.gen_range(0.0..NOISE)
                    });
                }
            }
            labels.push(class as i64);
        }
    }

    let images = Tensor::from_data(TensorData::new(values, [count, 1, side, side]), device);
    (images, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn scenario_batches_carry_masks_and_attributions() {
        let batch =
            synthetic_batch::<TestBackend>(Placement::Outside, 3, 8, 1, &Default::default());
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.inputs.dims(), [3, 1, 8, 8]);

        let masks = batch.masks.unwrap().into_data().to_vec::<f32>().unwrap();
        assert_eq!(masks.iter().filter(|&&m| m == 1.0).count(), 3 * 16);

        let attributions = batch.attributions.unwrap().into_data().to_vec::<f32>().unwrap();
        assert!(attributions[0] < NOISE);
        assert_eq!(attributions[63], HOT_VALUE);
    }

    #[test]
    fn labelled_images_cover_every_class() {
        let (images, labels) = labelled_images::<TestBackend>(3, 2, 8, 0, &Default::default());
        assert_eq!(images.dims(), [6, 1, 8, 8]);
        assert_eq!(labels, vec![0, 0, 1, 1, 2, 2]);
    }
}
