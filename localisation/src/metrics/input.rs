//! Batches handed to metrics.
//!
//! A batch is borrowed for the duration of one call; metrics never keep it.

use burn::prelude::*;

/// One mini-batch for a mask-based localisation metric.
///
/// `inputs` is channel-first with an explicit batch axis: `[N, C, L]` for
/// signals, `[N, C, H, W]` for images. `attributions` and `masks` share the
/// input's batch and spatial shape with a single channel.
#[derive(Debug, Clone)]
pub struct Batch<B: Backend, const D: usize> {
    pub inputs: Tensor<B, D>,
    pub targets: Tensor<B, 1, Int>,
    pub attributions: Option<Tensor<B, D>>,
    pub masks: Option<Tensor<B, D>>,
}

impl<B: Backend, const D: usize> Batch<B, D> {
    pub fn new(inputs: Tensor<B, D>, targets: Tensor<B, 1, Int>) -> Self {
        Self {
            inputs,
            targets,
            attributions: None,
            masks: None,
        }
    }

    #[must_use]
    pub fn with_attributions(mut self, attributions: Tensor<B, D>) -> Self {
        self.attributions = Some(attributions);
        self
    }

    #[must_use]
    pub fn with_masks(mut self, masks: Tensor<B, D>) -> Self {
        self.masks = Some(masks);
        self
    }

    /// Number of samples on the batch axis.
    pub fn len(&self) -> usize {
        self.inputs.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One mini-batch of 2x2 mosaics for the focus metric.
///
/// `quadrant_flags[i][q]` marks whether quadrant `q` of mosaic `i` shows the
/// target class. Quadrants are numbered column-major: top-left, bottom-left,
/// top-right, bottom-right.
#[derive(Debug, Clone)]
pub struct MosaicBatch<B: Backend> {
    pub inputs: Tensor<B, 4>,
    pub targets: Tensor<B, 1, Int>,
    pub attributions: Option<Tensor<B, 4>>,
    pub quadrant_flags: Vec<[bool; 4]>,
}

impl<B: Backend> MosaicBatch<B> {
    pub fn new(
        inputs: Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
        quadrant_flags: Vec<[bool; 4]>,
    ) -> Self {
        Self {
            inputs,
            targets,
            attributions: None,
            quadrant_flags,
        }
    }

    #[must_use]
    pub fn with_attributions(mut self, attributions: Tensor<B, 4>) -> Self {
        self.attributions = Some(attributions);
        self
    }
}
