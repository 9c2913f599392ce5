//! Operations on attribution maps for the Burn deep learning framework
//!
//! This crate provides the ranking and region-membership primitives that
//! localisation metrics are built from, plus the tensor-level transforms that
//! prepare a batch of attribution maps before scoring.
//!
//! Tensor transforms work on channel-first batches `[batch, channel, ...]` of
//! any rank. The flat-map functions work on one host-side sample at a time.

use burn::{prelude::*, tensor::DataError};

mod normalize;
mod ranking;
mod roc;

// Convenient re-exports
pub use normalize::{binarize, is_constant, normalize, positive_mass, value_range};
pub use ranking::{
    max_indices, region_fraction, region_membership, region_size, top_k_indices,
};
pub use roc::roc_auc;

/// Attribution-specific operations for Burn tensors laid out as `[batch, channel, ...]`.
pub trait AttributionTensorOps<B: Backend, const D: usize> {
    /// Sums the channel axis away, keeping it as a singleton dimension.
    fn collapse_channels(self) -> Tensor<B, D>;

    /// Zeroes every negative value.
    fn keep_positive(self) -> Tensor<B, D>;

    /// Zeroes every positive value.
    fn keep_negative(self) -> Tensor<B, D>;

    /// Min-max normalizes each sample independently to `[0, 1]`.
    ///
    /// Samples without spread are left unchanged.
    fn normalize_per_sample(self) -> Tensor<B, D>;

    /// Pulls the batch to the host as one flattened `Vec` per sample.
    fn into_samples(self) -> Result<Vec<Vec<f32>>, DataError>;
}

impl<B: Backend, const D: usize> AttributionTensorOps<B, D> for Tensor<B, D> {
    fn collapse_channels(self) -> Tensor<B, D> {
        self.sum_dim(1)
    }

    fn keep_positive(self) -> Tensor<B, D> {
        self.clamp_min(0.0)
    }

    fn keep_negative(self) -> Tensor<B, D> {
        self.clamp_max(0.0)
    }

    fn normalize_per_sample(self) -> Tensor<B, D> {
        let dims = self.dims();
        let samples = dims[0];
        let per_sample: usize = dims.iter().skip(1).product();
        if samples == 0 || per_sample == 0 {
            return self;
        }

        let flat: Tensor<B, 2> = self.reshape([samples, per_sample]);
        let lo = flat.clone().min_dim(1);
        let hi = flat.clone().max_dim(1);
        let range = hi - lo.clone();

        // Flat samples keep their values: shift by zero, divide by one.
        let flat_samples = range.clone().lower_equal_elem(0.0);
        let range = range.mask_fill(flat_samples.clone(), 1.0);
        let lo = lo.mask_fill(flat_samples, 0.0);

        ((flat - lo) / range).reshape(dims)
    }

    fn into_samples(self) -> Result<Vec<Vec<f32>>, DataError> {
        let dims = self.dims();
        let per_sample: usize = dims.iter().skip(1).product();
        if per_sample == 0 {
            return Ok(vec![Vec::new(); dims[0]]);
        }

        let values = self.into_data().convert::<f32>().to_vec::<f32>()?;
        Ok(values.chunks(per_sample).map(<[f32]>::to_vec).collect())
    }
}
