//! Explanation collaborators.
//!
//! A metric calls an [`Explainer`] only when a batch arrives without
//! attributions. Any closure with the right signature is an explainer; two
//! control-variate baselines ship with the crate:
//!
//! - [`ConstantExplainer`] fills every pixel with one value
//! - [`SobelExplainer`] responds to intensity changes along the width axis

use burn::{
    prelude::*,
    tensor::{module::conv2d, ops::ConvOptions, ElementConversion},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::FillValue,
    error::LocalisationResult,
    model::ModelInterface,
};
use attribution_ops::AttributionTensorOps;

/// Options forwarded to every explainer call.
#[derive(Config, Debug)]
pub struct ExplainOptions {
    /// Seed for explainers that draw random values.
    #[config(default = 42)]
    pub seed: u64,
    /// Take the absolute value of the produced attributions.
    #[config(default = false)]
    pub abs: bool,
    /// Zero negative attributions.
    #[config(default = false)]
    pub pos_only: bool,
    /// Zero positive attributions.
    #[config(default = false)]
    pub neg_only: bool,
    /// Min-max normalize each produced attribution map.
    #[config(default = true)]
    pub normalise: bool,
}

impl ExplainOptions {
    /// Applies the post-processing flags to freshly produced attributions,
    /// in the order abs, pos_only, neg_only, normalise.
    pub fn post_process<B: Backend, const D: usize>(&self, mut attributions: Tensor<B, D>) -> Tensor<B, D> {
        if self.abs {
            attributions = attributions.abs();
        }
        if self.pos_only {
            attributions = attributions.keep_positive();
        }
        if self.neg_only {
            attributions = attributions.keep_negative();
        }
        if self.normalise {
            attributions = attributions.normalize_per_sample();
        }
        attributions
    }
}

/// Produces one attribution map per input sample.
///
/// The result has the input's batch and spatial shape. Its channel axis is
/// either 1 or the input's channel count, in which case it is summed away.
pub trait Explainer<B: Backend, const D: usize> {
    /// # Errors
    ///
    /// Errors are propagated to the metric caller unmodified.
    fn explain(
        &self,
        model: &dyn ModelInterface<B, D>,
        inputs: Tensor<B, D>,
        targets: Tensor<B, 1, Int>,
        options: &ExplainOptions,
    ) -> LocalisationResult<Tensor<B, D>>;
}

impl<B, F, const D: usize> Explainer<B, D> for F
where
    B: Backend,
    F: Fn(
        &dyn ModelInterface<B, D>,
        Tensor<B, D>,
        Tensor<B, 1, Int>,
        &ExplainOptions,
    ) -> LocalisationResult<Tensor<B, D>>,
{
    fn explain(
        &self,
        model: &dyn ModelInterface<B, D>,
        inputs: Tensor<B, D>,
        targets: Tensor<B, 1, Int>,
        options: &ExplainOptions,
    ) -> LocalisationResult<Tensor<B, D>> {
        self(model, inputs, targets, options)
    }
}

/// Baseline that assigns the same value to every pixel.
#[derive(Debug, Clone)]
pub struct ConstantExplainer {
    fill: FillValue,
}

impl ConstantExplainer {
    pub const fn new(fill: FillValue) -> Self {
        Self { fill }
    }

    fn fill_value<B: Backend, const D: usize>(&self, inputs: &Tensor<B, D>, seed: u64) -> f32 {
        match &self.fill {
            FillValue::Black => inputs.clone().min().into_scalar().elem::<f32>(),
            FillValue::White => inputs.clone().max().into_scalar().elem::<f32>(),
            FillValue::Random => StdRng::seed_from_u64(seed).gen::<f32>(),
            FillValue::Uniform => {
                let lo = inputs.clone().min().into_scalar().elem::<f32>();
                let hi = inputs.clone().max().into_scalar().elem::<f32>();
                if lo < hi {
                    StdRng::seed_from_u64(seed).gen_range(lo..hi)
                } else {
                    lo
                }
            }
            FillValue::Value(value) => *value,
        }
    }
}

impl<B: Backend, const D: usize> Explainer<B, D> for ConstantExplainer {
    fn explain(
        &self,
        _model: &dyn ModelInterface<B, D>,
        inputs: Tensor<B, D>,
        _targets: Tensor<B, 1, Int>,
        options: &ExplainOptions,
    ) -> LocalisationResult<Tensor<B, D>> {
        let mut dims = inputs.dims();
        dims[1] = 1;
        let value = self.fill_value(&inputs, options.seed);
        let attributions = Tensor::<B, D>::full(dims, value, &inputs.device());
        Ok(options.post_process(attributions))
    }
}

/// Baseline that responds to intensity changes along the width axis.
///
/// Each sample `[C, H, W]` is filtered with the separable Sobel operator: a
/// central difference along the width, `[1, 2, 1]` smoothing along the
/// height and the channels. Borders replicate the edge value. The response
/// is clipped to `[0, 1]` and averaged over the channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct SobelExplainer;

impl SobelExplainer {
    fn kernel<B: Backend>(device: &B::Device) -> Tensor<B, 4> {
        let weights: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
        Tensor::<B, 1>::from_floats(weights.as_slice(), device).reshape([1, 1, 3, 3])
    }
}

/// Extends `dim` by one copy of its first and last slice.
fn replicate_pad<B: Backend>(tensor: Tensor<B, 4>, dim: usize) -> Tensor<B, 4> {
    let len = tensor.dims()[dim];
    let first = tensor.clone().narrow(dim, 0, 1);
    let last = tensor.clone().narrow(dim, len - 1, 1);
    Tensor::cat(vec![first, tensor, last], dim)
}

impl<B: Backend> Explainer<B, 4> for SobelExplainer {
    fn explain(
        &self,
        _model: &dyn ModelInterface<B, 4>,
        inputs: Tensor<B, 4>,
        _targets: Tensor<B, 1, Int>,
        options: &ExplainOptions,
    ) -> LocalisationResult<Tensor<B, 4>> {
        let [batch, channels, height, width] = inputs.dims();
        if batch * channels * height * width == 0 {
            return Ok(Tensor::zeros([batch, 1, height, width], &inputs.device()));
        }
        let device = inputs.device();

        let padded = [1, 2, 3]
            .into_iter()
            .fold(inputs, |tensor, dim| replicate_pad(tensor, dim));
        let smoothed = padded.clone().narrow(1, 0, channels)
            + padded.clone().narrow(1, 1, channels) * 2.0
            + padded.narrow(1, 2, channels);

        // Every channel is filtered independently through a single-channel kernel.
        let planes = smoothed.reshape([batch * channels, 1, height + 2, width + 2]);
        let options_2d = ConvOptions::new([1, 1], [0, 0], [1, 1], 1);
        let response = conv2d(planes, Self::kernel::<B>(&device), None, options_2d);

        let attributions = response
            .reshape([batch, channels, height, width])
            .clamp(0.0, 1.0)
            .mean_dim(1);
        Ok(options.post_process(attributions))
    }
}
