//! Input validation and attribution preparation.
//!
//! Everything a metric needs before scoring happens here, in one pass that
//! either succeeds completely or fails without side effects: shape checks,
//! explanation fill-in, the pixel transforms and the host read-back.

use burn::prelude::*;

use crate::{
    config::EvaluationConfig,
    error::{Degeneracy, DegenerateInput, LocalisationError, LocalisationResult},
    explain::{ExplainOptions, Explainer},
    model::ModelInterface,
};
use attribution_ops::{binarize, is_constant, region_size, AttributionTensorOps};

/// Host-side maps ready for scoring, one flattened `Vec` per sample.
#[derive(Debug)]
pub(crate) struct PreparedBatch {
    pub attributions: Vec<Vec<f32>>,
    pub masks: Option<Vec<Vec<bool>>>,
    /// Spatial shape shared by inputs, attributions and masks.
    pub spatial: Vec<usize>,
    /// Degenerate inputs found while preparing, indexed within the batch.
    pub warnings: Vec<DegenerateInput>,
}

/// The collaborators and settings of one metric call.
pub(crate) struct Preparation<'a, B: Backend, const D: usize> {
    pub model: Option<&'a dyn ModelInterface<B, D>>,
    pub explainer: Option<&'a dyn Explainer<B, D>>,
    pub explain_options: &'a ExplainOptions,
    pub config: &'a EvaluationConfig,
}

fn shape_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> LocalisationError {
    LocalisationError::ShapeMismatch {
        expected: expected.into(),
        actual: actual.into(),
    }
}

fn read_back_failed(what: &str, err: impl core::fmt::Debug) -> LocalisationError {
    LocalisationError::TensorOperationFailed {
        operation: format!("reading {what} back to the host: {err:?}"),
    }
}

impl<B: Backend, const D: usize> Preparation<'_, B, D> {
    pub fn prepare(
        &self,
        inputs: &Tensor<B, D>,
        targets: &Tensor<B, 1, Int>,
        attributions: Option<&Tensor<B, D>>,
        masks: Option<&Tensor<B, D>>,
        masks_required: bool,
    ) -> LocalisationResult<PreparedBatch> {
        if D < 3 {
            return Err(shape_mismatch(
                "a channel-first batch [N, C, ...] with at least one spatial axis",
                format!("a rank-{D} tensor"),
            ));
        }

        let input_dims = inputs.dims();
        let samples = input_dims[0];
        let spatial = input_dims[2..].to_vec();
        if samples == 0 {
            return Err(shape_mismatch("at least one sample", "an empty batch"));
        }

        let [target_count] = targets.dims();
        if target_count != samples {
            return Err(shape_mismatch(
                format!("{samples} targets"),
                format!("{target_count} targets"),
            ));
        }

        if self.model.is_some_and(|model| model.is_training()) {
            return Err(LocalisationError::InvalidModelState {
                reason: "model is in training mode".to_owned(),
            });
        }

        if masks_required && masks.is_none() {
            return Err(shape_mismatch(
                format!("{samples} masks"),
                "no masks",
            ));
        }

        let explained = attributions.is_none();
        let attributions = match attributions {
            Some(attributions) => attributions.clone(),
            None => self.explain(inputs, targets)?,
        };
        let attributions = Self::check_attributions(attributions, &input_dims)?;

        let masks = masks
            .map(|masks| self.check_masks(masks, &input_dims))
            .transpose()?;

        let attributions = self
            .transform(attributions)
            .into_samples()
            .map_err(|err| read_back_failed("attributions", err))?;
        if explained {
            let non_finite = attributions
                .iter()
                .position(|attribution| attribution.iter().any(|value| !value.is_finite()));
            if let Some(index) = non_finite {
                return Err(LocalisationError::ExplanationFailed {
                    message: format!("non-finite attribution values for sample {index}"),
                });
            }
        }

        let mut warnings = Vec::new();
        for (index, attribution) in attributions.iter().enumerate() {
            if is_constant(attribution) {
                warnings.push(DegenerateInput::sample(index, Degeneracy::ConstantAttribution));
            }
            if let Some(mask) = masks.as_ref().map(|masks| &masks[index]) {
                if region_size(mask) == 0 {
                    warnings.push(DegenerateInput::sample(index, Degeneracy::EmptyMask));
                }
            }
        }

        Ok(PreparedBatch {
            attributions,
            masks,
            spatial,
            warnings,
        })
    }

    /// Produces attributions through the configured explainer.
    fn explain(
        &self,
        inputs: &Tensor<B, D>,
        targets: &Tensor<B, 1, Int>,
    ) -> LocalisationResult<Tensor<B, D>> {
        let Some(explainer) = self.explainer else {
            return Err(LocalisationError::MissingModel {
                reason: "attributions were not supplied and no explainer is configured".to_owned(),
            });
        };
        let Some(model) = self.model else {
            return Err(LocalisationError::InvalidModelState {
                reason: "an explainer is configured but no model was supplied".to_owned(),
            });
        };

        tracing::debug!(samples = inputs.dims()[0], "generating attributions");
        explainer.explain(model, inputs.clone(), targets.clone(), self.explain_options)
    }

    /// Checks batch and spatial shape, collapsing a per-input-channel map.
    fn check_attributions(
        attributions: Tensor<B, D>,
        input_dims: &[usize; D],
    ) -> LocalisationResult<Tensor<B, D>> {
        let dims = attributions.dims();
        if dims[0] != input_dims[0] || dims[2..] != input_dims[2..] {
            let mut expected = *input_dims;
            expected[1] = 1;
            return Err(shape_mismatch(
                format!("attributions of shape {expected:?}"),
                format!("{dims:?}"),
            ));
        }

        match dims[1] {
            1 => Ok(attributions),
            channels if channels == input_dims[1] => Ok(attributions.collapse_channels()),
            channels => Err(shape_mismatch(
                format!("attributions with 1 or {} channels", input_dims[1]),
                format!("{channels} channels"),
            )),
        }
    }

    fn check_masks(
        &self,
        masks: &Tensor<B, D>,
        input_dims: &[usize; D],
    ) -> LocalisationResult<Vec<Vec<bool>>> {
        let dims = masks.dims();
        if dims[0] != input_dims[0] || dims[1] != 1 || dims[2..] != input_dims[2..] {
            let mut expected = *input_dims;
            expected[1] = 1;
            return Err(shape_mismatch(
                format!("masks of shape {expected:?}"),
                format!("{dims:?}"),
            ));
        }

        let threshold = self.config.mask_threshold;
        let masks = masks
            .clone()
            .into_samples()
            .map_err(|err| read_back_failed("masks", err))?;
        Ok(masks
            .iter()
            .map(|mask| binarize(mask, threshold))
            .collect())
    }

    /// abs, then sign clipping, then per-sample normalization.
    fn transform(&self, attributions: Tensor<B, D>) -> Tensor<B, D> {
        let config = self.config;
        let mut attributions = attributions;
        if config.abs {
            attributions = attributions.abs();
        }
        if config.pos_only {
            attributions = attributions.keep_positive();
        }
        if config.neg_only {
            attributions = attributions.keep_negative();
        }
        if config.normalise {
            attributions = attributions.normalize_per_sample();
        }
        attributions
    }
}
