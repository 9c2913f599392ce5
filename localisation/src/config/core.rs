//! Evaluation configuration shared by every metric.
//!
//! [`EvaluationConfig`] is frozen into a metric at construction.
//! [`EvaluationOverrides`] adjusts it for a single call without touching the
//! stored copy.

use burn::prelude::*;

use super::enums::AggregationFunc;
use crate::error::{LocalisationError, LocalisationResult};

/// Pixel transforms, reporting and warning toggles common to all metrics.
///
/// Transforms are applied to attributions in a fixed order: `abs`, then
/// `pos_only`, then `neg_only`, then `normalise`.
#[derive(Config, Debug)]
pub struct EvaluationConfig {
    /// Take the absolute value of attributions.
    #[config(default = false)]
    pub abs: bool,
    /// Min-max normalize each attribution map to `[0, 1]`.
    #[config(default = true)]
    pub normalise: bool,
    /// Zero negative attributions.
    #[config(default = false)]
    pub pos_only: bool,
    /// Zero positive attributions.
    #[config(default = false)]
    pub neg_only: bool,
    /// Return the aggregate of a call's scores instead of the scores.
    #[config(default = false)]
    pub return_aggregate: bool,
    /// Reduction used when `return_aggregate` is set.
    #[config(default = "AggregationFunc::Mean")]
    pub aggregate_func: AggregationFunc,
    /// Silence degenerate-input warnings. They are still recorded.
    #[config(default = false)]
    pub disable_warnings: bool,
    /// Log per-sample progress.
    #[config(default = false)]
    pub display_progressbar: bool,
    /// Mask values at or above this threshold are inside the region of interest.
    #[config(default = 0.5)]
    pub mask_threshold: f32,
}

impl EvaluationConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if `pos_only`
    /// and `neg_only` are both set or the mask threshold is outside `(0, 1]`.
    pub fn validate(&self) -> LocalisationResult<()> {
        if self.pos_only && self.neg_only {
            return Err(LocalisationError::UnsupportedConfiguration {
                reason: "pos_only and neg_only cannot both be enabled".to_owned(),
            });
        }
        if !(self.mask_threshold > 0.0 && self.mask_threshold <= 1.0) {
            return Err(LocalisationError::UnsupportedConfiguration {
                reason: format!(
                    "mask_threshold must be in (0, 1], got {}",
                    self.mask_threshold
                ),
            });
        }
        Ok(())
    }

    /// Returns this configuration with `overrides` applied.
    #[must_use]
    pub fn merged(&self, overrides: &EvaluationOverrides) -> Self {
        Self {
            abs: overrides.abs.unwrap_or(self.abs),
            normalise: overrides.normalise.unwrap_or(self.normalise),
            pos_only: overrides.pos_only.unwrap_or(self.pos_only),
            neg_only: overrides.neg_only.unwrap_or(self.neg_only),
            return_aggregate: overrides.return_aggregate.unwrap_or(self.return_aggregate),
            aggregate_func: overrides
                .aggregate_func
                .clone()
                .unwrap_or_else(|| self.aggregate_func.clone()),
            disable_warnings: overrides.disable_warnings.unwrap_or(self.disable_warnings),
            display_progressbar: overrides
                .display_progressbar
                .unwrap_or(self.display_progressbar),
            mask_threshold: self.mask_threshold,
        }
    }
}

/// Per-call adjustments of an [`EvaluationConfig`]. `None` keeps the stored value.
#[derive(Config, Debug)]
pub struct EvaluationOverrides {
    #[config(default = "None")]
    pub abs: Option<bool>,
    #[config(default = "None")]
    pub normalise: Option<bool>,
    #[config(default = "None")]
    pub pos_only: Option<bool>,
    #[config(default = "None")]
    pub neg_only: Option<bool>,
    #[config(default = "None")]
    pub return_aggregate: Option<bool>,
    #[config(default = "None")]
    pub aggregate_func: Option<AggregationFunc>,
    #[config(default = "None")]
    pub disable_warnings: Option<bool>,
    #[config(default = "None")]
    pub display_progressbar: Option<bool>,
}
