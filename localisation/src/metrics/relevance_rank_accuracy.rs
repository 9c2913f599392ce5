//! Relevance Rank Accuracy: with `m` the mask area, the fraction of the `m`
//! most relevant pixels that lie inside the mask.

use burn::prelude::*;

use super::base::{LocalisationMetric, LocalisationStrategy};
use crate::{config::EvaluationConfig, error::LocalisationResult};
use attribution_ops::{region_membership, region_size, top_k_indices};

#[derive(Config, Debug)]
pub struct RelevanceRankAccuracyConfig {
    #[config(default = "EvaluationConfig::new()")]
    pub evaluation: EvaluationConfig,
}

impl RelevanceRankAccuracyConfig {
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if the
    /// evaluation settings are invalid.
    pub fn validate(&self) -> LocalisationResult<()> {
        self.evaluation.validate()
    }

    /// # Errors
    ///
    /// See [`RelevanceRankAccuracyConfig::validate`].
    pub fn init<B: Backend, const D: usize>(&self) -> LocalisationResult<LocalisationMetric<B, D>> {
        self.validate()?;
        Ok(LocalisationMetric::new(
            LocalisationStrategy::RelevanceRankAccuracy(RelevanceRankAccuracy),
            self.evaluation.clone(),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RelevanceRankAccuracy;

impl RelevanceRankAccuracy {
    pub(crate) fn score(self, attribution: &[f32], mask: &[bool]) -> f64 {
        let area = region_size(mask);
        if area == 0 {
            return 0.0;
        }
        let hits = region_membership(&top_k_indices(attribution, area), mask);
        hits as f64 / area as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ranks_as_many_pixels_as_the_mask_holds() {
        let mask = [false, true, true, false, false];
        assert_relative_eq!(RelevanceRankAccuracy.score(&[0.0, 0.9, 0.8, 0.1, 0.2], &mask), 1.0);
        assert_relative_eq!(RelevanceRankAccuracy.score(&[0.0, 0.9, 0.1, 0.8, 0.2], &mask), 0.5);
        assert_relative_eq!(RelevanceRankAccuracy.score(&[0.9, 0.0, 0.1, 0.8, 0.2], &mask), 0.0);
    }

    #[test]
    fn empty_mask_scores_zero() {
        assert_eq!(RelevanceRankAccuracy.score(&[1.0, 0.5], &[false, false]), 0.0);
    }
}
