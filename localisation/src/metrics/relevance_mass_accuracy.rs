//! Relevance Mass Accuracy: share of the total attribution that falls inside
//! the mask.
//!
//! Mixed-sign maps that were not normalised can push the signed ratio out of
//! `[0, 1]`; such scores are clamped and recorded.

use burn::prelude::*;

use super::base::{LocalisationMetric, LocalisationStrategy};
use crate::{
    config::EvaluationConfig,
    error::{Degeneracy, LocalisationResult},
};

#[derive(Config, Debug)]
pub struct RelevanceMassAccuracyConfig {
    #[config(default = "EvaluationConfig::new()")]
    pub evaluation: EvaluationConfig,
}

impl RelevanceMassAccuracyConfig {
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if the
    /// evaluation settings are invalid.
    pub fn validate(&self) -> LocalisationResult<()> {
        self.evaluation.validate()
    }

    /// # Errors
    ///
    /// See [`RelevanceMassAccuracyConfig::validate`].
    pub fn init<B: Backend, const D: usize>(&self) -> LocalisationResult<LocalisationMetric<B, D>> {
        self.validate()?;
        Ok(LocalisationMetric::new(
            LocalisationStrategy::RelevanceMassAccuracy(RelevanceMassAccuracy),
            self.evaluation.clone(),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RelevanceMassAccuracy;

impl RelevanceMassAccuracy {
    pub(crate) fn score(self, attribution: &[f32], mask: &[bool], notes: &mut Vec<Degeneracy>) -> f64 {
        let (inside, total) = attribution
            .iter()
            .zip(mask)
            .fold((0.0f64, 0.0f64), |(inside, total), (&value, &in_mask)| {
                let value = f64::from(value);
                (if in_mask { inside + value } else { inside }, total + value)
            });

        if total == 0.0 {
            notes.push(Degeneracy::ZeroAttributionMass);
            return 0.0;
        }

        let score = inside / total;
        if (0.0..=1.0).contains(&score) {
            score
        } else {
            notes.push(Degeneracy::ScoreOutOfRange { score });
            score.clamp(0.0, 1.0)
        }
    }
}
