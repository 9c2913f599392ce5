//! Area under the ROC curve of attribution scores against mask labels.

use burn::prelude::*;

use super::base::{LocalisationMetric, LocalisationStrategy};
use crate::{
    config::EvaluationConfig,
    error::{Degeneracy, LocalisationResult},
};
use attribution_ops::roc_auc;

#[derive(Config, Debug)]
pub struct AucConfig {
    #[config(default = "EvaluationConfig::new()")]
    pub evaluation: EvaluationConfig,
}

impl AucConfig {
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if the
    /// evaluation settings are invalid.
    pub fn validate(&self) -> LocalisationResult<()> {
        self.evaluation.validate()
    }

    /// # Errors
    ///
    /// See [`AucConfig::validate`].
    pub fn init<B: Backend, const D: usize>(&self) -> LocalisationResult<LocalisationMetric<B, D>> {
        self.validate()?;
        Ok(LocalisationMetric::new(
            LocalisationStrategy::Auc(Auc),
            self.evaluation.clone(),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Auc;

impl Auc {
    pub(crate) fn score(self, attribution: &[f32], mask: &[bool], notes: &mut Vec<Degeneracy>) -> f64 {
        roc_auc(attribution, mask).unwrap_or_else(|| {
            notes.push(Degeneracy::SingleClassMask);
            0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_and_inverted_separation() {
        let mut notes = Vec::new();
        let mask = [true, true, false, false];
        assert_relative_eq!(Auc.score(&[0.9, 0.8, 0.1, 0.2], &mask, &mut notes), 1.0);
        assert_relative_eq!(Auc.score(&[0.1, 0.2, 0.9, 0.8], &mask, &mut notes), 0.0);
        assert!(notes.is_empty());
    }

    #[test]
    fn ties_count_half() {
        let mut notes = Vec::new();
        let score = Auc.score(&[0.5, 0.5, 0.5, 0.5], &[true, false, true, false], &mut notes);
        assert_relative_eq!(score, 0.5);
    }

    #[test]
    fn single_class_masks_score_zero_with_a_note() {
        let mut notes = Vec::new();
        assert_eq!(Auc.score(&[0.1, 0.9], &[true, true], &mut notes), 0.0);
        assert_eq!(Auc.score(&[0.1, 0.9], &[false, false], &mut notes), 0.0);
        assert_eq!(notes, vec![Degeneracy::SingleClassMask; 2]);
    }
}
