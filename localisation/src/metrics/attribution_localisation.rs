//! Attribution Localisation: share of the positive attribution mass that
//! falls inside the mask, optionally weighted by the mask's area ratio.

use burn::prelude::*;

use super::base::{LocalisationMetric, LocalisationStrategy};
use crate::{
    config::EvaluationConfig,
    error::{Degeneracy, LocalisationError, LocalisationResult},
};
use attribution_ops::{positive_mass, region_size};

#[derive(Config, Debug)]
pub struct AttributionLocalisationConfig {
    /// Multiply the score by `mask_area / total_area`.
    #[config(default = false)]
    pub weighted: bool,
    /// Largest mask area ratio considered meaningful. Larger masks are
    /// scored but recorded as degenerate.
    #[config(default = 1.0)]
    pub max_size: f64,
    #[config(default = "EvaluationConfig::new().with_abs(true)")]
    pub evaluation: EvaluationConfig,
}

impl AttributionLocalisationConfig {
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if `max_size`
    /// is outside `(0, 1]` or the evaluation settings are invalid.
    pub fn validate(&self) -> LocalisationResult<()> {
        if !(self.max_size > 0.0 && self.max_size <= 1.0) {
            return Err(LocalisationError::UnsupportedConfiguration {
                reason: format!("max_size must be in (0, 1], got {}", self.max_size),
            });
        }
        self.evaluation.validate()
    }

    /// # Errors
    ///
    /// See [`AttributionLocalisationConfig::validate`].
    pub fn init<B: Backend, const D: usize>(&self) -> LocalisationResult<LocalisationMetric<B, D>> {
        self.validate()?;
        Ok(LocalisationMetric::new(
            LocalisationStrategy::AttributionLocalisation(AttributionLocalisation {
                weighted: self.weighted,
                max_size: self.max_size,
            }),
            self.evaluation.clone(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct AttributionLocalisation {
    pub(crate) weighted: bool,
    pub(crate) max_size: f64,
}

impl AttributionLocalisation {
    pub(crate) fn score(&self, attribution: &[f32], mask: &[bool], notes: &mut Vec<Degeneracy>) -> f64 {
        let area = region_size(mask);
        let ratio = area as f64 / mask.len().max(1) as f64;
        if ratio > self.max_size {
            notes.push(Degeneracy::MaskExceedsMaxSize {
                ratio,
                max_size: self.max_size,
            });
        }
        if area == 0 {
            return 0.0;
        }

        let total = positive_mass(attribution);
        if total == 0.0 {
            notes.push(Degeneracy::ZeroAttributionMass);
            return 0.0;
        }

        let inside: f64 = attribution
            .iter()
            .zip(mask)
            .filter(|&(&value, &in_mask)| in_mask && value > 0.0)
            .map(|(&value, _)| f64::from(value))
            .sum();

        let score = inside / total;
        if self.weighted {
            score * ratio
        } else {
            score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PLAIN: AttributionLocalisation = AttributionLocalisation {
        weighted: false,
        max_size: 1.0,
    };

    #[test]
    fn positive_mass_share_inside_the_mask() {
        let mut notes = Vec::new();
        let score = PLAIN.score(&[3.0, 1.0, -5.0, 0.0], &[true, false, true, false], &mut notes);
        assert_relative_eq!(score, 0.75);
        assert!(notes.is_empty());
    }

    #[test]
    fn weighting_multiplies_by_area_ratio() {
        let weighted = AttributionLocalisation {
            weighted: true,
            max_size: 1.0,
        };
        let mut notes = Vec::new();
        let score = weighted.score(&[1.0, 1.0, 0.0, 0.0], &[true, true, false, false], &mut notes);
        assert_relative_eq!(score, 0.5);
    }

    #[test]
    fn oversized_masks_are_noted_but_scored() {
        let strict = AttributionLocalisation {
            weighted: false,
            max_size: 0.25,
        };
        let mut notes = Vec::new();
        let score = strict.score(&[1.0, 1.0, 0.0, 0.0], &[true, true, false, false], &mut notes);
        assert_relative_eq!(score, 1.0);
        assert_eq!(
            notes,
            vec![Degeneracy::MaskExceedsMaxSize {
                ratio: 0.5,
                max_size: 0.25,
            }]
        );
    }

    #[test]
    fn degenerate_samples_score_zero() {
        let mut notes = Vec::new();
        assert_eq!(PLAIN.score(&[1.0, 2.0], &[false, false], &mut notes), 0.0);
        assert_eq!(PLAIN.score(&[-1.0, 0.0], &[true, false], &mut notes), 0.0);
        assert_eq!(notes, vec![Degeneracy::ZeroAttributionMass]);
    }

    #[test]
    fn max_size_out_of_range_is_rejected() {
        for max_size in [0.0, 1.5] {
            let config = AttributionLocalisationConfig::new().with_max_size(max_size);
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn absolute_values_are_taken_by_default() {
        assert!(AttributionLocalisationConfig::new().evaluation.abs);
    }
}
