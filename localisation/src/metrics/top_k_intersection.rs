//! Top-K Intersection.
//!
//! Fraction of the `k` most relevant pixels that lie inside the region of
//! interest. With `concept_influence` the fraction is scaled by the inverse
//! mask density and is no longer bounded by 1.

use burn::prelude::*;

use super::base::{LocalisationMetric, LocalisationStrategy};
use crate::{
    config::EvaluationConfig,
    error::{Degeneracy, LocalisationError, LocalisationResult},
};
use attribution_ops::{region_membership, region_size, top_k_indices};

#[derive(Config, Debug)]
pub struct TopKIntersectionConfig {
    /// Number of top-ranked pixels. Clamped to the pixel count of a sample.
    #[config(default = 1000)]
    pub k: usize,
    /// Multiply the score by `pixels / mask_area`.
    #[config(default = false)]
    pub concept_influence: bool,
    #[config(default = "EvaluationConfig::new()")]
    pub evaluation: EvaluationConfig,
}

impl TopKIntersectionConfig {
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if `k` is zero
    /// or the evaluation settings are invalid.
    pub fn validate(&self) -> LocalisationResult<()> {
        if self.k == 0 {
            return Err(LocalisationError::UnsupportedConfiguration {
                reason: "k must be at least 1".to_owned(),
            });
        }
        self.evaluation.validate()
    }

    /// # Errors
    ///
    /// See [`TopKIntersectionConfig::validate`].
    pub fn init<B: Backend, const D: usize>(&self) -> LocalisationResult<LocalisationMetric<B, D>> {
        self.validate()?;
        Ok(LocalisationMetric::new(
            LocalisationStrategy::TopKIntersection(TopKIntersection {
                k: self.k,
                concept_influence: self.concept_influence,
            }),
            self.evaluation.clone(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct TopKIntersection {
    pub(crate) k: usize,
    pub(crate) concept_influence: bool,
}

impl TopKIntersection {
    pub(crate) fn clamp_note(&self, pixels: usize) -> Option<Degeneracy> {
        (self.k > pixels).then_some(Degeneracy::ParameterClamped {
            parameter: "k",
            requested: self.k,
            clamped: pixels,
        })
    }

    pub(crate) fn score(&self, attribution: &[f32], mask: &[bool]) -> f64 {
        let k = self.k.min(attribution.len());
        let area = region_size(mask);
        if k == 0 || area == 0 {
            return 0.0;
        }

        let hits = region_membership(&top_k_indices(attribution, k), mask);
        let score = hits as f64 / k as f64;
        if self.concept_influence {
            score * attribution.len() as f64 / area as f64
        } else {
            score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metric(k: usize) -> TopKIntersection {
        TopKIntersection {
            k,
            concept_influence: false,
        }
    }

    #[test]
    fn counts_top_k_inside_the_mask() {
        let attribution = [0.9, 0.8, 0.1, 0.7, 0.0];
        let mask = [true, false, false, true, false];
        assert_relative_eq!(metric(2).score(&attribution, &mask), 0.5);
        assert_relative_eq!(metric(3).score(&attribution, &mask), 2.0 / 3.0);
    }

    #[test]
    fn ties_select_the_lower_index() {
        let attribution = [1.0, 1.0, 1.0, 1.0];
        assert_relative_eq!(metric(2).score(&attribution, &[true, true, false, false]), 1.0);
        assert_relative_eq!(metric(2).score(&attribution, &[false, false, true, true]), 0.0);
    }

    #[test]
    fn k_equal_to_pixels_gives_mask_density() {
        let attribution = [0.3, 0.1, 0.4, 0.2, 0.9, 0.5, 0.0, 0.6];
        let mask = [true, false, false, true, false, true, false, false];
        assert_relative_eq!(metric(8).score(&attribution, &mask), 3.0 / 8.0);
    }

    #[test]
    fn oversized_k_is_clamped_and_noted() {
        let attribution = [0.3, 0.1, 0.4, 0.2];
        let mask = [true, false, false, true];
        let clamped = metric(100);
        assert_eq!(clamped.score(&attribution, &mask), metric(4).score(&attribution, &mask));
        assert_eq!(
            clamped.clamp_note(4),
            Some(Degeneracy::ParameterClamped {
                parameter: "k",
                requested: 100,
                clamped: 4,
            })
        );
        assert_eq!(metric(4).clamp_note(4), None);
    }

    #[test]
    fn concept_influence_scales_by_inverse_density() {
        let metric = TopKIntersection {
            k: 2,
            concept_influence: true,
        };
        let attribution = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mask = [true, true, false, false, false, false, false, false];
        assert_relative_eq!(metric.score(&attribution, &mask), 4.0);
    }

    #[test]
    fn zero_k_is_rejected() {
        let config = TopKIntersectionConfig::new().with_k(0);
        assert!(matches!(
            config.validate(),
            Err(LocalisationError::UnsupportedConfiguration { .. })
        ));
    }
}
