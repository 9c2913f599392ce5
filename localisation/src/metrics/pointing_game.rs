//! Pointing Game.
//!
//! A sample scores a hit when any of its maximally relevant pixels lies inside
//! the region of interest.

use burn::prelude::*;

use super::base::{LocalisationMetric, LocalisationStrategy};
use crate::{config::EvaluationConfig, error::LocalisationResult};
use attribution_ops::{max_indices, region_membership, region_size};

#[derive(Config, Debug)]
pub struct PointingGameConfig {
    /// Scale a hit by `1 - mask_area / total_area`, rewarding small regions.
    #[config(default = false)]
    pub weighted: bool,
    #[config(default = "EvaluationConfig::new()")]
    pub evaluation: EvaluationConfig,
}

impl PointingGameConfig {
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if the
    /// evaluation settings are invalid.
    pub fn validate(&self) -> LocalisationResult<()> {
        self.evaluation.validate()
    }

    /// # Errors
    ///
    /// See [`PointingGameConfig::validate`].
    pub fn init<B: Backend, const D: usize>(&self) -> LocalisationResult<LocalisationMetric<B, D>> {
        self.validate()?;
        Ok(LocalisationMetric::new(
            LocalisationStrategy::PointingGame(PointingGame {
                weighted: self.weighted,
            }),
            self.evaluation.clone(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct PointingGame {
    pub(crate) weighted: bool,
}

impl PointingGame {
    pub(crate) fn score(&self, attribution: &[f32], mask: &[bool]) -> f64 {
        let area = region_size(mask);
        if area == 0 {
            return 0.0;
        }

        if region_membership(&max_indices(attribution), mask) == 0 {
            return 0.0;
        }

        if self.weighted {
            1.0 - area as f64 / mask.len() as f64
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GAME: PointingGame = PointingGame { weighted: false };

    #[test]
    fn hit_when_the_maximum_is_inside() {
        let mask = [false, true, true, false];
        assert_eq!(GAME.score(&[0.1, 0.9, 0.3, 0.2], &mask), 1.0);
        assert_eq!(GAME.score(&[0.9, 0.1, 0.3, 0.2], &mask), 0.0);
    }

    #[test]
    fn any_tied_maximum_counts() {
        let mask = [false, false, true, false];
        assert_eq!(GAME.score(&[1.0, 0.0, 1.0, 0.0], &mask), 1.0);
    }

    #[test]
    fn empty_mask_scores_zero() {
        assert_eq!(GAME.score(&[1.0, 0.0], &[false, false]), 0.0);
    }

    #[test]
    fn weighted_hit_rewards_small_regions() {
        let game = PointingGame { weighted: true };
        let mask = [true, false, false, false];
        assert_relative_eq!(game.score(&[1.0, 0.0, 0.0, 0.0], &mask), 0.75);
        assert_eq!(game.score(&[0.0, 1.0, 0.0, 0.0], &mask), 0.0);
    }
}
