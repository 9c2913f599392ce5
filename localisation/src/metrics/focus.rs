//! Focus.
//!
//! Each input is a 2x2 mosaic in which some quadrants show the target class.
//! The score is the share of positive attribution mass that lands in those
//! quadrants: a discriminative explanation concentrates on them.

use burn::prelude::*;

use super::{
    base::{report_progress, Accumulator, EvaluationOutput, MetricState},
    input::MosaicBatch,
};
use crate::{
    config::{EvaluationConfig, EvaluationOverrides},
    error::{Degeneracy, DegenerateInput, LocalisationError, LocalisationResult},
    explain::{ExplainOptions, Explainer},
    model::ModelInterface,
    validation::Preparation,
};

const NAME: &str = "Focus";

#[derive(Config, Debug)]
pub struct FocusConfig {
    #[config(default = "EvaluationConfig::new()")]
    pub evaluation: EvaluationConfig,
}

impl FocusConfig {
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::UnsupportedConfiguration)` if the
    /// evaluation settings are invalid.
    pub fn validate(&self) -> LocalisationResult<()> {
        self.evaluation.validate()
    }

    /// # Errors
    ///
    /// See [`FocusConfig::validate`].
    pub fn init<B: Backend>(&self) -> LocalisationResult<FocusMetric<B>> {
        self.validate()?;
        Ok(FocusMetric {
            config: self.evaluation.clone(),
            explainer: None,
            explain_options: ExplainOptions::new(),
            accumulator: Accumulator::default(),
        })
    }
}

/// Quadrant of pixel `(row, col)` in an `height x width` mosaic, numbered
/// column-major: top-left, bottom-left, top-right, bottom-right.
///
/// An odd middle row or column belongs to the bottom or right half.
const fn quadrant(row: usize, col: usize, height: usize, width: usize) -> usize {
    let bottom = row >= height / 2;
    let right = col >= width / 2;
    (right as usize) * 2 + bottom as usize
}

/// Positive attribution mass per quadrant of a row-major `height x width` map.
fn quadrant_mass(attribution: &[f32], height: usize, width: usize) -> [f64; 4] {
    let mut mass = [0.0; 4];
    for (index, &value) in attribution.iter().enumerate() {
        if value > 0.0 {
            mass[quadrant(index / width, index % width, height, width)] += f64::from(value);
        }
    }
    mass
}

/// Share of positive mass inside the flagged quadrants.
fn focus_score(
    attribution: &[f32],
    flags: &[bool; 4],
    height: usize,
    width: usize,
    notes: &mut Vec<Degeneracy>,
) -> f64 {
    let mass = quadrant_mass(attribution, height, width);
    let total: f64 = mass.iter().sum();
    if total == 0.0 {
        notes.push(Degeneracy::ZeroAttributionMass);
        return 0.0;
    }

    let inside: f64 = mass
        .iter()
        .zip(flags)
        .filter(|(_, &flag)| flag)
        .map(|(m, _)| m)
        .sum();
    inside / total
}

/// The focus metric over batches of image mosaics.
pub struct FocusMetric<B: Backend> {
    config: EvaluationConfig,
    explainer: Option<Box<dyn Explainer<B, 4>>>,
    explain_options: ExplainOptions,
    accumulator: Accumulator,
}

impl<B: Backend> FocusMetric<B> {
    #[must_use]
    pub fn with_explainer<E>(mut self, explainer: E) -> Self
    where
        E: Explainer<B, 4> + 'static,
    {
        self.explainer = Some(Box::new(explainer));
        self
    }

    #[must_use]
    pub fn with_explain_options(mut self, options: ExplainOptions) -> Self {
        self.explain_options = options;
        self
    }

    /// # Errors
    ///
    /// See [`FocusMetric::evaluate_with`].
    pub fn evaluate(
        &mut self,
        model: Option<&dyn ModelInterface<B, 4>>,
        batch: &MosaicBatch<B>,
    ) -> LocalisationResult<EvaluationOutput> {
        self.evaluate_with(model, batch, &EvaluationOverrides::new())
    }

    /// Scores a batch of mosaics with `overrides` applied for this call only.
    ///
    /// # Errors
    ///
    /// - `EmptyMosaicBatch` if the batch carries no quadrant flags
    /// - `ShapeMismatch` if the flag count differs from the mosaic count, or
    ///   any shape check on inputs and attributions fails
    /// - the model and explainer errors of [`crate::LocalisationMetric::evaluate_with`]
    pub fn evaluate_with(
        &mut self,
        model: Option<&dyn ModelInterface<B, 4>>,
        batch: &MosaicBatch<B>,
        overrides: &EvaluationOverrides,
    ) -> LocalisationResult<EvaluationOutput> {
        if batch.quadrant_flags.is_empty() {
            return Err(LocalisationError::EmptyMosaicBatch {
                reason: "no quadrant flags were supplied".to_owned(),
            });
        }
        let [samples, _, height, width] = batch.inputs.dims();
        if batch.quadrant_flags.len() != samples {
            return Err(LocalisationError::ShapeMismatch {
                expected: format!("{samples} quadrant flag sets"),
                actual: format!("{} quadrant flag sets", batch.quadrant_flags.len()),
            });
        }

        let config = self.config.merged(overrides);
        config.validate()?;

        let prepared = Preparation {
            model,
            explainer: self.explainer.as_deref(),
            explain_options: &self.explain_options,
            config: &config,
        }
        .prepare(
            &batch.inputs,
            &batch.targets,
            batch.attributions.as_ref(),
            None,
            false,
        )?;

        let total = prepared.attributions.len();
        let mut warnings = prepared.warnings;
        let mut scores = Vec::with_capacity(total);
        let mut notes = Vec::new();
        for (index, (attribution, flags)) in prepared
            .attributions
            .iter()
            .zip(&batch.quadrant_flags)
            .enumerate()
        {
            scores.push(focus_score(attribution, flags, height, width, &mut notes));
            warnings.extend(notes.drain(..).map(|kind| DegenerateInput::sample(index, kind)));
            report_progress(NAME, &config, index, total);
        }

        Ok(self.accumulator.commit(NAME, scores, warnings, &config))
    }

    pub fn accumulated_results(&self) -> &[f64] {
        self.accumulator.results()
    }

    pub fn warnings(&self) -> &[DegenerateInput] {
        self.accumulator.warnings()
    }

    pub const fn state(&self) -> MetricState {
        self.accumulator.state()
    }

    pub const fn name(&self) -> &'static str {
        NAME
    }

    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }
}
