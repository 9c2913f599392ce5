//! The accumulation contract shared by every metric.
//!
//! A metric instance owns a frozen [`EvaluationConfig`], an optional explainer
//! and an append-only ledger of scores and warnings. Each call validates its
//! batch completely before anything is written, so a failed call leaves the
//! ledger exactly as it was.

use serde::Serialize;
use tracing::{debug, info, warn};

use burn::prelude::*;

use super::{
    aggregator::aggregate,
    attribution_localisation::AttributionLocalisation,
    auc::Auc,
    input::Batch,
    pointing_game::PointingGame,
    relevance_mass_accuracy::RelevanceMassAccuracy,
    relevance_rank_accuracy::RelevanceRankAccuracy,
    top_k_intersection::TopKIntersection,
};
use crate::{
    config::{EvaluationConfig, EvaluationOverrides},
    error::{Degeneracy, DegenerateInput, LocalisationError, LocalisationResult},
    explain::{ExplainOptions, Explainer},
    model::ModelInterface,
    validation::Preparation,
};

/// Lifecycle of a metric instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricState {
    /// No call has completed yet.
    Idle,
    /// At least one call has been accumulated.
    Accumulating,
}

/// What one call returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EvaluationOutput {
    /// One score per sample of the call, in input order.
    PerSample(Vec<f64>),
    /// The call's scores reduced with the configured aggregation function.
    Aggregate(f64),
}

impl EvaluationOutput {
    pub fn scores(&self) -> Option<&[f64]> {
        match self {
            Self::PerSample(scores) => Some(scores),
            Self::Aggregate(_) => None,
        }
    }

    pub fn into_scores(self) -> Option<Vec<f64>> {
        match self {
            Self::PerSample(scores) => Some(scores),
            Self::Aggregate(_) => None,
        }
    }

    pub const fn aggregate(&self) -> Option<f64> {
        match self {
            Self::PerSample(_) => None,
            Self::Aggregate(value) => Some(*value),
        }
    }
}

/// Scores and warnings of every completed call.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    results: Vec<f64>,
    warnings: Vec<DegenerateInput>,
    calls: usize,
}

impl Accumulator {
    /// Appends one validated call. Warning indices are shifted from batch
    /// positions to positions in the accumulated results.
    pub fn commit(
        &mut self,
        metric: &'static str,
        scores: Vec<f64>,
        warnings: Vec<DegenerateInput>,
        config: &EvaluationConfig,
    ) -> EvaluationOutput {
        let offset = self.results.len();
        for warning in warnings {
            let warning = warning.shifted(offset);
            if !config.disable_warnings {
                warn!(metric, "degenerate input, {warning}");
            }
            self.warnings.push(warning);
        }

        let output = if config.return_aggregate {
            EvaluationOutput::Aggregate(aggregate(&scores, &config.aggregate_func))
        } else {
            EvaluationOutput::PerSample(scores.clone())
        };

        self.results.extend(scores);
        self.calls += 1;
        debug!(
            metric,
            call = self.calls,
            accumulated = self.results.len(),
            "accumulated batch"
        );

        output
    }

    pub fn results(&self) -> &[f64] {
        &self.results
    }

    pub fn warnings(&self) -> &[DegenerateInput] {
        &self.warnings
    }

    pub const fn state(&self) -> MetricState {
        if self.calls == 0 {
            MetricState::Idle
        } else {
            MetricState::Accumulating
        }
    }
}

/// Logs progress of one scored sample when enabled.
pub(crate) fn report_progress(metric: &'static str, config: &EvaluationConfig, index: usize, total: usize) {
    if config.display_progressbar {
        info!(metric, sample = index + 1, total, "scored sample");
    }
}

/// The closed set of mask-based scoring algorithms.
#[derive(Debug, Clone)]
pub enum LocalisationStrategy {
    PointingGame(PointingGame),
    TopKIntersection(TopKIntersection),
    RelevanceRankAccuracy(RelevanceRankAccuracy),
    RelevanceMassAccuracy(RelevanceMassAccuracy),
    Auc(Auc),
    AttributionLocalisation(AttributionLocalisation),
}

impl LocalisationStrategy {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PointingGame(_) => "Pointing Game",
            Self::TopKIntersection(_) => "Top-K Intersection",
            Self::RelevanceRankAccuracy(_) => "Relevance Rank Accuracy",
            Self::RelevanceMassAccuracy(_) => "Relevance Mass Accuracy",
            Self::Auc(_) => "AUC",
            Self::AttributionLocalisation(_) => "Attribution Localisation",
        }
    }

    /// Conditions that concern a whole call rather than one sample.
    pub(crate) fn call_notes(&self, pixels: usize) -> Option<Degeneracy> {
        match self {
            Self::TopKIntersection(metric) => metric.clamp_note(pixels),
            _ => None,
        }
    }

    /// Scores one flattened sample.
    ///
    /// Degenerate conditions are pushed onto `notes` and scored with the
    /// strategy's sentinel.
    pub fn score(&self, attribution: &[f32], mask: &[bool], notes: &mut Vec<Degeneracy>) -> f64 {
        match self {
            Self::PointingGame(metric) => metric.score(attribution, mask),
            Self::TopKIntersection(metric) => metric.score(attribution, mask),
            Self::RelevanceRankAccuracy(metric) => metric.score(attribution, mask),
            Self::RelevanceMassAccuracy(metric) => metric.score(attribution, mask, notes),
            Self::Auc(metric) => metric.score(attribution, mask, notes),
            Self::AttributionLocalisation(metric) => metric.score(attribution, mask, notes),
        }
    }
}

/// A mask-based localisation metric over batches of rank `D`.
///
/// `D` is 3 for signals `[N, C, L]` and 4 for images `[N, C, H, W]`.
pub struct LocalisationMetric<B: Backend, const D: usize> {
    strategy: LocalisationStrategy,
    config: EvaluationConfig,
    explainer: Option<Box<dyn Explainer<B, D>>>,
    explain_options: ExplainOptions,
    accumulator: Accumulator,
}

impl<B: Backend, const D: usize> LocalisationMetric<B, D> {
    pub(crate) fn new(strategy: LocalisationStrategy, config: EvaluationConfig) -> Self {
        Self {
            strategy,
            config,
            explainer: None,
            explain_options: ExplainOptions::new(),
            accumulator: Accumulator::default(),
        }
    }

    /// Sets the explainer used for batches that arrive without attributions.
    #[must_use]
    pub fn with_explainer<E>(mut self, explainer: E) -> Self
    where
        E: Explainer<B, D> + 'static,
    {
        self.explainer = Some(Box::new(explainer));
        self
    }

    #[must_use]
    pub fn with_explain_options(mut self, options: ExplainOptions) -> Self {
        self.explain_options = options;
        self
    }

    /// Scores a batch with the stored configuration.
    ///
    /// # Errors
    ///
    /// See [`LocalisationMetric::evaluate_with`].
    pub fn evaluate(
        &mut self,
        model: Option<&dyn ModelInterface<B, D>>,
        batch: &Batch<B, D>,
    ) -> LocalisationResult<EvaluationOutput> {
        self.evaluate_with(model, batch, &EvaluationOverrides::new())
    }

    /// Scores a batch with `overrides` applied for this call only.
    ///
    /// Scores are appended to the accumulated results in input order.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if cardinalities or shapes disagree or masks are missing
    /// - `InvalidModelState` if the model is training, or an explainer is
    ///   needed but no model was given
    /// - `MissingModel` if attributions are absent and no explainer is set
    /// - `UnsupportedConfiguration` if the overrides produce an invalid configuration
    /// - `ExplanationFailed` if the explainer produces non-finite values
    /// - any error returned by the explainer
    pub fn evaluate_with(
        &mut self,
        model: Option<&dyn ModelInterface<B, D>>,
        batch: &Batch<B, D>,
        overrides: &EvaluationOverrides,
    ) -> LocalisationResult<EvaluationOutput> {
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
            batch.masks.as_ref(),
            true,
        )?;
        let Some(masks) = prepared.masks else {
            return Err(LocalisationError::ShapeMismatch {
                expected: "masks".to_owned(),
                actual: "no masks".to_owned(),
            });
        };

        let name = self.name();
        let total = prepared.attributions.len();
        let pixels = prepared.spatial.iter().product();
        let mut warnings = prepared.warnings;
        warnings.extend(self.strategy.call_notes(pixels).map(DegenerateInput::batch));

        let mut scores = Vec::with_capacity(total);
        let mut notes = Vec::new();
        for (index, (attribution, mask)) in prepared.attributions.iter().zip(&masks).enumerate() {
            scores.push(self.strategy.score(attribution, mask, &mut notes));
            warnings.extend(notes.drain(..).map(|kind| DegenerateInput::sample(index, kind)));
            report_progress(name, &config, index, total);
        }

        Ok(self.accumulator.commit(name, scores, warnings, &config))
    }

    /// Every score produced so far, in call and input order.
    pub fn accumulated_results(&self) -> &[f64] {
        self.accumulator.results()
    }

    /// Every degenerate input recorded so far.
    pub fn warnings(&self) -> &[DegenerateInput] {
        self.accumulator.warnings()
    }

    pub const fn state(&self) -> MetricState {
        self.accumulator.state()
    }

    pub const fn name(&self) -> &'static str {
        self.strategy.name()
    }

    pub const fn strategy(&self) -> &LocalisationStrategy {
        &self.strategy
    }

    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggregationFunc;

    #[test]
    fn commit_shifts_warning_indices() {
        let config = EvaluationConfig::new().with_disable_warnings(true);
        let mut accumulator = Accumulator::default();
        assert_eq!(accumulator.state(), MetricState::Idle);

        accumulator.commit("test", vec![1.0, 0.0], Vec::new(), &config);
        accumulator.commit(
            "test",
            vec![0.0],
            vec![
                DegenerateInput::sample(0, Degeneracy::EmptyMask),
                DegenerateInput::batch(Degeneracy::ZeroAttributionMass),
            ],
            &config,
        );

        assert_eq!(accumulator.state(), MetricState::Accumulating);
        assert_eq!(accumulator.results(), &[1.0, 0.0, 0.0]);
        assert_eq!(accumulator.warnings()[0].sample, Some(2));
        assert_eq!(accumulator.warnings()[1].sample, None);
    }

    #[test]
    fn commit_returns_aggregate_when_requested() {
        let config = EvaluationConfig::new()
            .with_return_aggregate(true)
            .with_aggregate_func(AggregationFunc::Median);
        let mut accumulator = Accumulator::default();

        let output = accumulator.commit("test", vec![0.0, 0.3, 1.0], Vec::new(), &config);
        assert_eq!(output, EvaluationOutput::Aggregate(0.3));
        assert_eq!(output.scores(), None);
        // The ledger still keeps individual scores.
        assert_eq!(accumulator.results().len(), 3);
    }

    #[test]
    fn output_accessors() {
        let per_sample = EvaluationOutput::PerSample(vec![0.5]);
        assert_eq!(per_sample.scores(), Some(&[0.5][..]));
        assert_eq!(per_sample.aggregate(), None);
        assert_eq!(per_sample.into_scores(), Some(vec![0.5]));
        assert_eq!(EvaluationOutput::Aggregate(0.25).aggregate(), Some(0.25));
    }
}
