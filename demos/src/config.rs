//! Configuration for the localisation demos.
//!
//! Both binaries read an optional JSON file into [`DemoConfig`] and then apply
//! their command-line overrides on top of it.

use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use burn::prelude::Backend;
use localisation::{
    AggregationFunc, AttributionLocalisationConfig, AucConfig, EvaluationConfig,
    LocalisationError, LocalisationMetric, LocalisationResult, PointingGameConfig,
    RelevanceMassAccuracyConfig, RelevanceRankAccuracyConfig, TopKIntersectionConfig,
};
use serde::{Deserialize, Serialize};

/// Mask-based metrics selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    PointingGame,
    TopKIntersection,
    RelevanceRankAccuracy,
    RelevanceMassAccuracy,
    Auc,
    AttributionLocalisation,
}

impl MetricKind {
    pub const ALL: [Self; 6] = [
        Self::PointingGame,
        Self::TopKIntersection,
        Self::RelevanceRankAccuracy,
        Self::RelevanceMassAccuracy,
        Self::Auc,
        Self::AttributionLocalisation,
    ];

    /// Builds the metric with the demo settings applied.
    pub fn build<B: Backend, const D: usize>(
        self,
        config: &DemoConfig,
    ) -> LocalisationResult<LocalisationMetric<B, D>> {
        let evaluation = config.evaluation();
        match self {
            Self::PointingGame => PointingGameConfig::new()
                .with_weighted(config.weighted)
                .with_evaluation(evaluation)
                .init(),
            Self::TopKIntersection => TopKIntersectionConfig::new()
                .with_k(config.top_k)
                .with_evaluation(evaluation)
                .init(),
            Self::RelevanceRankAccuracy => RelevanceRankAccuracyConfig::new()
                .with_evaluation(evaluation)
                .init(),
            Self::RelevanceMassAccuracy => RelevanceMassAccuracyConfig::new()
                .with_evaluation(evaluation)
                .init(),
            Self::Auc => AucConfig::new().with_evaluation(evaluation).init(),
            Self::AttributionLocalisation => AttributionLocalisationConfig::new()
                .with_weighted(config.weighted)
                .with_evaluation(evaluation.with_abs(true))
                .init(),
        }
    }
}

impl FromStr for MetricKind {
    type Err = LocalisationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "pointing_game" => Ok(Self::PointingGame),
            "top_k_intersection" | "top_k" => Ok(Self::TopKIntersection),
            "relevance_rank_accuracy" | "rra" => Ok(Self::RelevanceRankAccuracy),
            "relevance_mass_accuracy" | "rma" => Ok(Self::RelevanceMassAccuracy),
            "auc" => Ok(Self::Auc),
            "attribution_localisation" => Ok(Self::AttributionLocalisation),
            other => Err(LocalisationError::UnsupportedConfiguration {
                reason: format!("unknown metric '{other}'"),
            }),
        }
    }
}

/// Settings shared by the demo binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Metrics to run, in order.
    pub metrics: Vec<MetricKind>,
    /// Samples per synthetic scenario.
    pub samples: usize,
    /// Side length of synthetic images.
    pub side: usize,
    /// Seed for synthetic data and mosaics.
    pub seed: u64,
    /// `k` of the top-k intersection.
    pub top_k: usize,
    /// Weighted variants of the pointing game and attribution localisation.
    pub weighted: bool,
    /// Mask binarization threshold.
    pub mask_threshold: f32,
    pub normalise: bool,
    pub return_aggregate: bool,
    pub aggregate_func: AggregationFunc,
    pub disable_warnings: bool,
    pub display_progressbar: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            metrics: MetricKind::ALL.to_vec(),
            samples: 8,
            side: 32,
            seed: 42,
            top_k: 64,
            weighted: false,
            mask_threshold: 0.5,
            normalise: true,
            return_aggregate: false,
            aggregate_func: AggregationFunc::Mean,
            disable_warnings: false,
            display_progressbar: false,
        }
    }
}

impl DemoConfig {
    /// Reads a JSON configuration, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn evaluation(&self) -> EvaluationConfig {
        EvaluationConfig::new()
            .with_normalise(self.normalise)
            .with_return_aggregate(self.return_aggregate)
            .with_aggregate_func(self.aggregate_func.clone())
            .with_mask_threshold(self.mask_threshold)
            .with_disable_warnings(self.disable_warnings)
            .with_display_progressbar(self.display_progressbar)
    }
}
