//! Printable evaluation results.

use serde::Serialize;

use localisation::{aggregate, AggregationFunc, DegenerateInput, EvaluationOutput};

/// One metric's result on one batch.
#[derive(Debug, Clone, Serialize)]
pub struct MetricReport {
    pub metric: String,
    pub scenario: String,
    pub output: EvaluationOutput,
    /// Mean of the per-sample scores, or the aggregate itself.
    pub summary: f64,
    pub warnings: Vec<String>,
}

impl MetricReport {
    pub fn new(
        metric: &str,
        scenario: &str,
        output: EvaluationOutput,
        warnings: &[DegenerateInput],
    ) -> Self {
        let summary = match &output {
            EvaluationOutput::PerSample(scores) => aggregate(scores, &AggregationFunc::Mean),
            EvaluationOutput::Aggregate(value) => *value,
        };
        Self {
            metric: metric.to_owned(),
            scenario: scenario.to_owned(),
            output,
            summary,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }

    /// A single human-readable line.
    pub fn line(&self) -> String {
        format!(
            "{:<28} {:<12} {:>8.4}  ({} warnings)",
            self.metric,
            self.scenario,
            self.summary,
            self.warnings.len()
        )
    }
}
