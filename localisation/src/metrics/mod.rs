//! Localisation metrics.
//!
//! Six mask-based metrics share [`LocalisationMetric`] and differ only in
//! their [`LocalisationStrategy`]; the mosaic-based [`FocusMetric`] has its
//! own batch type. Every metric is built from its config:
//!
//! ```ignore
//! let mut metric = PointingGameConfig::new().init::<B, 4>()?;
//! let output = metric.evaluate(Some(&model), &batch)?;
//! ```

mod aggregator;
mod attribution_localisation;
mod auc;
mod base;
mod focus;
mod input;
mod pointing_game;
mod relevance_mass_accuracy;
mod relevance_rank_accuracy;
mod top_k_intersection;

pub use aggregator::aggregate;
pub use attribution_localisation::{AttributionLocalisation, AttributionLocalisationConfig};
pub use auc::{Auc, AucConfig};
pub use base::{EvaluationOutput, LocalisationMetric, LocalisationStrategy, MetricState};
pub use focus::{FocusConfig, FocusMetric};
pub use input::{Batch, MosaicBatch};
pub use pointing_game::{PointingGame, PointingGameConfig};
pub use relevance_mass_accuracy::{RelevanceMassAccuracy, RelevanceMassAccuracyConfig};
pub use relevance_rank_accuracy::{RelevanceRankAccuracy, RelevanceRankAccuracyConfig};
pub use top_k_intersection::{TopKIntersection, TopKIntersectionConfig};
