//! # Localisation metrics for Burn
//!
//! This crate scores feature-attribution explanations of Burn classifiers by
//! how well they localise: whether the most relevant pixels of an attribution
//! map fall inside a ground-truth region of interest.
//!
//! ## Modules
//!
//! - `config`: evaluation settings shared by every metric, per-call overrides
//!   and string-selectable enumerations.
//! - `error`: the fatal error type and the degenerate-input warnings.
//! - `explain`: the explainer capability and two control-variate baselines.
//! - `metrics`: the accumulation contract and the seven metrics.
//! - `model`: the model interface metrics and explainers call through.
//! - `mosaic`: mosaic construction for the focus metric.
//!
//! ## Key Components
//!
//! - `LocalisationMetric`: a mask-based metric, built from one of
//!   `PointingGameConfig`, `TopKIntersectionConfig`,
//!   `RelevanceRankAccuracyConfig`, `RelevanceMassAccuracyConfig`, `AucConfig`
//!   or `AttributionLocalisationConfig`.
//! - `FocusMetric`: the mosaic-based discriminability test, built from `FocusConfig`.
//! - `EvaluationOutput`: per-sample scores or their aggregate.

mod config;
mod error;
mod explain;
mod metrics;
mod model;
mod mosaic;
mod validation;

#[doc(inline)]
pub use config::{AggregationFunc, EvaluationConfig, EvaluationOverrides, FillValue};
#[doc(inline)]
pub use error::{Degeneracy, DegenerateInput, LocalisationError, LocalisationResult};
#[doc(inline)]
pub use explain::{ConstantExplainer, ExplainOptions, Explainer, SobelExplainer};
#[doc(inline)]
pub use metrics::{
    aggregate, AttributionLocalisation, AttributionLocalisationConfig, Auc, AucConfig, Batch,
    EvaluationOutput, FocusConfig, FocusMetric, LocalisationMetric, LocalisationStrategy,
    MetricState, MosaicBatch, PointingGame, PointingGameConfig, RelevanceMassAccuracy,
    RelevanceMassAccuracyConfig, RelevanceRankAccuracy, RelevanceRankAccuracyConfig,
    TopKIntersection, TopKIntersectionConfig,
};
#[doc(inline)]
pub use model::{ModelInterface, ModelWrapper};
#[doc(inline)]
pub use mosaic::{compose_mosaic, mosaic_creation, MosaicSet};
