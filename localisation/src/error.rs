use core::fmt;

use thiserror::Error;

/// The error type for localisation-metric operations.
///
/// Every variant aborts the call that produced it. Per-sample degenerate
/// inputs are not errors; they are reported as [`DegenerateInput`] warnings.
#[derive(Error, Debug)]
pub enum LocalisationError {
    /// Batch cardinality or spatial shapes disagree among inputs, targets,
    /// attributions and masks.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// What the batch should have looked like.
        expected: String,
        /// What was supplied.
        actual: String,
    },

    /// The model is in training mode, or is missing where one is required.
    #[error("Invalid model state: {reason}")]
    InvalidModelState {
        /// Why the model cannot be used.
        reason: String,
    },

    /// Attributions were not supplied and no explainer is configured.
    #[error("Missing model: {reason}")]
    MissingModel {
        /// What was missing.
        reason: String,
    },

    /// A configuration value is out of range or not recognised.
    #[error("Unsupported configuration: {reason}")]
    UnsupportedConfiguration {
        /// The offending option and value.
        reason: String,
    },

    /// The focus metric was given no mosaics to score.
    #[error("Empty mosaic batch: {reason}")]
    EmptyMosaicBatch {
        /// What was empty.
        reason: String,
    },

    /// An explainer returned attributions that cannot be scored.
    #[error("Explanation failed: {message}")]
    ExplanationFailed {
        /// The explainer's error message.
        message: String,
    },

    /// A tensor could not be read back from the device.
    #[error("Tensor operation failed: {operation}")]
    TensorOperationFailed {
        /// A description of the failed operation.
        operation: String,
    },
}

/// A specialized `Result` type for localisation-metric operations.
pub type LocalisationResult<T> = Result<T, LocalisationError>;

/// The kind of degenerate input encountered while scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum Degeneracy {
    /// The mask has no region-of-interest pixel.
    EmptyMask,
    /// Every attribution value of the sample is identical.
    ConstantAttribution,
    /// The mask covers every pixel or none, so the ROC curve is undefined.
    SingleClassMask,
    /// The attribution mass the score divides by is zero.
    ZeroAttributionMass,
    /// The mask covers a larger share of the sample than allowed.
    MaskExceedsMaxSize {
        /// Mask area over sample area.
        ratio: f64,
        /// Configured maximum ratio.
        max_size: f64,
    },
    /// A numeric parameter was larger than the sample and was clamped.
    ParameterClamped {
        /// Parameter name.
        parameter: &'static str,
        /// Requested value.
        requested: usize,
        /// Value used instead.
        clamped: usize,
    },
    /// The score fell outside `[0, 1]` and was clamped.
    ScoreOutOfRange {
        /// The unclamped score.
        score: f64,
    },
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMask => write!(f, "mask has no region-of-interest pixel"),
            Self::ConstantAttribution => write!(f, "attribution map is constant"),
            Self::SingleClassMask => {
                write!(f, "mask covers every pixel or none, ROC area is undefined")
            }
            Self::ZeroAttributionMass => write!(f, "attribution mass is zero"),
            Self::MaskExceedsMaxSize { ratio, max_size } => {
                write!(f, "mask covers {ratio:.4} of the sample, above max_size {max_size}")
            }
            Self::ParameterClamped {
                parameter,
                requested,
                clamped,
            } => write!(f, "{parameter}={requested} exceeds the sample size, clamped to {clamped}"),
            Self::ScoreOutOfRange { score } => {
                write!(f, "score {score:.4} is outside [0, 1], clamped")
            }
        }
    }
}

/// A warning-level degenerate input, recorded without aborting the call.
#[derive(Debug, Clone, PartialEq)]
pub struct DegenerateInput {
    /// Position of the affected score in the accumulated results, or `None`
    /// when the condition concerns the whole call.
    pub sample: Option<usize>,
    /// What was degenerate.
    pub kind: Degeneracy,
}

impl DegenerateInput {
    pub const fn sample(index: usize, kind: Degeneracy) -> Self {
        Self {
            sample: Some(index),
            kind,
        }
    }

    pub const fn batch(kind: Degeneracy) -> Self {
        Self { sample: None, kind }
    }

    /// Moves a batch-relative sample index into accumulated-results space.
    #[must_use]
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            sample: self.sample.map(|index| index + offset),
            kind: self.kind,
        }
    }
}

impl fmt::Display for DegenerateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sample {
            Some(index) => write!(f, "sample {index}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}
