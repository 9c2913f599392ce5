//! Enumeration types for metric configuration.
//!
//! String forms are accepted through [`FromStr`] so options can come from a
//! command line or a JSON file; unknown values are rejected with
//! [`LocalisationError::UnsupportedConfiguration`].

use core::str::FromStr;

use burn::prelude::*;

use crate::error::LocalisationError;

/// Reduction applied to per-sample scores when an aggregate is requested.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum AggregationFunc {
    /// Arithmetic mean.
    Mean,
    /// Median; the mean of the two middle scores for an even count.
    Median,
}

impl FromStr for AggregationFunc {
    type Err = LocalisationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            other => Err(LocalisationError::UnsupportedConfiguration {
                reason: format!("unknown aggregation function '{other}', expected 'mean' or 'median'"),
            }),
        }
    }
}

/// Fill policy of the constant control-variate explainer.
#[derive(Config, Debug, PartialEq)]
pub enum FillValue {
    /// The smallest input value of the batch.
    Black,
    /// The largest input value of the batch.
    White,
    /// A single draw from `[0, 1)`.
    Random,
    /// A single draw between the smallest and largest input value.
    Uniform,
    /// A fixed value.
    Value(f32),
}

impl FromStr for FillValue {
    type Err = LocalisationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::Black),
            "white" => Ok(Self::White),
            "random" => Ok(Self::Random),
            "uniform" => Ok(Self::Uniform),
            other => other.parse::<f32>().map(Self::Value).map_err(|_| {
                LocalisationError::UnsupportedConfiguration {
                    reason: format!(
                        "unknown fill value '{other}', expected black, white, random, uniform or a number"
                    ),
                }
            }),
        }
    }
}
