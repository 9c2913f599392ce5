//! Configuration for localisation metrics.
//!
//! This module is organized into two submodules:
//! - `core`: evaluation settings shared by every metric and per-call overrides
//! - `enums`: enumeration types for string-selectable options

pub mod core;
pub mod enums;

pub use self::core::*;
pub use self::enums::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocalisationError;

    #[test]
    fn default_configuration_is_valid() {
        assert!(EvaluationConfig::new().validate().is_ok());
    }

    #[test]
    fn conflicting_sign_clipping_is_rejected() {
        let config = EvaluationConfig::new()
            .with_pos_only(true)
            .with_neg_only(true);

        match config.validate() {
            Err(LocalisationError::UnsupportedConfiguration { reason }) => {
                assert!(reason.contains("pos_only and neg_only"));
            }
            _ => panic!("Expected UnsupportedConfiguration error"),
        }
    }

    #[test]
    fn mask_threshold_out_of_range_is_rejected() {
        for threshold in [0.0, -0.5, 1.5, f32::NAN] {
            let config = EvaluationConfig::new().with_mask_threshold(threshold);
            assert!(matches!(
                config.validate(),
                Err(LocalisationError::UnsupportedConfiguration { .. })
            ));
        }
    }

    #[test]
    fn overrides_apply_to_a_copy() {
        let stored = EvaluationConfig::new().with_abs(true);
        let overrides = EvaluationOverrides::new()
            .with_abs(Some(false))
            .with_return_aggregate(Some(true))
            .with_aggregate_func(Some(AggregationFunc::Median));

        let merged = stored.merged(&overrides);
        assert!(!merged.abs);
        assert!(merged.return_aggregate);
        assert_eq!(merged.aggregate_func, AggregationFunc::Median);
        assert!(merged.normalise);

        assert!(stored.abs);
        assert!(!stored.return_aggregate);
    }

    #[test]
    fn string_options_parse() {
        assert_eq!("MEAN".parse::<AggregationFunc>().unwrap(), AggregationFunc::Mean);
        assert_eq!("median".parse::<AggregationFunc>().unwrap(), AggregationFunc::Median);
        assert!(matches!(
            "mode".parse::<AggregationFunc>(),
            Err(LocalisationError::UnsupportedConfiguration { .. })
        ));

        assert_eq!("white".parse::<FillValue>().unwrap(), FillValue::White);
        assert_eq!("0.25".parse::<FillValue>().unwrap(), FillValue::Value(0.25));
        assert!("grey".parse::<FillValue>().is_err());
    }
}
