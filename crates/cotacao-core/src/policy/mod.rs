pub mod builtin;
pub mod schema;

use crate::error::CotacaoError;
use rust_decimal::Decimal;
use schema::{OutlierRule, PolicyDef, Statistic};
use std::path::Path;

/// Load a policy from a JSON file.
pub fn load_policy(path: &Path) -> Result<PolicyDef, CotacaoError> {
    let content = std::fs::read_to_string(path).map_err(|e| CotacaoError::PolicyLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_policy(&content, path)
}

/// Parse a policy from a JSON string.
pub fn parse_policy(json: &str, source: &Path) -> Result<PolicyDef, CotacaoError> {
    let policy: PolicyDef = serde_json::from_str(json).map_err(|e| CotacaoError::PolicyLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_policy(&policy)?;
    Ok(policy)
}

/// Parse a policy from a JSON string (no file path context).
pub fn parse_policy_str(json: &str) -> Result<PolicyDef, CotacaoError> {
    let policy: PolicyDef = serde_json::from_str(json).map_err(CotacaoError::Json)?;
    validate_policy(&policy)?;
    Ok(policy)
}

/// Validate that a policy is well-formed.
pub fn validate_policy(policy: &PolicyDef) -> Result<(), CotacaoError> {
    if policy.name.trim().is_empty() {
        return Err(CotacaoError::PolicyInvalid(
            "name must not be empty".into(),
        ));
    }

    if policy.min_quotes == 0 {
        return Err(CotacaoError::PolicyInvalid(
            "min_quotes must be at least 1".into(),
        ));
    }

    match &policy.rule {
        OutlierRule::MeanOfOthers {
            upper_ratio,
            lower_ratio,
        } => {
            if *upper_ratio <= Decimal::ONE {
                return Err(CotacaoError::PolicyInvalid(format!(
                    "upper_ratio must be greater than 1 (got {})",
                    upper_ratio
                )));
            }
            if *lower_ratio <= Decimal::ZERO || *lower_ratio >= Decimal::ONE {
                return Err(CotacaoError::PolicyInvalid(format!(
                    "lower_ratio must be between 0 and 1 (got {})",
                    lower_ratio
                )));
            }
        }
        OutlierRule::MedianBand {
            upper_fraction,
            lower_fraction,
        } => {
            if *upper_fraction <= Decimal::ZERO {
                return Err(CotacaoError::PolicyInvalid(format!(
                    "upper_fraction must be positive (got {})",
                    upper_fraction
                )));
            }
            if *lower_fraction <= Decimal::ZERO || *lower_fraction >= Decimal::ONE {
                return Err(CotacaoError::PolicyInvalid(format!(
                    "lower_fraction must be between 0 and 1 (got {})",
                    lower_fraction
                )));
            }
        }
        OutlierRule::Iqr { k } => {
            if *k <= Decimal::ZERO {
                return Err(CotacaoError::PolicyInvalid(format!(
                    "k must be positive (got {})",
                    k
                )));
            }
        }
    }

    for statistic in [&policy.final_statistic, &policy.small_sample_statistic] {
        if let Statistic::CvSwitch { cv_threshold } = statistic {
            if *cv_threshold <= Decimal::ZERO {
                return Err(CotacaoError::PolicyInvalid(format!(
                    "cv_threshold must be positive (got {})",
                    cv_threshold
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_valid_policy() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "min_quotes": 3,
            "rule": { "kind": "mean_of_others", "upper_ratio": "1.5", "lower_ratio": "0.5" }
        }"#;
        let policy = parse_policy_str(json).unwrap();
        assert_eq!(policy.name, "Test");
        assert_eq!(policy.min_quotes, 3);
        assert_eq!(
            policy.rule,
            OutlierRule::MeanOfOthers {
                upper_ratio: dec!(1.5),
                lower_ratio: dec!(0.5)
            }
        );
        assert_eq!(policy.final_statistic, Statistic::Mean);
        assert_eq!(policy.small_sample_statistic, Statistic::Mean);
    }

    #[test]
    fn test_min_quotes_defaults_to_five() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "rule": { "kind": "iqr", "k": "3" }
        }"#;
        assert_eq!(parse_policy_str(json).unwrap().min_quotes, 5);
    }

    #[test]
    fn test_upper_ratio_not_above_one_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rule": { "kind": "mean_of_others", "upper_ratio": "0.9", "lower_ratio": "0.5" }
        }"#;
        assert!(matches!(
            parse_policy_str(json),
            Err(CotacaoError::PolicyInvalid(_))
        ));
    }

    #[test]
    fn test_lower_fraction_out_of_range_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rule": { "kind": "median_band", "upper_fraction": "0.3", "lower_fraction": "1" }
        }"#;
        assert!(parse_policy_str(json).is_err());
    }

    #[test]
    fn test_unknown_rule_kind_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rule": { "kind": "zscore", "z": "2" }
        }"#;
        assert!(matches!(parse_policy_str(json), Err(CotacaoError::Json(_))));
    }

    #[test]
    fn test_zero_cv_threshold_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rule": { "kind": "iqr", "k": "1.5" },
            "small_sample_statistic": { "kind": "cv_switch", "cv_threshold": "0" }
        }"#;
        assert!(parse_policy_str(json).is_err());
    }

    #[test]
    fn test_zero_min_quotes_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "min_quotes": 0,
            "rule": { "kind": "iqr", "k": "1.5" }
        }"#;
        assert!(parse_policy_str(json).is_err());
    }
}
