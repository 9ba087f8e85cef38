use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, versioned rule for dropping outlying quotes and picking the
/// reference price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Exclusion runs only when an item has at least this many quotes.
    #[serde(default = "default_min_quotes")]
    pub min_quotes: usize,
    pub rule: OutlierRule,
    /// Statistic over the surviving quotes once exclusion ran.
    #[serde(default)]
    pub final_statistic: Statistic,
    /// Statistic used when the item has fewer than `min_quotes` quotes.
    #[serde(default)]
    pub small_sample_statistic: Statistic,
}

fn default_min_quotes() -> usize {
    5
}

/// How a quote is judged abnormally high or low within its own item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutlierRule {
    /// Two passes against the mean of the other quotes: highs first over all
    /// quotes, then lows over the quotes kept by the first pass.
    MeanOfOthers {
        upper_ratio: Decimal,
        lower_ratio: Decimal,
    },
    /// One pass against the median of all quotes.
    MedianBand {
        upper_fraction: Decimal,
        lower_fraction: Decimal,
    },
    /// Tukey fences over linearly interpolated quartiles.
    Iqr { k: Decimal },
}

impl fmt::Display for OutlierRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlierRule::MeanOfOthers {
                upper_ratio,
                lower_ratio,
            } => write!(
                f,
                "high if v / mean_of_others > {upper_ratio}, then low if v / mean_of_others < {lower_ratio}"
            ),
            OutlierRule::MedianBand {
                upper_fraction,
                lower_fraction,
            } => write!(
                f,
                "high if v > median * (1 + {upper_fraction}), low if v < median * (1 - {lower_fraction})"
            ),
            OutlierRule::Iqr { k } => {
                write!(f, "high if v > Q3 + {k} * IQR, low if v < Q1 - {k} * IQR")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statistic {
    #[default]
    Mean,
    Median,
    /// Mean when the coefficient of variation is below the threshold,
    /// median otherwise.
    CvSwitch { cv_threshold: Decimal },
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Mean => write!(f, "mean"),
            Statistic::Median => write!(f, "median"),
            Statistic::CvSwitch { cv_threshold } => {
                write!(f, "mean if CV < {cv_threshold}, otherwise median")
            }
        }
    }
}

impl PolicyDef {
    /// One-line statement of the whole policy, for audit output.
    pub fn rule_text(&self) -> String {
        format!(
            "N >= {}: {}; final value = {}. N < {}: no exclusion; final value = {}",
            self.min_quotes,
            self.rule,
            self.final_statistic,
            self.min_quotes,
            self.small_sample_statistic
        )
    }
}
