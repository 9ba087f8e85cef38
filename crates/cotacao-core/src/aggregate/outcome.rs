use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One quoted value as collected for an item, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawValue {
    /// Position in the item's `raw_values`.
    pub index: usize,
    pub value: Decimal,
    /// Vendor the value was quoted by.
    pub source_label: String,
    pub sequence_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionDirection {
    /// Abnormally high ("excessivamente elevado").
    High,
    /// Abnormally low ("inexequível").
    Low,
}

/// A quote dropped from the reference price computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Index into the item's `raw_values`.
    pub index: usize,
    pub value: Decimal,
    pub direction: ExclusionDirection,
    /// Value the quote was compared against (mean of others, median or fence).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<Decimal>,
}

/// Statistic actually used for the final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalMethod {
    Mean,
    Median,
}

impl fmt::Display for FinalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalMethod::Mean => write!(f, "Média"),
            FinalMethod::Median => write!(f, "Mediana"),
        }
    }
}

/// Aggregation result for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedItem {
    pub item_id: String,
    pub catalog_code: Option<String>,
    /// Name of the policy that produced this result.
    pub policy: String,
    pub raw_values: Vec<RawValue>,
    pub count_raw: usize,
    pub count_excluded_high: usize,
    pub count_excluded_low: usize,
    pub count_final: usize,
    /// Excluded quotes, ordered by index.
    pub exclusions: Vec<Exclusion>,
    pub method: Option<FinalMethod>,
    /// Population coefficient of variation of the surviving values.
    pub coefficient_of_variation: Option<Decimal>,
    /// None when no usable quote remains.
    pub final_value: Option<Decimal>,
}

impl AggregatedItem {
    /// Final value rounded to cents.
    pub fn reference_price(&self) -> Option<Decimal> {
        self.final_value.map(|v| v.round_dp(2))
    }

    pub fn is_excluded(&self, index: usize) -> bool {
        self.exclusions.iter().any(|e| e.index == index)
    }

    /// Values that took part in the final statistic, in document order.
    pub fn surviving_values(&self) -> Vec<&RawValue> {
        self.raw_values
            .iter()
            .filter(|r| !self.is_excluded(r.index))
            .collect()
    }

    pub fn exclusions_in(&self, direction: ExclusionDirection) -> impl Iterator<Item = &Exclusion> {
        self.exclusions
            .iter()
            .filter(move |e| e.direction == direction)
    }

    /// True when quotes existed but none survived exclusion.
    pub fn is_fully_excluded(&self) -> bool {
        self.count_raw > 0 && self.count_final == 0
    }
}
