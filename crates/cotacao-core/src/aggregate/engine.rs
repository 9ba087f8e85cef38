use crate::aggregate::outcome::{AggregatedItem, Exclusion, ExclusionDirection, RawValue};
use crate::aggregate::rules::{apply_statistic, coefficient_of_variation, mark_outliers, Mark};
use crate::model::{NormalizedQuote, QuoteDataset};
use crate::policy::schema::PolicyDef;
use crate::trace::{TraceSeverity, TraceWarning, WarningKind};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct AggregateOutput {
    pub items: Vec<AggregatedItem>,
    pub warnings: Vec<TraceWarning>,
}

/// Compute one reference price per catalog item over the composing rows.
///
/// Items come out in order of first appearance in the dataset.
pub fn aggregate(dataset: &QuoteDataset, policy: &PolicyDef) -> AggregateOutput {
    let mut out = AggregateOutput::default();

    for (item_id, rows) in group_composing(dataset) {
        let mut raw_values = Vec::new();
        for row in &rows {
            match row.value {
                Some(value) => raw_values.push(RawValue {
                    index: raw_values.len(),
                    value,
                    source_label: row.vendor.clone(),
                    sequence_number: row.sequence_number.clone(),
                }),
                None => out.warnings.push(TraceWarning {
                    kind: WarningKind::MissingPrice,
                    item_id: Some(item_id.clone()),
                    sequence_number: Some(row.sequence_number.clone()),
                    message: format!(
                        "quote {} of item {} composes but has no price; skipped",
                        row.sequence_number, item_id
                    ),
                    severity: TraceSeverity::Important,
                }),
            }
        }

        let catalog_code = rows.iter().find_map(|r| r.catalog_code.clone());
        let item = aggregate_item(item_id, catalog_code, raw_values, policy);

        if item.is_fully_excluded() {
            warn!(item = %item.item_id, "every quote was excluded");
            out.warnings.push(TraceWarning::item(
                WarningKind::FullyExcluded,
                &item.item_id,
                format!(
                    "all {} quotes of item {} were excluded; no reference price",
                    item.count_raw, item.item_id
                ),
                TraceSeverity::Critical,
            ));
        }
        if item.count_final > 0 && item.final_value.is_none() {
            warn!(item = %item.item_id, "reference price does not fit in a decimal");
            out.warnings.push(TraceWarning::item(
                WarningKind::Overflow,
                &item.item_id,
                format!(
                    "quotes of item {} are too large to compute a reference price",
                    item.item_id
                ),
                TraceSeverity::Critical,
            ));
        }
        out.items.push(item);
    }

    out
}

fn group_composing(dataset: &QuoteDataset) -> Vec<(String, Vec<&NormalizedQuote>)> {
    let mut groups: Vec<(String, Vec<&NormalizedQuote>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in dataset.composing() {
        match index.get(row.catalog_item_id.as_str()) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(row.catalog_item_id.as_str(), groups.len());
                groups.push((row.catalog_item_id.clone(), vec![row]));
            }
        }
    }

    groups
}

/// Apply a policy to the raw values of one item.
pub fn aggregate_item(
    item_id: String,
    catalog_code: Option<String>,
    raw_values: Vec<RawValue>,
    policy: &PolicyDef,
) -> AggregatedItem {
    let values: Vec<Decimal> = raw_values.iter().map(|r| r.value).collect();
    let count_raw = values.len();

    let (marks, statistic) = if count_raw >= policy.min_quotes {
        (mark_outliers(&policy.rule, &values), &policy.final_statistic)
    } else {
        (vec![Mark::Kept; count_raw], &policy.small_sample_statistic)
    };

    let mut exclusions = Vec::new();
    let mut survivors = Vec::new();
    for (index, (&value, mark)) in values.iter().zip(&marks).enumerate() {
        match *mark {
            Mark::Kept => survivors.push(value),
            Mark::Excluded {
                direction,
                reference,
                ratio,
            } => exclusions.push(Exclusion {
                index,
                value,
                direction,
                reference,
                ratio,
            }),
        }
    }

    let count_excluded_high = exclusions
        .iter()
        .filter(|e| e.direction == ExclusionDirection::High)
        .count();
    let count_excluded_low = exclusions.len() - count_excluded_high;
    let (method, final_value) = apply_statistic(statistic, &survivors);

    debug!(
        item = %item_id,
        count_raw,
        count_excluded_high,
        count_excluded_low,
        ?method,
        "aggregated item"
    );

    AggregatedItem {
        item_id,
        catalog_code,
        policy: policy.name.clone(),
        raw_values,
        count_raw,
        count_excluded_high,
        count_excluded_low,
        count_final: survivors.len(),
        exclusions,
        method,
        coefficient_of_variation: coefficient_of_variation(&survivors),
        final_value,
    }
}
