use crate::aggregate::outcome::{AggregatedItem, ExclusionDirection, FinalMethod};
use crate::policy::schema::PolicyDef;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const AUDIT_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSeverity {
    Critical,
    Important,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EmptyExtraction,
    UnrecognizedReport,
    MalformedCatalogCode,
    UnparseablePrice,
    /// Composing row without a price.
    MissingPrice,
    FullyExcluded,
    OrphanLines,
    /// Surviving quotes too large for the statistic to be computed.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceWarning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    pub message: String,
    pub severity: TraceSeverity,
}

impl TraceWarning {
    /// Warning about the document as a whole.
    pub fn document(kind: WarningKind, message: impl Into<String>, severity: TraceSeverity) -> Self {
        Self {
            kind,
            item_id: None,
            sequence_number: None,
            message: message.into(),
            severity,
        }
    }

    pub fn item(
        kind: WarningKind,
        item_id: &str,
        message: impl Into<String>,
        severity: TraceSeverity,
    ) -> Self {
        Self {
            kind,
            item_id: Some(item_id.to_string()),
            sequence_number: None,
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedValue {
    pub sequence_number: String,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<Decimal>,
}

/// Calculation record for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAudit {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_code: Option<String>,
    pub policy: String,
    pub rule: String,
    pub initial_values: Vec<Decimal>,
    pub excluded_high: Vec<ExcludedValue>,
    pub excluded_low: Vec<ExcludedValue>,
    pub final_values: Vec<Decimal>,
    pub count_final: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficient_of_variation: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<FinalMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrail {
    pub audit_schema_version: String,
    pub items: Vec<ItemAudit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TraceWarning>,
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self {
            audit_schema_version: AUDIT_SCHEMA_VERSION.to_string(),
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl AuditTrail {
    pub fn critical_warnings(&self) -> impl Iterator<Item = &TraceWarning> {
        self.warnings
            .iter()
            .filter(|w| w.severity == TraceSeverity::Critical)
    }
}

pub fn build_item_audit(item: &AggregatedItem, policy: &PolicyDef) -> ItemAudit {
    let excluded = |direction| {
        item.exclusions_in(direction)
            .map(|e| ExcludedValue {
                sequence_number: item
                    .raw_values
                    .get(e.index)
                    .map(|r| r.sequence_number.clone())
                    .unwrap_or_default(),
                value: e.value,
                reference: e.reference,
                ratio: e.ratio,
            })
            .collect::<Vec<_>>()
    };

    ItemAudit {
        item_id: item.item_id.clone(),
        catalog_code: item.catalog_code.clone(),
        policy: item.policy.clone(),
        rule: policy.rule_text(),
        initial_values: item.raw_values.iter().map(|r| r.value).collect(),
        excluded_high: excluded(ExclusionDirection::High),
        excluded_low: excluded(ExclusionDirection::Low),
        final_values: item.surviving_values().iter().map(|r| r.value).collect(),
        count_final: item.count_final,
        coefficient_of_variation: item.coefficient_of_variation,
        method: item.method,
        final_value: item.final_value,
    }
}

pub fn build_audit_trail(
    items: &[AggregatedItem],
    policy: &PolicyDef,
    warnings: Vec<TraceWarning>,
) -> AuditTrail {
    AuditTrail {
        items: items.iter().map(|i| build_item_audit(i, policy)).collect(),
        warnings,
        ..AuditTrail::default()
    }
}
