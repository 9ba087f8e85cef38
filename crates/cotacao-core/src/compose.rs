use crate::error::CotacaoError;
use crate::model::{NormalizedQuote, QuoteDataset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Caller selection of the quotes that compose each reference price.
///
/// Keys are item ids (the group number) and, under `quotes`, sequence
/// numbers as printed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposePayload {
    #[serde(default = "default_compose")]
    pub default: bool,
    #[serde(default)]
    pub items: BTreeMap<String, bool>,
    #[serde(default)]
    pub quotes: BTreeMap<String, BTreeMap<String, bool>>,
}

fn default_compose() -> bool {
    true
}

impl Default for ComposePayload {
    fn default() -> Self {
        Self {
            default: true,
            items: BTreeMap::new(),
            quotes: BTreeMap::new(),
        }
    }
}

/// Load a compose payload from a JSON file.
pub fn load_payload(path: &Path) -> Result<ComposePayload, CotacaoError> {
    let content = std::fs::read_to_string(path).map_err(|e| CotacaoError::PayloadLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| CotacaoError::PayloadLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Parse a compose payload from a JSON string.
pub fn parse_payload_str(json: &str) -> Result<ComposePayload, CotacaoError> {
    Ok(serde_json::from_str(json)?)
}

/// Decide whether one row composes its item's price.
///
/// Precedence: quote entry, item entry, document markup, payload default.
pub fn resolve_compose(row: &NormalizedQuote, payload: Option<&ComposePayload>) -> bool {
    let Some(payload) = payload else {
        return row.markup_compose.unwrap_or(true);
    };

    if let Some(&flag) = payload
        .quotes
        .get(&row.catalog_item_id)
        .and_then(|q| q.get(&row.sequence_number))
    {
        return flag;
    }

    if let Some(&flag) = payload.items.get(&row.catalog_item_id) {
        return flag;
    }

    row.markup_compose.unwrap_or(payload.default)
}

pub fn apply_compose_payload(dataset: &mut QuoteDataset, payload: Option<&ComposePayload>) {
    for row in &mut dataset.rows {
        row.compose_flag = resolve_compose(row, payload);
    }
}
