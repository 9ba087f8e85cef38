use crate::model::{ExtractionStats, NormalizedQuote, QuoteDataset, QuoteRecord, SourceKind};
use crate::parsing::values::parse_price;
use crate::trace::{TraceSeverity, TraceWarning, WarningKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use tracing::warn;

const UNITS: &str = "unidades?|embalagem|kit|caixa|frasco|pacote|ampola|tubo|rolo|par|jogo|lote";

/// "R$ <price> [dd/mm/yyyy [Sim|Não]]". Digit groups after the first must be
/// thousands-shaped so a following number is never taken into the price.
static PRICE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)R\$\s*(\d{1,3}(?:[.\s]\d{3})+(?:,\d+)?|\d+(?:,\d+)?)(?:\s+(\d{2}/\d{2}/\d{4})(?:\s+(sim|não|nao))?)?(?:\s|$)",
    )
    .unwrap()
});

/// Any "R$" followed by a token that is not a well-formed price.
static LOOSE_PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"R\$\s*(\S*)").unwrap());

static DATE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(\d{2}/\d{2}/\d{4})(?:\s+(sim|não|nao))?(?:\s|$)").unwrap()
});

static QUANTITY_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:^|\s)(\d+)\s*(?:{UNITS})\s*$")).unwrap()
});

static QUANTITY_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)^\s*(\d+)\s*(?:{UNITS})\b")).unwrap());

static SOURCE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(IV|V|I{1,3})\s+").unwrap());

static CATALOG_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{6}$").unwrap());

/// Normalized dataset plus the data problems found while building it.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutput {
    pub dataset: QuoteDataset,
    pub warnings: Vec<TraceWarning>,
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn closed records into the typed dataset, row order preserved.
///
/// Never fails: an unparseable price or malformed catalog code becomes a
/// null field plus a warning, and the row is kept for manual review.
pub fn normalize_records(records: &[QuoteRecord]) -> NormalizeOutput {
    let mut warnings = Vec::new();
    let rows = records
        .iter()
        .map(|r| normalize_record(r, &mut warnings))
        .collect();

    NormalizeOutput {
        dataset: QuoteDataset { rows },
        warnings,
    }
}

fn normalize_record(record: &QuoteRecord, warnings: &mut Vec<TraceWarning>) -> NormalizedQuote {
    let name = collapse_whitespace(&record.raw_name_text);

    let mut value = None;
    let mut quote_date = None;
    let mut markup_compose = None;
    let mut before = name.as_str();
    let mut after = "";

    // Text after the price block is a wrapped piece of the vendor name.
    if let Some(caps) = PRICE_BLOCK.captures_iter(&name).last() {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        value = price_value(record, &caps[1], warnings);
        quote_date = caps.get(2).map(|m| m.as_str().to_string());
        markup_compose = caps.get(3).map(|m| m.as_str().eq_ignore_ascii_case("sim"));
        before = &name[..whole.start];
        after = &name[whole.end..];
    } else if let Some(caps) = LOOSE_PRICE.captures_iter(&name).last() {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        value = price_value(record, &caps[1], warnings);
        before = &name[..whole.start];
        after = &name[whole.end..];
    }

    let mut quantity = None;
    if let Some(q) = QUANTITY_TAIL.captures(before) {
        quantity = q[1].parse::<u64>().ok();
        before = &before[..q.get(0).map(|m| m.start()).unwrap_or(0)];
    } else if let Some(q) = QUANTITY_HEAD.captures(after) {
        quantity = q[1].parse::<u64>().ok();
        after = &after[q.get(0).map(|m| m.end()).unwrap_or(0)..];
    }

    let mut rest = collapse_whitespace(&format!("{before} {after}"));
    if quote_date.is_none() {
        let found = DATE_MARKUP.captures_iter(&rest).last().map(|caps| {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let compose = caps.get(2).map(|m| m.as_str().eq_ignore_ascii_case("sim"));
            (whole, caps[1].to_string(), compose)
        });
        if let Some((whole, date, compose)) = found {
            quote_date = Some(date);
            markup_compose = compose;
            rest = collapse_whitespace(&format!("{} {}", &rest[..whole.start], &rest[whole.end..]));
        }
    }

    let (source, vendor) = match SOURCE_PREFIX.captures(&rest) {
        Some(caps) => {
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            (SourceKind::from_numeral(&caps[1]), rest[end..].to_string())
        }
        None => (None, rest),
    };

    let catalog_code = match record.catalog_code.as_deref().map(str::trim) {
        Some(code) if CATALOG_CODE.is_match(code) => Some(code.to_string()),
        Some(code) => {
            warnings.push(row_warning(
                record,
                WarningKind::MalformedCatalogCode,
                format!("Catalog code '{}' of item {} is not six digits", code, record.group_id),
            ));
            None
        }
        None => None,
    };

    NormalizedQuote {
        group_id: record.group_id.trim().to_string(),
        catalog_item_id: record.group_id.trim().to_string(),
        catalog_code,
        sequence_number: record.sequence_number.trim().to_string(),
        name,
        vendor,
        source,
        quantity,
        value,
        quote_date,
        markup_compose,
        compose_flag: markup_compose.unwrap_or(true),
        page_number: record.page_number,
    }
}

fn price_value(
    record: &QuoteRecord,
    token: &str,
    warnings: &mut Vec<TraceWarning>,
) -> Option<Decimal> {
    match parse_price(token) {
        Ok(v) => v,
        Err(e) => {
            warn!(item = %record.group_id, seq = %record.sequence_number, "{e}");
            warnings.push(row_warning(
                record,
                WarningKind::UnparseablePrice,
                format!("Quote {} price not parsed: {}", record.sequence_number, e),
            ));
            None
        }
    }
}

fn row_warning(record: &QuoteRecord, kind: WarningKind, message: String) -> TraceWarning {
    TraceWarning {
        kind,
        item_id: Some(record.group_id.clone()),
        sequence_number: Some(record.sequence_number.clone()),
        message,
        severity: TraceSeverity::Important,
    }
}

/// Row counts and the share of rows left without a name.
pub fn compute_stats(dataset: &QuoteDataset) -> ExtractionStats {
    let total_rows = dataset.rows.len();
    let empty_name_rows = dataset.rows.iter().filter(|r| r.name.is_empty()).count();
    let empty_name_pct = if total_rows == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(empty_name_rows) * Decimal::ONE_HUNDRED / Decimal::from(total_rows))
            .round_dp(2)
    };

    ExtractionStats {
        total_rows,
        empty_name_rows,
        empty_name_pct,
    }
}
