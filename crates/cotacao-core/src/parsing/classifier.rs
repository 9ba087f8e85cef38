use regex::Regex;
use std::sync::LazyLock;

/// Lines at least this long are never treated as boilerplate, even when they
/// contain a footer pattern.
pub const NOISE_MAX_LEN: usize = 80;

/// Label assigned to one trimmed, non-blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    GroupHeader { group_id: String },
    CatalogCode { code: String },
    RecordStart { sequence_number: String, text: String },
    Noise,
    Continuation,
}

/// Builder state the classifier may consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext {
    /// True once a record has been opened under the current group header.
    pub group_has_records: bool,
}

static GROUP_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^item\s*:?\s*(\d+)\s*$").unwrap());

static RECORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^N(?:[º°o]\.?|\.)\s*(\d+)\s*[-–—]\s*(.*)$").unwrap());

static CATALOG_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{6})\s*[-–—]\s*\S").unwrap());

static NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bp[áa]gina\s*:?\s*\d+(?:\s*(?:de|/)\s*\d+)?",
        r"(?i)\bpage\s+\d+(?:\s+of\s+\d+)?",
        r"(?i)compras\.gov\.br|comprasnet|painel\s+de\s+pre[çc]os",
        r"(?i)total\s+de\s+linhas|linhas\s+extra[íi]das",
        r"(?i)^n[º°o]?\.?\s+inciso\s+nome\b",
        r"(?i)^legenda\s*:",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Classify one trimmed line. Blank lines must be filtered by the caller.
pub fn classify_line(line: &str, ctx: LineContext) -> LineClass {
    if let Some(caps) = GROUP_HEADER.captures(line) {
        return LineClass::GroupHeader {
            group_id: caps[1].to_string(),
        };
    }

    if let Some(caps) = RECORD_START.captures(line) {
        return LineClass::RecordStart {
            sequence_number: caps[1].to_string(),
            text: caps[2].trim().to_string(),
        };
    }

    // Catalog codes only appear in the item description block
    if !ctx.group_has_records {
        if let Some(caps) = CATALOG_CODE.captures(line) {
            return LineClass::CatalogCode {
                code: caps[1].to_string(),
            };
        }
    }

    if is_noise(line) {
        return LineClass::Noise;
    }

    LineClass::Continuation
}

/// Boilerplate check with the length guard applied.
pub fn is_noise(line: &str) -> bool {
    line.chars().count() < NOISE_MAX_LEN && NOISE.iter().any(|re| re.is_match(line))
}
