pub mod builder;
pub mod classifier;
pub mod header;
pub mod normalize;
pub mod values;

use crate::compose::{apply_compose_payload, ComposePayload};
use crate::extraction::{raw_lines, PageContent};
use crate::model::{ExtractionStats, QuoteDataset, QuoteRecord, ReportHeader};
use crate::trace::{TraceSeverity, TraceWarning, WarningKind};
use builder::build_records;
use header::detect_header;
use normalize::{compute_stats, normalize_records};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything recovered from one document before aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub header: ReportHeader,
    pub records: Vec<QuoteRecord>,
    pub dataset: QuoteDataset,
    pub stats: ExtractionStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TraceWarning>,
}

/// Parse extracted pages into the normalized quote dataset.
///
/// A document that does not match the expected line shape yields an empty
/// dataset and an `EmptyExtraction` warning, never an error.
pub fn parse_pages(pages: &[PageContent], payload: Option<&ComposePayload>) -> ParsedDocument {
    let mut warnings = Vec::new();

    let header = detect_header(pages);
    if !header.recognized {
        warnings.push(TraceWarning::document(
            WarningKind::UnrecognizedReport,
            "First page does not carry the price research report title",
            TraceSeverity::Info,
        ));
    }

    let lines = raw_lines(pages);
    let built = build_records(&lines);
    if !built.orphan_lines.is_empty() {
        warnings.push(TraceWarning::document(
            WarningKind::OrphanLines,
            format!(
                "{} line(s) outside any quote were skipped",
                built.orphan_lines.len()
            ),
            TraceSeverity::Info,
        ));
    }

    let normalized = normalize_records(&built.records);
    warnings.extend(normalized.warnings);

    let mut dataset = normalized.dataset;
    apply_compose_payload(&mut dataset, payload);

    let stats = compute_stats(&dataset);
    if dataset.is_empty() {
        warn!(lines = lines.len(), "no quote records extracted");
        warnings.push(TraceWarning::document(
            WarningKind::EmptyExtraction,
            "No quote records were extracted from the document",
            TraceSeverity::Critical,
        ));
    } else {
        info!(
            records = stats.total_rows,
            empty_names = stats.empty_name_rows,
            "parsed quote records"
        );
    }

    ParsedDocument {
        header,
        records: built.records,
        dataset,
        stats,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: usize, lines: &[&str]) -> PageContent {
        PageContent {
            page_number: number,
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_pages_end_to_end() {
        let doc = parse_pages(
            &[
                page(1, &["Relatório de pesquisa de preço", "", "Item 2", "N. 51 - Wel Distrib"]),
                page(2, &["uidora Ltda", "Página 2 de 2", "N. 52 - Acme Co"]),
            ],
            None,
        );
        assert!(doc.header.recognized);
        assert_eq!(doc.records.len(), 2);
        assert_eq!(doc.dataset.rows[0].name, "Wel Distrib uidora Ltda");
        assert_eq!(doc.stats.total_rows, 2);
        // The title line has no open record to attach to
        assert!(doc
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::OrphanLines));
    }

    #[test]
    fn test_unmatched_document_is_empty_not_error() {
        let doc = parse_pages(&[page(1, &["Some unrelated letter", "Regards"])], None);
        assert!(doc.records.is_empty());
        assert!(doc.dataset.is_empty());
        assert_eq!(doc.stats.total_rows, 0);
        assert!(doc
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::EmptyExtraction));
        assert!(doc
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnrecognizedReport));
    }

    #[test]
    fn test_no_pages() {
        let doc = parse_pages(&[], None);
        assert!(doc.dataset.is_empty());
    }
}
