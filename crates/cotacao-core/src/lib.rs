pub mod aggregate;
pub mod compose;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod policy;
pub mod trace;

use aggregate::AggregatedItem;
use compose::ComposePayload;
use error::CotacaoError;
use extraction::{PageContent, PdfExtractor};
use model::{ExtractionStats, QuoteDataset, ReportHeader};
use policy::schema::PolicyDef;
use serde::{Deserialize, Serialize};
use trace::{build_audit_trail, AuditTrail};

pub use parsing::{parse_pages, ParsedDocument};

/// Full outcome for one price research document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    pub header: ReportHeader,
    pub dataset: QuoteDataset,
    pub stats: ExtractionStats,
    pub items: Vec<AggregatedItem>,
    pub audit: AuditTrail,
}

/// Parse already extracted pages and aggregate them under `policy`.
///
/// Never fails: a document without recognizable quotes yields an empty
/// dataset, no items and an `EmptyExtraction` warning in the audit.
pub fn process_pages(
    pages: &[PageContent],
    payload: Option<&ComposePayload>,
    policy: &PolicyDef,
) -> ProcessResult {
    let parsed = parse_pages(pages, payload);
    let aggregated = aggregate::aggregate(&parsed.dataset, policy);

    let mut warnings = parsed.warnings;
    warnings.extend(aggregated.warnings);
    let audit = build_audit_trail(&aggregated.items, policy, warnings);

    ProcessResult {
        header: parsed.header,
        dataset: parsed.dataset,
        stats: parsed.stats,
        items: aggregated.items,
        audit,
    }
}

/// Main API entry point: extract a PDF and compute its reference prices.
pub fn process_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    payload: Option<&ComposePayload>,
    policy: &PolicyDef,
) -> Result<ProcessResult, CotacaoError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(process_pages(&pages, payload, policy))
}
