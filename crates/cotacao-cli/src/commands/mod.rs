pub mod aggregate;
pub mod dump;
pub mod parse;
pub mod policies;

use cotacao_core::compose::{load_payload, ComposePayload};
use cotacao_core::error::CotacaoError;
use cotacao_core::extraction::pdftotext::PdftotextExtractor;
use cotacao_core::extraction::{pages_from_text, PageContent, PdfExtractor};
use std::path::Path;
use tracing::debug;

/// Read pages from a PDF, or from text already extracted with
/// `pdftotext -layout` when the file ends in `.txt`.
pub fn load_pages(input_file: &Path) -> Result<Vec<PageContent>, CotacaoError> {
    let is_text = input_file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if is_text {
        debug!(file = %input_file.display(), "reading pre-extracted text");
        let text = std::fs::read_to_string(input_file)?;
        Ok(pages_from_text(&text))
    } else {
        let extractor = PdftotextExtractor::new();
        debug!(file = %input_file.display(), backend = extractor.backend_name(), "extracting PDF");
        let pdf_bytes = std::fs::read(input_file)?;
        extractor.extract_pages(&pdf_bytes)
    }
}

pub fn load_optional_payload(path: Option<&Path>) -> Result<Option<ComposePayload>, CotacaoError> {
    path.map(load_payload).transpose()
}
