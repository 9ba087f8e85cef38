pub mod pdftotext;

use crate::error::CotacaoError;
use crate::model::RawLine;

/// Text extracted from a single page, visual line breaks preserved.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, CotacaoError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Split already-extracted text into pages on form feeds.
pub fn pages_from_text(text: &str) -> Vec<PageContent> {
    text.split('\x0c')
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            lines: page_text.lines().map(|l| l.to_string()).collect(),
        })
        .filter(|p| !p.lines.is_empty() || p.page_number == 1)
        .collect()
}

/// Flatten pages into trimmed, non-blank lines in document order.
pub fn raw_lines(pages: &[PageContent]) -> Vec<RawLine> {
    pages
        .iter()
        .flat_map(|page| {
            page.lines
                .iter()
                .enumerate()
                .filter_map(move |(line_index, line)| {
                    let text = line.replace('\u{a0}', " ");
                    let text = text.trim();
                    if text.is_empty() {
                        None
                    } else {
                        Some(RawLine {
                            page_number: page.page_number,
                            line_index,
                            text: text.to_string(),
                        })
                    }
                })
        })
        .collect()
}

/// Numbered listing of the first pages, for inspecting documents that
/// produce no rows.
pub fn debug_dump(pages: &[PageContent], max_pages: usize, max_lines: usize) -> String {
    let rule = "=".repeat(70);
    let mut out = Vec::new();

    for page in pages.iter().take(max_pages) {
        out.push(rule.clone());
        out.push(format!("PAGE {}", page.page_number));
        out.push(rule.clone());
        out.push(format!("Total lines: {}", page.lines.len()));
        for (i, line) in page.lines.iter().take(max_lines).enumerate() {
            out.push(format!("{:03} | {}", i, line));
        }
        out.push(String::new());
    }

    out.join("\n")
}
