use crate::extraction::PageContent;
use crate::model::ReportHeader;

const TITLE_MARKERS: &[&str] = &[
    "relatório de pesquisa de preço",
    "relatorio de pesquisa de preco",
];

/// Look for the price research report title on the first page.
pub fn detect_header(pages: &[PageContent]) -> ReportHeader {
    let mut header = ReportHeader::default();

    let Some(first) = pages.first() else {
        return header;
    };

    for line in &first.lines {
        let line = line.trim();
        let lower = line.to_lowercase();
        if TITLE_MARKERS.iter().any(|m| lower.contains(m)) {
            header.recognized = true;
            header.title = Some(line.to_string());
            break;
        }
    }

    header
}
