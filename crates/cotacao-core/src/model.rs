use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One non-blank line of extracted text, positioned in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub page_number: usize,
    pub line_index: usize,
    pub text: String,
}

/// One reconstructed vendor quotation, as closed by the record builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Id of the most recent group header, empty if none was seen yet.
    pub group_id: String,
    /// Catalog code seen in the group's description block, if any.
    pub catalog_code: Option<String>,
    pub sequence_number: String,
    pub raw_name_text: String,
    /// Page of the record-start line.
    pub page_number: usize,
}

/// Legal basis of a quote, printed as a roman numeral before the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    ComprasGov,
    SimilarContracts,
    SpecializedMedia,
    Supplier,
    ElectronicInvoice,
}

impl SourceKind {
    pub fn from_numeral(s: &str) -> Option<SourceKind> {
        match s.to_ascii_uppercase().as_str() {
            "I" => Some(SourceKind::ComprasGov),
            "II" => Some(SourceKind::SimilarContracts),
            "III" => Some(SourceKind::SpecializedMedia),
            "IV" => Some(SourceKind::Supplier),
            "V" => Some(SourceKind::ElectronicInvoice),
            _ => None,
        }
    }

    pub fn numeral(&self) -> &'static str {
        match self {
            SourceKind::ComprasGov => "I",
            SourceKind::SimilarContracts => "II",
            SourceKind::SpecializedMedia => "III",
            SourceKind::Supplier => "IV",
            SourceKind::ElectronicInvoice => "V",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::ComprasGov => write!(f, "Compras.gov.br"),
            SourceKind::SimilarContracts => write!(f, "Contratações similares"),
            SourceKind::SpecializedMedia => write!(f, "Mídias especializadas"),
            SourceKind::Supplier => write!(f, "Fornecedor"),
            SourceKind::ElectronicInvoice => write!(f, "Nota fiscal eletrônica"),
        }
    }
}

/// A quote record after cleanup and token extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    pub group_id: String,
    pub catalog_item_id: String,
    /// Six-digit catalog code, None when absent or malformed.
    pub catalog_code: Option<String>,
    pub sequence_number: String,
    /// Full cleaned name text, whitespace collapsed.
    pub name: String,
    /// Vendor label with price, date, markup and source tokens removed.
    pub vendor: String,
    pub source: Option<SourceKind>,
    pub quantity: Option<u64>,
    pub value: Option<Decimal>,
    pub quote_date: Option<String>,
    /// Compose marker printed in the document, if any.
    pub markup_compose: Option<bool>,
    pub compose_flag: bool,
    pub page_number: usize,
}

impl NormalizedQuote {
    /// Rebuild the closed record this row was normalized from.
    pub fn to_record(&self) -> QuoteRecord {
        QuoteRecord {
            group_id: self.group_id.clone(),
            catalog_code: self.catalog_code.clone(),
            sequence_number: self.sequence_number.clone(),
            raw_name_text: self.name.clone(),
            page_number: self.page_number,
        }
    }
}

/// Normalized rows of one document. Always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDataset {
    pub rows: Vec<NormalizedQuote>,
}

impl QuoteDataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows selected to compose the reference price.
    pub fn composing(&self) -> impl Iterator<Item = &NormalizedQuote> {
        self.rows.iter().filter(|r| r.compose_flag)
    }
}

/// Extraction-quality numbers for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_rows: usize,
    pub empty_name_rows: usize,
    /// Percentage of rows with an empty name, 2 decimals.
    pub empty_name_pct: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// True when the first page carries the price research report title.
    pub recognized: bool,
    pub title: Option<String>,
}
