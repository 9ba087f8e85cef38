use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CotacaoError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to parse field: {0}")]
    ParseError(String),

    #[error("failed to load policy from {path}: {reason}")]
    PolicyLoad { path: PathBuf, reason: String },

    #[error("invalid policy: {0}")]
    PolicyInvalid(String),

    #[error("failed to load compose payload from {path}: {reason}")]
    PayloadLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
