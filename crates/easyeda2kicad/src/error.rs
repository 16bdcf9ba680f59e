use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("sheet {requested} requested, but the document has {available} sheet(s)")]
    SheetOutOfRange { requested: usize, available: usize },

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
