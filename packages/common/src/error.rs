use obojobo_document::ParseErrors;
use std::path::PathBuf;
use thiserror::Error;

/// Common error type for loading and storing drafts
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("XML parse error: {0}")]
    Parse(#[from] ParseErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported draft format for {0}: expected .json or .xml")]
    UnsupportedFormat(PathBuf),
}

