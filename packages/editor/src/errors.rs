//! Error types for the editor

use obojobo_document::ChunkType;
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

/// Failure converting between the Obo tree and the editable tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("No model registered for chunk type {0}")]
    UnregisteredType(ChunkType),

    #[error("Unknown chunk type: {0}")]
    UnknownChunkType(String),

    #[error("{0} node has no id")]
    MissingId(ChunkType),

    #[error("Invalid content for {node_type}: {message}")]
    InvalidContent { node_type: ChunkType, message: String },

    #[error("Unexpected {found} inside {parent}")]
    UnexpectedNode { parent: String, found: String },
}

impl ConvertError {
    pub fn invalid_content(node_type: &ChunkType, message: impl Into<String>) -> Self {
        Self::InvalidContent {
            node_type: node_type.clone(),
            message: message.into(),
        }
    }

    pub fn unexpected(parent: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedNode {
            parent: parent.into(),
            found: found.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Operation error: {0}")]
    Operation(#[from] crate::operations::OperationError),

    #[error("Normalization error: {0}")]
    Normalize(#[from] crate::normalize::NormalizeError),

    #[error("Draft error: {0}")]
    Common(#[from] obojobo_common::CommonError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
