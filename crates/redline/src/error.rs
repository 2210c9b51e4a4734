//! Error types for redlining operations

use opc::PackError;
use thiserror::Error;

/// Errors that can occur while resolving and applying edits
#[derive(Debug, Error)]
pub enum RedlineError {
    /// Package-level failure (open, parse, serialize)
    #[error(transparent)]
    Pack(#[from] PackError),

    /// The target text was not found often enough in the document
    #[error("target not found: {target:?} (occurrence {occurrence})")]
    TargetNotFound { target: String, occurrence: usize },

    /// The insertion anchor was not found often enough in the document
    #[error("anchor not found: {anchor:?} (occurrence {occurrence})")]
    AnchorNotFound { anchor: String, occurrence: usize },

    /// The target or replacement text was empty where text is required
    #[error("empty target")]
    EmptyTarget,

    /// The resolved range intersects an earlier edit's range, or covers
    /// only a paragraph boundary
    #[error("edit conflicts with an earlier edit or a paragraph boundary")]
    OverlapConflict,

    /// The comments part could not be written
    #[error("comment part write failure: {0}")]
    CommentPartWriteFailure(String),

    /// The main document part has no body element
    #[error("document has no body element")]
    MissingBody,
}

/// Result type for redlining operations
pub type RedlineResult<T> = std::result::Result<T, RedlineError>;
