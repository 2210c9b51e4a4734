//! Wire-level edit records
//!
//! The schema callers hand to the engine: an operation, the target (or
//! insertion anchor) text, the replacement text, an optional review
//! comment, and a 0-based occurrence index to disambiguate repeated
//! matches.

use serde::{Deserialize, Serialize};

/// Kind of edit to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EditOp {
    /// Insert `new_text` immediately after the anchor in `target`
    Insert,
    /// Mark the text in `target` as deleted
    Delete,
    /// Replace the text in `target` with `new_text`
    Modify,
}

/// A single semantic edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub operation: EditOp,
    /// Exact text to change; for INSERT, the anchor text immediately
    /// preceding the insertion point (empty anchors insert at the start
    /// of the document)
    pub target: String,
    /// Replacement or inserted text; absent for DELETE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_text: Option<String>,
    /// Review comment attached to the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 0-based index among literal matches of `target`
    #[serde(default)]
    pub occurrence: usize,
}

impl Edit {
    pub fn insert(anchor: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            operation: EditOp::Insert,
            target: anchor.into(),
            new_text: Some(new_text.into()),
            comment: None,
            occurrence: 0,
        }
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self {
            operation: EditOp::Delete,
            target: target.into(),
            new_text: None,
            comment: None,
            occurrence: 0,
        }
    }

    pub fn modify(target: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            operation: EditOp::Modify,
            target: target.into(),
            new_text: Some(new_text.into()),
            comment: None,
            occurrence: 0,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn at_occurrence(mut self, occurrence: usize) -> Self {
        self.occurrence = occurrence;
        self
    }

    /// Parse a JSON array of edits in the wire schema.
    pub fn batch_from_json(json: &str) -> serde_json::Result<Vec<Edit>> {
        serde_json::from_str(json)
    }
}
