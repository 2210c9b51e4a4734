//! Redline Engine
//!
//! Applies semantic edits to word-processing documents as native tracked
//! changes: insertion marks (`w:ins`), deletion marks (`w:del`), and
//! optional review comments, while preserving every part of the package
//! the edits do not touch.
//!
//! ## Pipeline
//!
//! - [`open_document`] reads the archive and checks the main part exists.
//! - [`apply_edits`] builds a flat-text index of the body, resolves each
//!   edit's target or anchor to tree positions, splits runs at range
//!   edges, wraps the affected runs in revision markup, and anchors
//!   review comments. Unresolvable edits are skipped and reported; the
//!   rest apply back-to-front so no mutation invalidates a pending
//!   range.
//! - [`save_document`] re-serializes touched parts and copies everything
//!   else byte-for-byte.
//!
//! [`accept_all`] is the inverse lens: it materializes all tracked
//! changes, which is what "strip the markup" means in the round-trip
//! tests.
//!
//! The engine is single-threaded and non-reentrant per document; one job
//! owns one opened archive end-to-end. Timestamps are supplied by the
//! caller, so runs are reproducible.

mod accept;
mod comments;
mod edit;
mod engine;
mod error;
mod mapper;

pub use accept::accept_all;
pub use comments::CommentsManager;
pub use edit::{Edit, EditOp};
pub use engine::{
    apply_edits, open_document, save_document, DocumentHandle, Report, SkipReason, SkippedEdit,
};
pub use error::{RedlineError, RedlineResult};
pub use mapper::{
    find_body, split_run, wml_prefix, FlatIndex, InsertPoint, ResolvedRange, RunEntry, RunSlice,
    SplitOutcome, PARAGRAPH_SEPARATOR,
};
