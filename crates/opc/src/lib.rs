//! OPC Package Layer
//!
//! This crate opens, mutates, and re-serializes Office Open XML
//! word-processing packages (the `.docx` family, ECMA-376).
//!
//! ## Structure
//!
//! A DOCX file is a ZIP archive containing XML parts:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Document relationships
//! - `word/comments.xml` - Comments content
//!
//! Parts this layer does not parse (styles, numbering, themes, headers,
//! footers, media) are carried through byte-for-byte, so a package that is
//! opened and saved without edits is binary-identical to its input.
//!
//! XML parts are parsed into an arena tree ([`XmlTree`]) whose nodes are
//! addressed by [`NodeId`] indices. The tree keeps namespace prefixes,
//! whitespace, and self-closing element forms exactly as found, which is
//! what lets the rest of the engine perform surgical edits without
//! disturbing markup it never touched.

mod content_types;
mod error;
mod package;
mod relationships;
mod xml;

pub use content_types::ContentTypes;
pub use error::{PackError, PackResult};
pub use package::{WordPackage, COMMENTS_PART, COMMENTS_RELS_TARGET, DOCUMENT_RELS_PART, MAIN_PART};
pub use relationships::{Relationship, Relationships, TargetMode};
pub use xml::{local_name, XmlAttr, XmlData, XmlTree};

/// Node handle into an [`XmlTree`] arena.
pub use indextree::NodeId;

/// XML namespaces used in DOCX files
pub mod namespaces {
    /// Main WordprocessingML namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// Relationships namespace
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Package relationships namespace
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    /// Content types namespace
    pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
    /// The xml: namespace (xml:space et al.)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const COMMENTS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
}

/// Content types for DOCX parts
pub mod content_type_values {
    pub const DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
}
