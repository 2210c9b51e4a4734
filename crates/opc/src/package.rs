//! ZIP package handling
//!
//! A [`WordPackage`] is the archive as a mutable, ordered list of parts.
//! Parts are parsed into [`XmlTree`]s on demand and written back with
//! [`WordPackage::store_xml`]; every part that is never stored round-trips
//! byte-for-byte, which keeps embedded assets and untouched XML binary
//! identical across an open/save cycle.

use crate::content_types::ContentTypes;
use crate::error::{PackError, PackResult};
use crate::relationships::{Relationships, TargetMode};
use crate::xml::XmlTree;
use crate::{content_type_values, relationship_types};
use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// The main document part.
pub const MAIN_PART: &str = "word/document.xml";
/// The comments part.
pub const COMMENTS_PART: &str = "word/comments.xml";
/// The main document's relationship part.
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
/// Relationship target for the comments part, relative to `word/`.
pub const COMMENTS_RELS_TARGET: &str = "comments.xml";

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Skeleton for a comments part created on demand.
const EMPTY_COMMENTS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<w:comments xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"</w:comments>"#
);

/// Skeleton for a document rels part created on demand.
const EMPTY_DOCUMENT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"</Relationships>"#
);

#[derive(Debug)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// An opened word-processing package.
#[derive(Debug)]
pub struct WordPackage {
    /// Parts in original archive order; new parts append at the end.
    parts: Vec<Part>,
}

impl WordPackage {
    /// Open a package from raw archive bytes.
    ///
    /// Fails with `MalformedPackage` when the bytes are not a readable ZIP
    /// archive and `MissingPart` when `word/document.xml` is absent.
    pub fn open(bytes: &[u8]) -> PackResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| PackError::MalformedPackage(e.to_string()))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| PackError::MalformedPackage(e.to_string()))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        let pack = Self { parts };
        if !pack.has_part(MAIN_PART) {
            return Err(PackError::MissingPart(MAIN_PART.to_string()));
        }
        debug!(parts = pack.parts.len(), "opened package");
        Ok(pack)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    pub fn part_bytes(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Replace a part's payload, or append the part if it is new.
    pub fn set_part_bytes(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Parse a part into an owned [`XmlTree`].
    pub fn parse_xml(&self, name: &str) -> PackResult<XmlTree> {
        let bytes = self
            .part_bytes(name)
            .ok_or_else(|| PackError::MissingPart(name.to_string()))?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| PackError::xml(name, e))?;
        XmlTree::parse(name, text)
    }

    /// Serialize a tree back into its part, marking it touched.
    pub fn store_xml(&mut self, name: &str, tree: &XmlTree) -> PackResult<()> {
        let xml = tree.serialize(name)?;
        debug!(part = name, bytes = xml.len(), "stored part");
        self.set_part_bytes(name, xml.into_bytes());
        Ok(())
    }

    /// The comments part as a tree, a fresh empty `w:comments` when the
    /// package has none yet. Creating the tree does not add the part; it
    /// appears in the archive once stored. Idempotent.
    pub fn comments_xml(&self) -> PackResult<XmlTree> {
        if self.has_part(COMMENTS_PART) {
            self.parse_xml(COMMENTS_PART)
        } else {
            XmlTree::parse(COMMENTS_PART, EMPTY_COMMENTS_XML)
        }
    }

    /// Register the comments part in the relationship graph: adds the
    /// main-document relationship and the content-type override when they
    /// are absent. Rewrites those registry parts only on actual change.
    pub fn ensure_comments_relationship(&mut self) -> PackResult<()> {
        let rels_text = match self.part_bytes(DOCUMENT_RELS_PART) {
            Some(bytes) => String::from_utf8(bytes.to_vec())?,
            None => EMPTY_DOCUMENT_RELS_XML.to_string(),
        };
        let mut rels = Relationships::parse(&rels_text)?;
        if rels.get_by_type(relationship_types::COMMENTS).is_none() {
            rels.add(
                relationship_types::COMMENTS,
                COMMENTS_RELS_TARGET,
                TargetMode::Internal,
            );
            self.set_part_bytes(DOCUMENT_RELS_PART, rels.to_xml().into_bytes());
        }

        let ct_text = self
            .part_bytes(CONTENT_TYPES_PART)
            .ok_or_else(|| PackError::MissingPart(CONTENT_TYPES_PART.to_string()))?;
        let ct_text = String::from_utf8(ct_text.to_vec())?;
        let mut types = ContentTypes::parse(&ct_text)?;
        if types.override_for(COMMENTS_PART).is_none() {
            types.add_override(COMMENTS_PART, content_type_values::COMMENTS);
            self.set_part_bytes(CONTENT_TYPES_PART, types.to_xml().into_bytes());
        }
        Ok(())
    }

    /// Serialize the package back to archive bytes, preserving part order.
    pub fn save(&self) -> PackResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for part in &self.parts {
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }
        let cursor = zip.finish()?;
        debug!(parts = self.parts.len(), "saved package");
        Ok(cursor.into_inner())
    }
}
