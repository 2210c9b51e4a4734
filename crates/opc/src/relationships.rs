//! Relationships (.rels) file parsing and generation
//!
//! Relationship parts connect a source part to its targets. The engine
//! touches exactly one relationship: main document -> comments. Entries
//! keep their file order so that a rewritten part differs from the
//! original only by the appended relationship.

use crate::error::{PackError, PackResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// A single relationship in a .rels file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// An ordered collection of relationships from one .rels part
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
    next_id: u32,
}

impl Relationships {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Parse a .rels part from its XML content
    pub fn parse(content: &str) -> PackResult<Self> {
        let mut result = Self::new();
        let mut reader = Reader::from_str(content);
        let mut max_id = 0u32;

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.name().as_ref() != b"Relationship" {
                        continue;
                    }
                    let mut id = None;
                    let mut rel_type = None;
                    let mut target = None;
                    let mut target_mode = TargetMode::Internal;
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| PackError::xml("rels", err))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|err| PackError::xml("rels", err))?
                            .into_owned();
                        match attr.key.as_ref() {
                            b"Id" => id = Some(value),
                            b"Type" => rel_type = Some(value),
                            b"Target" => target = Some(value),
                            b"TargetMode" => {
                                if value == "External" {
                                    target_mode = TargetMode::External;
                                }
                            }
                            _ => {}
                        }
                    }
                    let id = id.ok_or_else(|| {
                        PackError::InvalidStructure("Relationship missing Id".into())
                    })?;
                    let rel_type = rel_type.ok_or_else(|| {
                        PackError::InvalidStructure("Relationship missing Type".into())
                    })?;
                    let target = target.ok_or_else(|| {
                        PackError::InvalidStructure("Relationship missing Target".into())
                    })?;

                    if let Some(num) = id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()) {
                        max_id = max_id.max(num);
                    }
                    result.entries.push(Relationship {
                        id,
                        rel_type,
                        target,
                        target_mode,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PackError::xml("rels", e)),
                _ => {}
            }
        }

        result.next_id = max_id + 1;
        Ok(result)
    }

    /// Append a relationship and return its allocated ID
    pub fn add(&mut self, rel_type: &str, target: &str, target_mode: TargetMode) -> String {
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode,
        });
        id
    }

    /// First relationship of a given type, if any
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.rel_type == rel_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generate XML content for the .rels part, keeping entry order
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                rel.id, rel.rel_type, rel.target
            ));
            if rel.target_mode == TargetMode::External {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}
