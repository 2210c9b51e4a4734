//! [Content_Types].xml parsing and generation
//!
//! The package-level registry of part content types. Entries keep their
//! file order so a rewritten registry differs from the original only by
//! the appended override.

use crate::error::{PackError, PackResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// The content-type registry of a package
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// Default content types by extension, in file order
    defaults: Vec<(String, String)>,
    /// Override content types by part name (leading slash), in file order
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse [Content_Types].xml from its content
    pub fn parse(content: &str) -> PackResult<Self> {
        let mut result = Self::default();
        let mut reader = Reader::from_str(content);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    let is_default = name.as_ref() == b"Default";
                    let is_override = name.as_ref() == b"Override";
                    if !is_default && !is_override {
                        continue;
                    }
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| PackError::xml("content types", err))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|err| PackError::xml("content types", err))?
                            .into_owned();
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = Some(value),
                            b"ContentType" => content_type = Some(value),
                            _ => {}
                        }
                    }
                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if is_default {
                            result.defaults.push((key, ct));
                        } else {
                            result.overrides.push((key, ct));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PackError::xml("content types", e)),
                _ => {}
            }
        }

        Ok(result)
    }

    /// The override registered for a part, if any
    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        let normalized = Self::normalize(part_name);
        self.overrides
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, ct)| ct.as_str())
    }

    /// The default content type for an extension, if any
    pub fn default_for_extension(&self, ext: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(e, _)| e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    /// Register an override for a part; replaces an existing one in place
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        let normalized = Self::normalize(part_name);
        if let Some(entry) = self.overrides.iter_mut().find(|(name, _)| *name == normalized) {
            entry.1 = content_type.to_string();
        } else {
            self.overrides.push((normalized, content_type.to_string()));
        }
    }

    fn normalize(part_name: &str) -> String {
        if part_name.starts_with('/') {
            part_name.to_string()
        } else {
            format!("/{}", part_name)
        }
    }

    /// Generate XML content for [Content_Types].xml, keeping entry order
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                ext, ct
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                part, ct
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}
