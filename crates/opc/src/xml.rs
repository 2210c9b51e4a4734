//! Lossless XML trees for package parts
//!
//! Parses a part into an arena of nodes and serializes it back without
//! reshaping anything it did not touch: qualified names keep their
//! prefixes, whitespace-only text survives, empty elements keep their
//! self-closing form, comments and processing instructions round-trip,
//! and nothing is pretty-printed. Office consumers are sensitive to
//! prefix identity, so names are stored exactly as read (`w:p`, not a
//! resolved namespace pair) and matched by local part where callers
//! don't care about the prefix.
//!
//! Nodes live in an `indextree` arena and are addressed by `NodeId`
//! indices, so references held outside the tree (the flat index) are
//! lookup keys into a vector, never owning pointers.

use crate::error::{PackError, PackResult};
use indextree::{Arena, NodeId};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A single attribute with its raw qualified name and unescaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttr {
    pub name: String,
    pub value: String,
}

impl XmlAttr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Node payload stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlData {
    /// Element with its raw qualified name (prefix included).
    Element {
        name: String,
        attrs: Vec<XmlAttr>,
        /// Parsed from an `<empty/>` event; re-emitted self-closing while
        /// the element stays childless.
        self_closing: bool,
    },
    /// Character data, unescaped.
    Text(String),
    /// CDATA section, raw content.
    CData(String),
    /// XML comment, raw content.
    Comment(String),
    /// Processing instruction, raw content including the target.
    ProcessingInstruction(String),
    /// Document type declaration, raw content.
    DocType(String),
}

impl XmlData {
    pub fn element(name: impl Into<String>) -> Self {
        XmlData::Element {
            name: name.into(),
            attrs: Vec::new(),
            self_closing: false,
        }
    }

    pub fn empty_element(name: impl Into<String>, attrs: Vec<XmlAttr>) -> Self {
        XmlData::Element {
            name: name.into(),
            attrs,
            self_closing: true,
        }
    }

    pub fn element_with_attrs(name: impl Into<String>, attrs: Vec<XmlAttr>) -> Self {
        XmlData::Element {
            name: name.into(),
            attrs,
            self_closing: false,
        }
    }

    /// Raw qualified name, if this node is an element.
    pub fn name(&self) -> Option<&str> {
        match self {
            XmlData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attrs(&self) -> Option<&[XmlAttr]> {
        match self {
            XmlData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlData::Text(s) | XmlData::CData(s) => Some(s),
            _ => None,
        }
    }
}

/// The local part of a qualified name (`w:del` -> `del`).
pub fn local_name(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

/// XML declaration captured from the prolog.
#[derive(Debug, Clone)]
struct Declaration {
    version: String,
    encoding: Option<String>,
    standalone: Option<String>,
}

/// A parsed XML part.
#[derive(Debug, Clone)]
pub struct XmlTree {
    arena: Arena<XmlData>,
    root: NodeId,
    decl: Option<Declaration>,
    /// Non-element content between the declaration and the root element
    /// (usually a single newline), re-emitted verbatim.
    prolog: Vec<XmlData>,
    epilog: Vec<XmlData>,
}

impl XmlTree {
    /// Parse a part's XML text. `part` only labels errors.
    pub fn parse(part: &str, content: &str) -> PackResult<Self> {
        let mut reader = Reader::from_str(content);
        let mut arena: Arena<XmlData> = Arena::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut decl: Option<Declaration> = None;
        let mut prolog: Vec<XmlData> = Vec::new();
        let mut epilog: Vec<XmlData> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| PackError::xml(part, e))?;
            match event {
                Event::Decl(ref d) => {
                    let version = d
                        .version()
                        .map(|v| String::from_utf8_lossy(&v).into_owned())
                        .map_err(|e| PackError::xml(part, e))?;
                    let encoding = match d.encoding() {
                        Some(Ok(v)) => Some(String::from_utf8_lossy(&v).into_owned()),
                        Some(Err(e)) => return Err(PackError::xml(part, e)),
                        None => None,
                    };
                    let standalone = match d.standalone() {
                        Some(Ok(v)) => Some(String::from_utf8_lossy(&v).into_owned()),
                        Some(Err(e)) => return Err(PackError::xml(part, e)),
                        None => None,
                    };
                    decl = Some(Declaration {
                        version,
                        encoding,
                        standalone,
                    });
                }
                Event::Start(ref e) => {
                    let node = arena.new_node(Self::element_data(part, e, false)?);
                    Self::attach(&mut arena, &stack, &mut root, node, part)?;
                    stack.push(node);
                }
                Event::Empty(ref e) => {
                    let node = arena.new_node(Self::element_data(part, e, true)?);
                    Self::attach(&mut arena, &stack, &mut root, node, part)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| PackError::xml(part, err))?
                        .into_owned();
                    match stack.last() {
                        Some(&parent) => {
                            let node = arena.new_node(XmlData::Text(text));
                            parent.append(node, &mut arena);
                        }
                        None if root.is_none() => prolog.push(XmlData::Text(text)),
                        None => epilog.push(XmlData::Text(text)),
                    }
                }
                Event::CData(ref e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if let Some(&parent) = stack.last() {
                        let node = arena.new_node(XmlData::CData(text));
                        parent.append(node, &mut arena);
                    }
                }
                Event::Comment(ref e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    let data = XmlData::Comment(text);
                    match stack.last() {
                        Some(&parent) => {
                            let node = arena.new_node(data);
                            parent.append(node, &mut arena);
                        }
                        None if root.is_none() => prolog.push(data),
                        None => epilog.push(data),
                    }
                }
                Event::PI(ref e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    let data = XmlData::ProcessingInstruction(text);
                    match stack.last() {
                        Some(&parent) => {
                            let node = arena.new_node(data);
                            parent.append(node, &mut arena);
                        }
                        None if root.is_none() => prolog.push(data),
                        None => epilog.push(data),
                    }
                }
                Event::DocType(ref e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    prolog.push(XmlData::DocType(text));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let root = root.ok_or_else(|| {
            PackError::xml(part, "document has no root element")
        })?;

        Ok(Self {
            arena,
            root,
            decl,
            prolog,
            epilog,
        })
    }

    fn element_data(part: &str, e: &BytesStart, self_closing: bool) -> PackResult<XmlData> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| PackError::xml(part, err))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| PackError::xml(part, err))?
                .into_owned();
            attrs.push(XmlAttr::new(key, value));
        }
        Ok(XmlData::Element {
            name,
            attrs,
            self_closing,
        })
    }

    fn attach(
        arena: &mut Arena<XmlData>,
        stack: &[NodeId],
        root: &mut Option<NodeId>,
        node: NodeId,
        part: &str,
    ) -> PackResult<()> {
        match stack.last() {
            Some(&parent) => {
                parent.append(node, arena);
                Ok(())
            }
            None => {
                if root.is_some() {
                    return Err(PackError::xml(part, "multiple root elements"));
                }
                *root = Some(node);
                Ok(())
            }
        }
    }

    /// Serialize back to XML text. No pretty-printing; the declaration and
    /// prolog whitespace are re-emitted as parsed.
    pub fn serialize(&self, part: &str) -> PackResult<String> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.decl {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &decl.version,
                    decl.encoding.as_deref(),
                    decl.standalone.as_deref(),
                )))
                .map_err(|e| PackError::ser(part, e))?;
        }
        for item in &self.prolog {
            self.write_flat(&mut writer, item, part)?;
        }
        self.write_node(&mut writer, self.root, part)?;
        for item in &self.epilog {
            self.write_flat(&mut writer, item, part)?;
        }

        String::from_utf8(writer.into_inner()).map_err(PackError::from)
    }

    fn write_flat(
        &self,
        writer: &mut Writer<Vec<u8>>,
        data: &XmlData,
        part: &str,
    ) -> PackResult<()> {
        let event = match data {
            XmlData::Text(s) => Event::Text(BytesText::new(s)),
            XmlData::CData(s) => Event::CData(BytesCData::new(s)),
            XmlData::Comment(s) => Event::Comment(BytesText::from_escaped(s.as_str())),
            XmlData::ProcessingInstruction(s) => Event::PI(BytesPI::new(s)),
            XmlData::DocType(s) => Event::DocType(BytesText::from_escaped(s.as_str())),
            XmlData::Element { .. } => {
                return Err(PackError::ser(part, "element outside the root"));
            }
        };
        writer
            .write_event(event)
            .map_err(|e| PackError::ser(part, e))
    }

    fn write_node(
        &self,
        writer: &mut Writer<Vec<u8>>,
        id: NodeId,
        part: &str,
    ) -> PackResult<()> {
        match self.arena[id].get() {
            XmlData::Element {
                name,
                attrs,
                self_closing,
            } => {
                let mut start = BytesStart::new(name.as_str());
                for attr in attrs {
                    start.push_attribute((attr.name.as_str(), attr.value.as_str()));
                }
                let children: Vec<NodeId> = id.children(&self.arena).collect();
                if children.is_empty() && *self_closing {
                    writer
                        .write_event(Event::Empty(start))
                        .map_err(|e| PackError::ser(part, e))?;
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|e| PackError::ser(part, e))?;
                    for child in children {
                        self.write_node(writer, child, part)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(|e| PackError::ser(part, e))?;
                }
                Ok(())
            }
            other => self.write_flat(writer, other, part),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &XmlData {
        self.arena[id].get()
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut XmlData {
        self.arena[id].get_mut()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].next_sibling()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].previous_sibling()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].first_child()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Document-order traversal of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.ancestors(&self.arena)
    }

    /// True when `id` is an element whose local name equals `local`.
    pub fn is_element(&self, id: NodeId, local: &str) -> bool {
        self.get(id)
            .name()
            .map(|n| local_name(n) == local)
            .unwrap_or(false)
    }

    /// Attribute lookup by exact qualified name.
    pub fn attr(&self, id: NodeId, qname: &str) -> Option<&str> {
        self.get(id)
            .attrs()?
            .iter()
            .find(|a| a.name == qname)
            .map(|a| a.value.as_str())
    }

    /// Attribute lookup by local name (`id` matches both `w:id` and `id`).
    pub fn attr_local(&self, id: NodeId, local: &str) -> Option<&str> {
        self.get(id)
            .attrs()?
            .iter()
            .find(|a| local_name(&a.name) == local)
            .map(|a| a.value.as_str())
    }

    /// Set or replace an attribute by exact qualified name.
    pub fn set_attr(&mut self, id: NodeId, qname: &str, value: &str) {
        if let XmlData::Element { attrs, .. } = self.get_mut(id) {
            if let Some(attr) = attrs.iter_mut().find(|a| a.name == qname) {
                attr.value = value.to_string();
            } else {
                attrs.push(XmlAttr::new(qname, value));
            }
        }
    }

    /// Concatenated text content of an element's descendants.
    pub fn element_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(s) = self.get(node).as_text() {
                out.push_str(s);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    pub fn new_node(&mut self, data: XmlData) -> NodeId {
        self.arena.new_node(data)
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// Insert `node` as the immediate next sibling of `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        anchor.insert_after(node, &mut self.arena);
    }

    /// Insert `node` as the immediately preceding sibling of `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        anchor.insert_before(node, &mut self.arena);
    }

    /// Detach a subtree from its parent, keeping it alive for re-insertion.
    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    /// Detach and drop a subtree.
    pub fn remove(&mut self, id: NodeId) {
        id.remove_subtree(&mut self.arena);
    }

    /// Replace an element's children with a single text node.
    pub fn set_element_text(&mut self, id: NodeId, text: &str) {
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            child.remove_subtree(&mut self.arena);
        }
        let node = self.arena.new_node(XmlData::Text(text.to_string()));
        id.append(node, &mut self.arena);
    }

    /// Rename an element, keeping its prefix-free or prefixed form.
    pub fn rename(&mut self, id: NodeId, new_qname: &str) {
        if let XmlData::Element { name, .. } = self.get_mut(id) {
            *name = new_qname.to_string();
        }
    }

    /// Deep-copy a subtree; the copy is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.get(id).clone();
        let copy = self.arena.new_node(data);
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            let child_copy = self.deep_clone(child);
            copy.append(child_copy, &mut self.arena);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<w:document xmlns:w="http://example/w"><w:body>"#,
        r#"<w:p><w:pPr><w:jc w:val="both"/></w:pPr>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve"> He said &amp; left</w:t></w:r>"#,
        r#"</w:p></w:body></w:document>"#
    );

    #[test]
    fn round_trip_preserves_bytes() {
        let tree = XmlTree::parse("test", DOC).unwrap();
        assert_eq!(tree.serialize("test").unwrap(), DOC);
    }

    #[test]
    fn prefixes_and_self_closing_survive() {
        let tree = XmlTree::parse("test", DOC).unwrap();
        let out = tree.serialize("test").unwrap();
        assert!(out.contains("<w:b/>"));
        assert!(out.contains(r#"<w:jc w:val="both"/>"#));
        assert!(out.contains(r#"xml:space="preserve""#));
    }

    #[test]
    fn local_name_matching() {
        assert_eq!(local_name("w:p"), "p");
        assert_eq!(local_name("p"), "p");
        assert_eq!(local_name("w:delText"), "delText");
    }

    #[test]
    fn element_text_unescapes() {
        let tree = XmlTree::parse("test", DOC).unwrap();
        let body = tree.children(tree.root()).next().unwrap();
        assert_eq!(tree.element_text(body), " He said & left");
    }

    #[test]
    fn mutation_and_reserialize() {
        let mut tree = XmlTree::parse("test", DOC).unwrap();
        let run = tree
            .descendants(tree.root())
            .find(|&n| tree.is_element(n, "r"))
            .unwrap();
        let marker = tree.new_node(XmlData::empty_element(
            "w:commentRangeStart",
            vec![XmlAttr::new("w:id", "0")],
        ));
        tree.insert_before(run, marker);
        let out = tree.serialize("test").unwrap();
        assert!(out.contains(r#"<w:commentRangeStart w:id="0"/><w:r>"#));
    }

    #[test]
    fn deep_clone_copies_subtree() {
        let mut tree = XmlTree::parse("test", DOC).unwrap();
        let run = tree
            .descendants(tree.root())
            .find(|&n| tree.is_element(n, "r"))
            .unwrap();
        let copy = tree.deep_clone(run);
        assert_eq!(tree.element_text(copy), tree.element_text(run));
        // The copy is detached until inserted.
        assert!(tree.parent(copy).is_none());
    }

    #[test]
    fn comments_and_pis_round_trip() {
        let xml = r#"<?xml version="1.0"?><root><!-- keep me --><?target data?></root>"#;
        let tree = XmlTree::parse("test", xml).unwrap();
        assert_eq!(tree.serialize("test").unwrap(), xml);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(XmlTree::parse("test", "   ").is_err());
    }
}
