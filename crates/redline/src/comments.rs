//! Review comments
//!
//! Maintains the comments part and injects anchor markers into the body:
//! a matched `w:commentRangeStart`/`w:commentRangeEnd` pair around the
//! commented content plus a reference run carrying `w:commentReference`.
//! Comment ids are allocated past the maximum id already present in the
//! part, monotonic per job.

use crate::error::{RedlineError, RedlineResult};
use crate::mapper::wml_prefix;
use opc::{NodeId, WordPackage, XmlAttr, XmlData, XmlTree, COMMENTS_PART};
use tracing::debug;

/// Manager for the comments part of one document.
pub struct CommentsManager {
    tree: XmlTree,
    prefix: String,
    next_id: i64,
    touched: bool,
}

impl CommentsManager {
    /// Load (or lazily create) the comments part and scan it for the
    /// highest existing comment id.
    pub fn load(pack: &WordPackage) -> RedlineResult<Self> {
        let tree = pack.comments_xml()?;
        let prefix = wml_prefix(&tree);
        let max_id = tree
            .descendants(tree.root())
            .filter(|&n| tree.is_element(n, "comment"))
            .filter_map(|n| tree.attr_local(n, "id"))
            .filter_map(|v| v.parse::<i64>().ok())
            .max()
            .unwrap_or(-1);
        Ok(Self {
            tree,
            prefix,
            next_id: max_id + 1,
            touched: false,
        })
    }

    /// Anchor a new comment around `[first, last]` (sibling elements in
    /// the body, usually revision wrappers) and append its record to the
    /// comments part. The reference run inherits the properties of
    /// `rpr_source`. Returns the allocated id.
    #[allow(clippy::too_many_arguments)]
    pub fn attach(
        &mut self,
        body: &mut XmlTree,
        first: NodeId,
        last: NodeId,
        rpr_source: Option<NodeId>,
        text: &str,
        author: &str,
        date: &str,
    ) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.touched = true;

        let w = wml_prefix(body);
        let id_attr = |tree: &mut XmlTree, local: &str| {
            tree.new_node(XmlData::empty_element(
                format!("{w}{local}"),
                vec![XmlAttr::new(format!("{w}id"), id.to_string())],
            ))
        };

        let range_start = id_attr(body, "commentRangeStart");
        body.insert_before(first, range_start);
        let range_end = id_attr(body, "commentRangeEnd");
        body.insert_after(last, range_end);

        let reference_run = body.new_node(XmlData::element(format!("{w}r")));
        if let Some(source) = rpr_source {
            let rpr = body
                .children(source)
                .find(|&c| body.is_element(c, "rPr"));
            if let Some(rpr) = rpr {
                let copy = body.deep_clone(rpr);
                body.append(reference_run, copy);
            }
        }
        let reference = id_attr(body, "commentReference");
        body.append(reference_run, reference);
        body.insert_after(range_end, reference_run);

        self.append_record(id, author, date, text);
        debug!(id, author, "attached comment");
        id
    }

    /// Append a `w:comment` element: one paragraph per line of body text,
    /// the first styled as comment text with the annotation reference.
    fn append_record(&mut self, id: i64, author: &str, date: &str, text: &str) {
        let w = self.prefix.clone();
        let comment = self.tree.new_node(XmlData::element_with_attrs(
            format!("{w}comment"),
            vec![
                XmlAttr::new(format!("{w}id"), id.to_string()),
                XmlAttr::new(format!("{w}author"), author),
                XmlAttr::new(format!("{w}initials"), initials_of(author)),
                XmlAttr::new(format!("{w}date"), date),
            ],
        ));

        let lines: Vec<&str> = if text.is_empty() {
            vec![""]
        } else {
            text.lines().collect()
        };
        for (i, line) in lines.iter().enumerate() {
            let para = self.tree.new_node(XmlData::element(format!("{w}p")));
            if i == 0 {
                let ppr = self.tree.new_node(XmlData::element(format!("{w}pPr")));
                let style = self.tree.new_node(XmlData::empty_element(
                    format!("{w}pStyle"),
                    vec![XmlAttr::new(format!("{w}val"), "CommentText")],
                ));
                self.tree.append(ppr, style);
                self.tree.append(para, ppr);

                let ref_run = self.tree.new_node(XmlData::element(format!("{w}r")));
                let rpr = self.tree.new_node(XmlData::element(format!("{w}rPr")));
                let rstyle = self.tree.new_node(XmlData::empty_element(
                    format!("{w}rStyle"),
                    vec![XmlAttr::new(format!("{w}val"), "CommentReference")],
                ));
                self.tree.append(rpr, rstyle);
                self.tree.append(ref_run, rpr);
                let annotation = self
                    .tree
                    .new_node(XmlData::empty_element(format!("{w}annotationRef"), vec![]));
                self.tree.append(ref_run, annotation);
                self.tree.append(para, ref_run);
            }
            if !line.is_empty() {
                let run = self.tree.new_node(XmlData::element(format!("{w}r")));
                let t = self.tree.new_node(XmlData::element(format!("{w}t")));
                let content = self.tree.new_node(XmlData::Text(line.to_string()));
                self.tree.append(t, content);
                crate::mapper::ensure_space_preserved(&mut self.tree, t, line);
                self.tree.append(run, t);
                self.tree.append(para, run);
            }
            self.tree.append(comment, para);
        }
        let root = self.tree.root();
        self.tree.append(root, comment);
    }

    /// True once a comment has been attached this job.
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Write the comments part back and register it in the package's
    /// relationship graph. No-op when nothing was attached, keeping the
    /// relationship-iff-comments invariant.
    pub fn store(self, pack: &mut WordPackage) -> RedlineResult<()> {
        if !self.touched {
            return Ok(());
        }
        pack.store_xml(COMMENTS_PART, &self.tree)
            .map_err(|e| RedlineError::CommentPartWriteFailure(e.to_string()))?;
        pack.ensure_comments_relationship()?;
        Ok(())
    }
}

/// Author initials: the first letter of each word, uppercased.
fn initials_of(author: &str) -> String {
    let initials: String = author
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials
    }
}
