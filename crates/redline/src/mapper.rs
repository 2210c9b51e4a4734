//! Flat-text mapping between the document tree and character offsets
//!
//! Host applications split styled text into runs at arbitrary points, so
//! a semantic edit ("replace `30 days`") has no direct tree address. The
//! mapper projects the body to a flat string, records which run owns
//! which offsets, resolves target text back to per-run slices, and splits
//! runs so a slice becomes a whole run that revision wrappers can take.
//!
//! Offsets are byte offsets into the flat text; they always fall on
//! character boundaries because they originate from whole-substring
//! matches.

use crate::error::{RedlineError, RedlineResult};
use opc::{NodeId, XmlData, XmlTree};

/// Virtual separator contributed between consecutive paragraphs. No run
/// owns these characters.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// One text node's position in the flat text.
#[derive(Debug, Clone, Copy)]
pub struct RunEntry {
    /// The run element owning the text node
    pub run: NodeId,
    /// The text element (`w:t`) itself
    pub text: NodeId,
    /// Absolute offset of the run's first character in the flat text
    pub start: usize,
    /// Text length in bytes
    pub len: usize,
}

/// Part of a resolved range that falls inside one run.
#[derive(Debug, Clone, Copy)]
pub struct RunSlice {
    /// Index of the entry in the flat index
    pub entry: usize,
    pub run: NodeId,
    pub text: NodeId,
    /// Range within the run's text, `0 <= local_start < local_end <= len`
    pub local_start: usize,
    pub local_end: usize,
}

/// A target range resolved to tree positions.
#[derive(Debug, Clone)]
pub struct ResolvedRange {
    pub start: usize,
    pub end: usize,
    /// Slices in document order; virtual paragraph gaps are skipped
    pub slices: Vec<RunSlice>,
}

/// A resolved insertion point: immediately after `local_offset` within
/// the anchor run.
#[derive(Debug, Clone, Copy)]
pub struct InsertPoint {
    pub pos: usize,
    pub run: NodeId,
    pub text: NodeId,
    pub local_offset: usize,
}

/// Result of splitting a run.
#[derive(Debug, Clone, Copy)]
pub enum SplitOutcome {
    /// Boundary offset; the tree is untouched
    Unchanged,
    /// The run was split; the new sibling holds the suffix
    Split {
        suffix_run: NodeId,
        /// Present when the suffix carries text (absent when only
        /// trailing non-text content moved)
        suffix_text: Option<NodeId>,
    },
}

/// The prefix bound to the main WordprocessingML namespace at the root,
/// colon included (`"w:"` in practice, `""` for a default namespace).
/// New elements are created with the document's own prefix so the part
/// stays uniform.
pub fn wml_prefix(tree: &XmlTree) -> String {
    let root = tree.root();
    if let Some(attrs) = tree.get(root).attrs() {
        for attr in attrs {
            if attr.value == opc::namespaces::W {
                if attr.name == "xmlns" {
                    return String::new();
                }
                if let Some(prefix) = attr.name.strip_prefix("xmlns:") {
                    return format!("{prefix}:");
                }
            }
        }
    }
    "w:".to_string()
}

/// The body element of the main document part.
pub fn find_body(tree: &XmlTree) -> RedlineResult<NodeId> {
    tree.children(tree.root())
        .find(|&n| tree.is_element(n, "body"))
        .ok_or(RedlineError::MissingBody)
}

/// Flat-text index over the document body. Built once per job and never
/// reused after a mutation; entries are lookup keys into the arena, not
/// owners.
#[derive(Debug)]
pub struct FlatIndex {
    text: String,
    entries: Vec<RunEntry>,
}

impl FlatIndex {
    /// Walk the body depth-first and record every text node in document
    /// order. Table cells contribute their paragraphs in row-major order
    /// with no cell separator; consecutive paragraphs are separated by
    /// the virtual `"\n\n"`.
    pub fn build(tree: &XmlTree) -> RedlineResult<Self> {
        let body = find_body(tree)?;
        let mut text = String::new();
        let mut entries = Vec::new();

        let paragraphs: Vec<NodeId> = tree
            .descendants(body)
            .filter(|&n| tree.is_element(n, "p"))
            .collect();
        for (i, &para) in paragraphs.iter().enumerate() {
            if i > 0 {
                text.push_str(PARAGRAPH_SEPARATOR);
            }
            for run in runs_of_paragraph(tree, para) {
                let texts: Vec<NodeId> = tree
                    .children(run)
                    .filter(|&c| tree.is_element(c, "t"))
                    .collect();
                for t in texts {
                    let content = tree.element_text(t);
                    if content.is_empty() {
                        continue;
                    }
                    entries.push(RunEntry {
                        run,
                        text: t,
                        start: text.len(),
                        len: content.len(),
                    });
                    text.push_str(&content);
                }
            }
        }

        Ok(Self { text, entries })
    }

    /// The flat projection of the body.
    pub fn flat_text(&self) -> &str {
        &self.text
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    /// Resolve the kth literal occurrence of `target` (case-sensitive,
    /// no pattern matching) to tree positions.
    pub fn resolve(&self, target: &str, occurrence: usize) -> RedlineResult<ResolvedRange> {
        if target.is_empty() {
            return Err(RedlineError::EmptyTarget);
        }
        let (start, _) = self.text.match_indices(target).nth(occurrence).ok_or_else(|| {
            RedlineError::TargetNotFound {
                target: target.to_string(),
                occurrence,
            }
        })?;
        let end = start + target.len();
        Ok(ResolvedRange {
            start,
            end,
            slices: self.slices_for(start, end),
        })
    }

    /// Resolve an insertion anchored after the kth occurrence of
    /// `anchor`. Empty anchors are rewritten by the engine before this
    /// point and are rejected here.
    pub fn resolve_insertion(&self, anchor: &str, occurrence: usize) -> RedlineResult<InsertPoint> {
        let not_found = || RedlineError::AnchorNotFound {
            anchor: anchor.to_string(),
            occurrence,
        };
        if anchor.is_empty() {
            return Err(not_found());
        }
        let (start, _) = self
            .text
            .match_indices(anchor)
            .nth(occurrence)
            .ok_or_else(not_found)?;
        let end = start + anchor.len();
        // The run owning the anchor's final characters; an anchor made
        // entirely of paragraph separators has no owner.
        let last = self.slices_for(start, end).pop().ok_or_else(not_found)?;
        Ok(InsertPoint {
            pos: end,
            run: last.run,
            text: last.text,
            local_offset: last.local_end,
        })
    }

    /// Slices covering `[start, end)`, skipping virtual paragraph gaps.
    pub fn slices_for(&self, start: usize, end: usize) -> Vec<RunSlice> {
        let mut slices = Vec::new();
        let first = self.entries.partition_point(|e| e.start + e.len <= start);
        for (i, entry) in self.entries.iter().enumerate().skip(first) {
            if entry.start >= end {
                break;
            }
            let local_start = start.saturating_sub(entry.start);
            let local_end = end.min(entry.start + entry.len) - entry.start;
            if local_start < local_end {
                slices.push(RunSlice {
                    entry: i,
                    run: entry.run,
                    text: entry.text,
                    local_start,
                    local_end,
                });
            }
        }
        slices
    }
}

fn runs_of_paragraph(tree: &XmlTree, para: NodeId) -> Vec<NodeId> {
    let mut runs = Vec::new();
    collect_runs(tree, para, &mut runs);
    runs
}

fn collect_runs(tree: &XmlTree, node: NodeId, out: &mut Vec<NodeId>) {
    let children: Vec<NodeId> = tree.children(node).collect();
    for child in children {
        if tree.is_element(child, "r") {
            out.push(child);
        } else if tree.is_element(child, "p") {
            // Nested paragraph (text box content); it is indexed on its
            // own turn.
        } else if tree.get(child).name().is_some() {
            collect_runs(tree, child, out);
        }
    }
}

// ----------------------------------------------------------------------
// Run splitting
// ----------------------------------------------------------------------

/// Split a run at a local offset of one of its text nodes.
///
/// Boundary offsets are no-ops on the text, except that an end-of-text
/// split still detaches content children trailing the text node, so a
/// caller can rely on the run ending exactly at the offset. The suffix
/// run is inserted as the immediate next sibling and carries a deep copy
/// of the run properties.
pub fn split_run(tree: &mut XmlTree, run: NodeId, text_el: NodeId, at: usize) -> SplitOutcome {
    let content = tree.element_text(text_el);
    let at = at.min(content.len());

    if at == 0 {
        return SplitOutcome::Unchanged;
    }
    if at == content.len() {
        let trailing: Vec<NodeId> = following_content(tree, text_el);
        if trailing.is_empty() {
            return SplitOutcome::Unchanged;
        }
        let suffix_run = clone_run_shell(tree, run);
        for node in trailing {
            tree.detach(node);
            tree.append(suffix_run, node);
        }
        tree.insert_after(run, suffix_run);
        return SplitOutcome::Split {
            suffix_run,
            suffix_text: None,
        };
    }

    let prefix = content[..at].to_string();
    let suffix = content[at..].to_string();

    let suffix_run = clone_run_shell(tree, run);
    let suffix_text = clone_text_shell(tree, text_el);
    tree.set_element_text(suffix_text, &suffix);
    tree.append(suffix_run, suffix_text);
    for node in following_content(tree, text_el) {
        tree.detach(node);
        tree.append(suffix_run, node);
    }

    tree.set_element_text(text_el, &prefix);
    ensure_space_preserved(tree, text_el, &prefix);
    ensure_space_preserved(tree, suffix_text, &suffix);

    tree.insert_after(run, suffix_run);
    SplitOutcome::Split {
        suffix_run,
        suffix_text: Some(suffix_text),
    }
}

/// Detach content children preceding the text node into their own run,
/// inserted immediately before. No-op when the text node already leads
/// the run's content.
pub fn split_preceding(tree: &mut XmlTree, run: NodeId, text_el: NodeId) -> Option<NodeId> {
    let preceding: Vec<NodeId> = tree
        .children(run)
        .take_while(|&c| c != text_el)
        .filter(|&c| !tree.is_element(c, "rPr"))
        .collect();
    if preceding.is_empty() {
        return None;
    }
    let prefix_run = clone_run_shell(tree, run);
    for node in preceding {
        tree.detach(node);
        tree.append(prefix_run, node);
    }
    tree.insert_before(run, prefix_run);
    Some(prefix_run)
}

/// Split until the slice's range is a whole run; returns the run and
/// text node holding exactly `[local_start, local_end)`.
///
/// The slice's run reference may be stale when an earlier edit's split
/// moved the text node into a sibling run, so the owning run is
/// re-derived from the text node's current parent.
pub fn isolate_slice(tree: &mut XmlTree, slice: &RunSlice) -> (NodeId, NodeId) {
    let run = tree.parent(slice.text).unwrap_or(slice.run);
    let len = tree.element_text(slice.text).len();
    split_run(tree, run, slice.text, slice.local_end.min(len));
    if slice.local_start > 0 {
        if let SplitOutcome::Split {
            suffix_run,
            suffix_text: Some(suffix_text),
        } = split_run(tree, run, slice.text, slice.local_start)
        {
            return (suffix_run, suffix_text);
        }
    }
    split_preceding(tree, run, slice.text);
    (run, slice.text)
}

/// Split so the anchor run ends exactly at the insertion point; returns
/// the run to insert after.
pub fn isolate_insert_anchor(tree: &mut XmlTree, point: &InsertPoint) -> NodeId {
    let run = tree.parent(point.text).unwrap_or(point.run);
    let len = tree.element_text(point.text).len();
    split_run(tree, run, point.text, point.local_offset.min(len));
    run
}

/// A new run element with the original's name, attributes, and a deep
/// copy of its properties. Detached until inserted.
fn clone_run_shell(tree: &mut XmlTree, run: NodeId) -> NodeId {
    let data = match tree.get(run) {
        XmlData::Element { name, attrs, .. } => XmlData::Element {
            name: name.clone(),
            attrs: attrs.clone(),
            self_closing: false,
        },
        other => other.clone(),
    };
    let clone = tree.new_node(data);
    let rpr = tree.children(run).find(|&c| tree.is_element(c, "rPr"));
    if let Some(rpr) = rpr {
        let rpr_copy = tree.deep_clone(rpr);
        tree.append(clone, rpr_copy);
    }
    clone
}

fn clone_text_shell(tree: &mut XmlTree, text_el: NodeId) -> NodeId {
    let data = match tree.get(text_el) {
        XmlData::Element { name, attrs, .. } => XmlData::Element {
            name: name.clone(),
            attrs: attrs.clone(),
            self_closing: false,
        },
        other => other.clone(),
    };
    tree.new_node(data)
}

fn following_content(tree: &XmlTree, text_el: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cursor = tree.next_sibling(text_el);
    while let Some(node) = cursor {
        out.push(node);
        cursor = tree.next_sibling(node);
    }
    out
}

/// Content that begins or ends with whitespace needs
/// `xml:space="preserve"` or consumers collapse it.
pub fn ensure_space_preserved(tree: &mut XmlTree, text_el: NodeId, content: &str) {
    let edge_ws = content.chars().next().is_some_and(char::is_whitespace)
        || content.chars().last().is_some_and(char::is_whitespace);
    if edge_ws {
        tree.set_attr(text_el, "xml:space", "preserve");
    }
}
