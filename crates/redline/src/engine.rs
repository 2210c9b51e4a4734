//! Redline engine orchestration
//!
//! Accepts a batch of semantic edits, resolves each against the flat
//! index, and materializes them as native revision markup. Resolution
//! failures skip the edit and surface in the [`Report`]; failures after
//! the first mutation are fatal and the caller must discard the
//! document.
//!
//! Edits are resolved (and revision ids allocated) in input order, then
//! applied back-to-front by flat offset so that no mutation invalidates
//! a later edit's precomputed range. The flat index is built once per
//! job and never reused after a mutation.

use crate::comments::CommentsManager;
use crate::edit::{Edit, EditOp};
use crate::error::{RedlineError, RedlineResult};
use crate::mapper::{
    ensure_space_preserved, find_body, isolate_insert_anchor, isolate_slice, wml_prefix,
    FlatIndex, InsertPoint, ResolvedRange,
};
use chrono::{DateTime, Utc};
use opc::{local_name, NodeId, WordPackage, XmlAttr, XmlData, XmlTree, MAIN_PART};
use serde::Serialize;
use tracing::{info, warn};

/// An opened document, scoped to one `open -> apply -> save` cycle.
pub struct DocumentHandle {
    pack: WordPackage,
}

impl DocumentHandle {
    /// The underlying package, for callers that need part-level access.
    pub fn package(&self) -> &WordPackage {
        &self.pack
    }
}

/// Open a document archive for editing.
pub fn open_document(bytes: &[u8]) -> RedlineResult<DocumentHandle> {
    Ok(DocumentHandle {
        pack: WordPackage::open(bytes)?,
    })
}

/// Serialize the document back to archive bytes, consuming the handle.
pub fn save_document(handle: DocumentHandle) -> RedlineResult<Vec<u8>> {
    Ok(handle.pack.save()?)
}

/// Why an edit was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TargetNotFound,
    AnchorNotFound,
    EmptyTarget,
    OverlapConflict,
}

/// A skipped edit, with its position in the input batch.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEdit {
    pub index: usize,
    pub reason: SkipReason,
    pub detail: String,
}

/// Outcome of an edit batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Edits that resolved to a document range
    pub resolved: usize,
    /// Edits materialized as revision markup
    pub applied: usize,
    /// Edits dropped, with reasons, in input order
    pub skipped: Vec<SkippedEdit>,
}

enum PlannedOp {
    Delete { range: ResolvedRange },
    Insert { point: InsertPoint, new_text: String },
    Modify { range: ResolvedRange, new_text: String },
}

impl PlannedOp {
    fn bounds(&self) -> (usize, usize) {
        match self {
            PlannedOp::Delete { range } | PlannedOp::Modify { range, .. } => {
                (range.start, range.end)
            }
            PlannedOp::Insert { point, .. } => (point.pos, point.pos),
        }
    }
}

struct Planned {
    input: usize,
    rev_id: i64,
    start: usize,
    end: usize,
    op: PlannedOp,
    comment: Option<String>,
}

/// Apply a batch of edits as tracked changes.
///
/// `author` and `now` feed the `w:author`/`w:date` attributes of every
/// revision wrapper and comment produced by this batch.
pub fn apply_edits(
    handle: &mut DocumentHandle,
    edits: &[Edit],
    author: &str,
    now: DateTime<Utc>,
) -> RedlineResult<Report> {
    let date = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut main = handle.pack.parse_xml(MAIN_PART)?;
    let index = FlatIndex::build(&main)?;
    let mut report = Report::default();
    let mut next_rev_id = max_revision_id(&main) + 1;

    let mut planned: Vec<Planned> = Vec::new();
    for (i, edit) in edits.iter().enumerate() {
        let op = match resolve_edit(&index, edit) {
            Ok(op) => op,
            Err(err) => {
                match skip_reason(&err) {
                    Some(reason) => {
                        warn!(index = i, error = %err, "skipping edit");
                        report.skipped.push(SkippedEdit {
                            index: i,
                            reason,
                            detail: err.to_string(),
                        });
                        continue;
                    }
                    None => return Err(err),
                }
            }
        };
        report.resolved += 1;
        let (start, end) = op.bounds();
        if planned.iter().any(|p| p.start < end && start < p.end) {
            warn!(index = i, start, end, "skipping edit: overlap");
            report.skipped.push(SkippedEdit {
                index: i,
                reason: SkipReason::OverlapConflict,
                detail: "range intersects an earlier-listed edit".to_string(),
            });
            continue;
        }
        planned.push(Planned {
            input: i,
            rev_id: next_rev_id,
            start,
            end,
            op,
            comment: edit.comment.clone(),
        });
        next_rev_id += 1;
    }

    // Back-to-front: strictly descending target positions keep every
    // remaining precomputed range valid. Equal positions fall back to
    // reverse input order so same-point insertions read in input order.
    planned.sort_by(|a, b| {
        b.start
            .cmp(&a.start)
            .then(b.end.cmp(&a.end))
            .then(b.input.cmp(&a.input))
    });

    let mut comments: Option<CommentsManager> = None;
    for plan in &planned {
        let applied = apply_one(&mut main, plan, author, &date)?;
        if let Some(text) = &plan.comment {
            if comments.is_none() {
                comments = Some(CommentsManager::load(&handle.pack)?);
            }
            if let Some(manager) = comments.as_mut() {
                manager.attach(
                    &mut main,
                    applied.first,
                    applied.last,
                    applied.rpr_source,
                    text,
                    author,
                    &date,
                );
            }
        }
        report.applied += 1;
    }

    if let Some(manager) = comments {
        manager.store(&mut handle.pack)?;
    }
    if report.applied > 0 {
        handle.pack.store_xml(MAIN_PART, &main)?;
    }
    info!(
        resolved = report.resolved,
        applied = report.applied,
        skipped = report.skipped.len(),
        "applied edit batch"
    );
    Ok(report)
}

fn skip_reason(err: &RedlineError) -> Option<SkipReason> {
    match err {
        RedlineError::TargetNotFound { .. } => Some(SkipReason::TargetNotFound),
        RedlineError::AnchorNotFound { .. } => Some(SkipReason::AnchorNotFound),
        RedlineError::EmptyTarget => Some(SkipReason::EmptyTarget),
        RedlineError::OverlapConflict => Some(SkipReason::OverlapConflict),
        _ => None,
    }
}

/// Normalize one edit to an absolute flat range.
fn resolve_edit(index: &FlatIndex, edit: &Edit) -> RedlineResult<PlannedOp> {
    match edit.operation {
        EditOp::Insert => {
            let new_text = required_text(edit)?;
            if edit.target.is_empty() {
                // Start-of-document insertion has no preceding anchor;
                // rewrite to a MODIFY of the first character.
                let first = index.entries().first().ok_or_else(|| {
                    RedlineError::AnchorNotFound {
                        anchor: String::new(),
                        occurrence: edit.occurrence,
                    }
                })?;
                let ch = index.flat_text()[first.start..]
                    .chars()
                    .next()
                    .ok_or_else(|| RedlineError::AnchorNotFound {
                        anchor: String::new(),
                        occurrence: edit.occurrence,
                    })?;
                let range = index.resolve(&ch.to_string(), 0)?;
                return Ok(PlannedOp::Modify {
                    range,
                    new_text: format!("{new_text}{ch}"),
                });
            }
            let point = index.resolve_insertion(&edit.target, edit.occurrence)?;
            Ok(PlannedOp::Insert { point, new_text })
        }
        EditOp::Delete => {
            let range = resolve_target(index, edit)?;
            Ok(PlannedOp::Delete { range })
        }
        EditOp::Modify => {
            let new_text = required_text(edit)?;
            let range = resolve_target(index, edit)?;
            Ok(PlannedOp::Modify { range, new_text })
        }
    }
}

fn required_text(edit: &Edit) -> RedlineResult<String> {
    edit.new_text.clone().ok_or(RedlineError::EmptyTarget)
}

fn resolve_target(index: &FlatIndex, edit: &Edit) -> RedlineResult<ResolvedRange> {
    let range = index.resolve(&edit.target, edit.occurrence)?;
    if range.slices.is_empty() {
        // The range covers only the virtual paragraph separator; deleting
        // the paragraph mark itself (merging paragraphs) is unsupported.
        return Err(RedlineError::OverlapConflict);
    }
    Ok(range)
}

/// Nodes a comment can anchor to after an edit is applied.
struct AppliedEdit {
    /// First wrapper element of the edit, in document order
    first: NodeId,
    /// Last wrapper element of the edit
    last: NodeId,
    /// Run whose properties the comment reference run inherits
    rpr_source: Option<NodeId>,
}

struct DeleteOutcome {
    first_wrapper: NodeId,
    last_wrapper: NodeId,
    first_run: NodeId,
    last_run: NodeId,
}

fn apply_one(main: &mut XmlTree, plan: &Planned, author: &str, date: &str) -> RedlineResult<AppliedEdit> {
    let w = wml_prefix(main);
    match &plan.op {
        PlannedOp::Delete { range } => {
            let del = apply_delete(main, &w, range, plan.rev_id, author, date)
                .ok_or(RedlineError::OverlapConflict)?;
            Ok(AppliedEdit {
                first: del.first_wrapper,
                last: del.last_wrapper,
                rpr_source: Some(del.last_run),
            })
        }
        PlannedOp::Insert { point, new_text } => {
            let anchor_run = isolate_insert_anchor(main, point);
            let rpr_source = if ends_with_whitespace(new_text) {
                next_run_after(main, anchor_run).or(Some(anchor_run))
            } else {
                Some(anchor_run)
            };
            let run = build_text_run(main, &w, rpr_source, new_text);
            let wrapper = revision_wrapper(main, &w, "ins", plan.rev_id, author, date);
            main.append(wrapper, run);
            let place_after = hoist_outside_same_kind(main, anchor_run, "ins");
            if place_after != anchor_run {
                split_wrapper_after(main, place_after, anchor_run);
            }
            main.insert_after(place_after, wrapper);
            Ok(AppliedEdit {
                first: wrapper,
                last: wrapper,
                rpr_source: Some(run),
            })
        }
        PlannedOp::Modify { range, new_text } => {
            let del = apply_delete(main, &w, range, plan.rev_id, author, date)
                .ok_or(RedlineError::OverlapConflict)?;
            // The replacement inherits the first deleted run's properties;
            // trailing whitespace prefers the run following the deletion.
            let rpr_source = if ends_with_whitespace(new_text) {
                next_run_after(main, del.last_run).or(Some(del.first_run))
            } else {
                Some(del.first_run)
            };
            let run = build_text_run(main, &w, rpr_source, new_text);
            let wrapper = revision_wrapper(main, &w, "ins", plan.rev_id, author, date);
            main.append(wrapper, run);
            let outer = hoist_outside_same_kind(main, del.first_wrapper, "ins");
            let place_before = if outer != del.first_wrapper {
                split_wrapper_before(main, outer, del.first_wrapper)
            } else {
                del.first_wrapper
            };
            main.insert_before(place_before, wrapper);
            Ok(AppliedEdit {
                first: wrapper,
                last: del.last_wrapper,
                rpr_source: Some(del.last_run),
            })
        }
    }
}

/// Split edge runs so every slice is a whole run, then wrap the runs in
/// `w:del` elements and retag their text as deletion text. Runs left
/// adjacent by the splits share one wrapper, and runs with identical
/// properties coalesce into a single deletion run; everything of one
/// edit shares the edit's revision id.
fn apply_delete(
    main: &mut XmlTree,
    w: &str,
    range: &ResolvedRange,
    rev_id: i64,
    author: &str,
    date: &str,
) -> Option<DeleteOutcome> {
    let mut outcome: Option<DeleteOutcome> = None;
    let mut open_wrapper: Option<NodeId> = None;
    for slice in &range.slices {
        let (run, _text) = isolate_slice(main, slice);
        retag_deleted_text(main, run);
        let wrapper = match open_wrapper {
            // The previous wrapper sits immediately before this run when
            // the deleted region continues without interruption.
            Some(prev) if main.prev_sibling(run) == Some(prev) => {
                main.detach(run);
                main.append(prev, run);
                prev
            }
            _ => {
                let wrapper = revision_wrapper(main, w, "del", rev_id, author, date);
                main.insert_after(run, wrapper);
                main.detach(run);
                main.append(wrapper, run);
                open_wrapper = Some(wrapper);
                wrapper
            }
        };
        let run = merge_into_previous_run(main, run);
        match &mut outcome {
            None => {
                outcome = Some(DeleteOutcome {
                    first_wrapper: wrapper,
                    last_wrapper: wrapper,
                    first_run: run,
                    last_run: run,
                })
            }
            Some(o) => {
                o.last_wrapper = wrapper;
                o.last_run = run;
            }
        }
    }
    outcome
}

/// Fold a deletion run into its preceding sibling when both carry the
/// same properties, concatenating their deletion text. Returns the
/// surviving run.
fn merge_into_previous_run(main: &mut XmlTree, run: NodeId) -> NodeId {
    let Some(prev) = main.prev_sibling(run) else {
        return run;
    };
    if !runs_mergeable(main, prev, run) {
        return run;
    }
    let tail = main.element_text(run);
    let Some(prev_text) = main
        .children(prev)
        .filter(|&c| main.is_element(c, "delText"))
        .last()
    else {
        return run;
    };
    let combined = format!("{}{}", main.element_text(prev_text), tail);
    main.set_element_text(prev_text, &combined);
    ensure_space_preserved(main, prev_text, &combined);
    main.remove(run);
    prev
}

/// Two deletion runs merge when both hold only properties and deletion
/// text, with structurally identical properties.
fn runs_mergeable(main: &XmlTree, a: NodeId, b: NodeId) -> bool {
    if !main.is_element(a, "r") || !main.is_element(b, "r") {
        return false;
    }
    for run in [a, b] {
        if main
            .children(run)
            .any(|c| !main.is_element(c, "rPr") && !main.is_element(c, "delText"))
        {
            return false;
        }
    }
    let rpr_a = main.children(a).find(|&c| main.is_element(c, "rPr"));
    let rpr_b = main.children(b).find(|&c| main.is_element(c, "rPr"));
    match (rpr_a, rpr_b) {
        (None, None) => true,
        (Some(x), Some(y)) => subtree_equal(main, x, y),
        _ => false,
    }
}

fn subtree_equal(main: &XmlTree, a: NodeId, b: NodeId) -> bool {
    if main.get(a) != main.get(b) {
        return false;
    }
    let children_a: Vec<NodeId> = main.children(a).collect();
    let children_b: Vec<NodeId> = main.children(b).collect();
    children_a.len() == children_b.len()
        && children_a
            .iter()
            .zip(&children_b)
            .all(|(&x, &y)| subtree_equal(main, x, y))
}

/// `w:t` children become `w:delText`: same content, distinct element, so
/// consumers never render the characters as live text.
fn retag_deleted_text(main: &mut XmlTree, run: NodeId) {
    let texts: Vec<NodeId> = main
        .children(run)
        .filter(|&c| main.is_element(c, "t"))
        .collect();
    for t in texts {
        let qname = main.get(t).name().map(str::to_string);
        let new_name = match qname.as_deref().and_then(|n| n.rsplit_once(':')) {
            Some((prefix, _)) => format!("{prefix}:delText"),
            None => "delText".to_string(),
        };
        main.rename(t, &new_name);
    }
}

fn revision_wrapper(
    main: &mut XmlTree,
    w: &str,
    kind: &str,
    id: i64,
    author: &str,
    date: &str,
) -> NodeId {
    main.new_node(XmlData::element_with_attrs(
        format!("{w}{kind}"),
        vec![
            XmlAttr::new(format!("{w}id"), id.to_string()),
            XmlAttr::new(format!("{w}author"), author),
            XmlAttr::new(format!("{w}date"), date),
        ],
    ))
}

fn build_text_run(
    main: &mut XmlTree,
    w: &str,
    rpr_source: Option<NodeId>,
    text: &str,
) -> NodeId {
    let run = main.new_node(XmlData::element(format!("{w}r")));
    if let Some(source) = rpr_source {
        let rpr = main.children(source).find(|&c| main.is_element(c, "rPr"));
        if let Some(rpr) = rpr {
            let copy = main.deep_clone(rpr);
            main.append(run, copy);
        }
    }
    let t = main.new_node(XmlData::element(format!("{w}t")));
    let content = main.new_node(XmlData::Text(text.to_string()));
    main.append(t, content);
    ensure_space_preserved(main, t, text);
    main.append(run, t);
    run
}

fn ends_with_whitespace(text: &str) -> bool {
    text.chars().last().is_some_and(char::is_whitespace)
}

/// The next run in document order after `node`, if any.
fn next_run_after(main: &XmlTree, node: NodeId) -> Option<NodeId> {
    let body = find_body(main).ok()?;
    let runs: Vec<NodeId> = main
        .descendants(body)
        .filter(|&n| main.is_element(n, "r"))
        .collect();
    let pos = runs.iter().position(|&r| r == node)?;
    runs.get(pos + 1).copied()
}

/// Split an existing wrapper so everything after `inner`'s branch moves
/// into a continuation wrapper with the same attributes, leaving the
/// boundary between the halves free for sibling insertion.
fn split_wrapper_after(main: &mut XmlTree, wrapper: NodeId, inner: NodeId) {
    let Some(direct) = direct_child_on_path(main, wrapper, inner) else {
        return;
    };
    let moving: Vec<NodeId> = {
        let mut nodes = Vec::new();
        let mut cursor = main.next_sibling(direct);
        while let Some(node) = cursor {
            nodes.push(node);
            cursor = main.next_sibling(node);
        }
        nodes
    };
    if moving.is_empty() {
        return;
    }
    let continuation = clone_element_shell(main, wrapper);
    main.insert_after(wrapper, continuation);
    for node in moving {
        main.detach(node);
        main.append(continuation, node);
    }
}

/// Split an existing wrapper so `inner`'s branch and everything after it
/// move into a continuation wrapper; returns the node to insert before
/// (the continuation, or the untouched wrapper when `inner` leads it).
fn split_wrapper_before(main: &mut XmlTree, wrapper: NodeId, inner: NodeId) -> NodeId {
    let Some(direct) = direct_child_on_path(main, wrapper, inner) else {
        return wrapper;
    };
    if main.prev_sibling(direct).is_none() {
        return wrapper;
    }
    let moving: Vec<NodeId> = {
        let mut nodes = vec![direct];
        let mut cursor = main.next_sibling(direct);
        while let Some(node) = cursor {
            nodes.push(node);
            cursor = main.next_sibling(node);
        }
        nodes
    };
    let continuation = clone_element_shell(main, wrapper);
    main.insert_after(wrapper, continuation);
    for node in moving {
        main.detach(node);
        main.append(continuation, node);
    }
    continuation
}

/// The ancestor of `inner` (or `inner` itself) that is a direct child of
/// `wrapper`.
fn direct_child_on_path(main: &XmlTree, wrapper: NodeId, inner: NodeId) -> Option<NodeId> {
    main.ancestors(inner)
        .find(|&a| main.parent(a) == Some(wrapper))
}

fn clone_element_shell(main: &mut XmlTree, node: NodeId) -> NodeId {
    let data = match main.get(node) {
        XmlData::Element { name, attrs, .. } => XmlData::Element {
            name: name.clone(),
            attrs: attrs.clone(),
            self_closing: false,
        },
        other => other.clone(),
    };
    main.new_node(data)
}

/// Revision wrappers of one kind never nest: placing a wrapper next to a
/// node that already sits under a same-kind wrapper hops outside the
/// outermost such wrapper.
fn hoist_outside_same_kind(main: &XmlTree, node: NodeId, kind: &str) -> NodeId {
    let mut result = node;
    for ancestor in main.ancestors(node).skip(1) {
        if main.is_element(ancestor, kind) {
            result = ancestor;
        }
        if main.is_element(ancestor, "body") {
            break;
        }
    }
    result
}

const REVISION_TAGS: &[&str] = &[
    "ins",
    "del",
    "moveFrom",
    "moveTo",
    "rPrChange",
    "pPrChange",
    "sectPrChange",
    "tblPrChange",
    "trPrChange",
    "tcPrChange",
    "cellIns",
    "cellDel",
    "cellMerge",
    "numberingChange",
];

/// Highest revision id already present in the main part; the per-job
/// counter starts right above it.
fn max_revision_id(main: &XmlTree) -> i64 {
    let mut max = 0;
    for node in main.descendants(main.root()) {
        let Some(name) = main.get(node).name() else {
            continue;
        };
        if !REVISION_TAGS.contains(&local_name(name)) {
            continue;
        }
        if let Some(id) = main
            .attr_local(node, "id")
            .and_then(|v| v.parse::<i64>().ok())
        {
            max = max.max(id);
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn doc(body: &str) -> XmlTree {
        let xml = format!(
            r#"<?xml version="1.0"?><w:document {W_NS}><w:body>{body}</w:body></w:document>"#
        );
        XmlTree::parse("word/document.xml", &xml).unwrap()
    }

    #[test]
    fn max_revision_id_scans_revision_tags_only() {
        let tree = doc(concat!(
            r#"<w:p><w:ins w:id="7" w:author="a"><w:r><w:t>x</w:t></w:r></w:ins>"#,
            r#"<w:commentRangeStart w:id="99"/>"#,
            r#"<w:r><w:t>y</w:t></w:r><w:commentRangeEnd w:id="99"/></w:p>"#
        ));
        assert_eq!(max_revision_id(&tree), 7);
    }

    #[test]
    fn max_revision_id_defaults_to_zero() {
        let tree = doc(r#"<w:p><w:r><w:t>x</w:t></w:r></w:p>"#);
        assert_eq!(max_revision_id(&tree), 0);
    }

    #[test]
    fn hoist_leaves_unwrapped_runs_alone() {
        let tree = doc(r#"<w:p><w:r><w:t>x</w:t></w:r></w:p>"#);
        let run = tree
            .descendants(tree.root())
            .find(|&n| tree.is_element(n, "r"))
            .unwrap();
        assert_eq!(hoist_outside_same_kind(&tree, run, "ins"), run);
    }

    #[test]
    fn hoist_escapes_existing_insertions() {
        let tree = doc(
            r#"<w:p><w:ins w:id="1" w:author="a"><w:r><w:t>x</w:t></w:r></w:ins></w:p>"#,
        );
        let run = tree
            .descendants(tree.root())
            .find(|&n| tree.is_element(n, "r"))
            .unwrap();
        let hoisted = hoist_outside_same_kind(&tree, run, "ins");
        assert!(tree.is_element(hoisted, "ins"));
        assert_eq!(hoist_outside_same_kind(&tree, run, "del"), run);
    }

    #[test]
    fn empty_anchor_insert_becomes_modify_of_first_char() {
        let tree = doc(r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Important</w:t></w:r></w:p>"#);
        let index = FlatIndex::build(&tree).unwrap();
        let op = resolve_edit(&index, &Edit::insert("", "Very ")).unwrap();
        match op {
            PlannedOp::Modify { range, new_text } => {
                assert_eq!((range.start, range.end), (0, 1));
                assert_eq!(new_text, "Very I");
            }
            _ => panic!("expected a MODIFY rewrite"),
        }
    }

    #[test]
    fn empty_anchor_in_empty_document_is_anchor_not_found() {
        let tree = doc(r#"<w:p></w:p>"#);
        let index = FlatIndex::build(&tree).unwrap();
        assert!(matches!(
            resolve_edit(&index, &Edit::insert("", "x")),
            Err(RedlineError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn modify_without_new_text_is_rejected() {
        let tree = doc(r#"<w:p><w:r><w:t>x</w:t></w:r></w:p>"#);
        let index = FlatIndex::build(&tree).unwrap();
        let edit = Edit {
            operation: EditOp::Modify,
            target: "x".to_string(),
            new_text: None,
            comment: None,
            occurrence: 0,
        };
        assert!(matches!(
            resolve_edit(&index, &edit),
            Err(RedlineError::EmptyTarget)
        ));
    }

    #[test]
    fn gap_only_delete_is_a_conflict() {
        let tree = doc(r#"<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p><w:r><w:t>b</w:t></w:r></w:p>"#);
        let index = FlatIndex::build(&tree).unwrap();
        assert!(matches!(
            resolve_edit(&index, &Edit::delete("\n\n")),
            Err(RedlineError::OverlapConflict)
        ));
    }
}
