//! Revision acceptance
//!
//! Materializes all tracked changes in a tree: insertions are unwrapped
//! in place, deletions are removed together with their content, and
//! comment anchors (range markers and reference runs) are dropped. What
//! remains is the document as it would read with every change accepted.

use opc::{NodeId, XmlTree};

/// Accept every tracked change and strip comment anchors, in place.
pub fn accept_all(tree: &mut XmlTree) {
    let root = tree.root();

    // Deletions first: their subtrees may contain nested markup that
    // would otherwise be visited with stale node ids.
    let deletions: Vec<NodeId> = tree
        .descendants(root)
        .filter(|&n| tree.is_element(n, "del"))
        .filter(|&n| !tree.ancestors(n).skip(1).any(|a| tree.is_element(a, "del")))
        .collect();
    for del in deletions {
        tree.remove(del);
    }

    // Insertions: hoist children into the wrapper's place, innermost
    // first so parents always see final content.
    let insertions: Vec<NodeId> = tree
        .descendants(root)
        .filter(|&n| tree.is_element(n, "ins"))
        .collect();
    for ins in insertions.into_iter().rev() {
        while let Some(child) = tree.first_child(ins) {
            tree.detach(child);
            tree.insert_before(ins, child);
        }
        tree.remove(ins);
    }

    // Comment anchors.
    let markers: Vec<NodeId> = tree
        .descendants(root)
        .filter(|&n| {
            tree.is_element(n, "commentRangeStart") || tree.is_element(n, "commentRangeEnd")
        })
        .collect();
    for marker in markers {
        tree.remove(marker);
    }
    let references: Vec<NodeId> = tree
        .descendants(root)
        .filter(|&n| tree.is_element(n, "commentReference"))
        .collect();
    for reference in references {
        let target = match tree.parent(reference) {
            Some(parent) if tree.is_element(parent, "r") => parent,
            _ => reference,
        };
        tree.remove(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opc::XmlTree;

    const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn doc(body: &str) -> XmlTree {
        let xml = format!(
            r#"<?xml version="1.0"?><w:document {W_NS}><w:body>{body}</w:body></w:document>"#
        );
        XmlTree::parse("word/document.xml", &xml).unwrap()
    }

    fn body_text(tree: &XmlTree) -> String {
        tree.element_text(tree.root())
    }

    #[test]
    fn insertions_are_unwrapped_in_place() {
        let mut tree = doc(concat!(
            r#"<w:p><w:r><w:t>a</w:t></w:r>"#,
            r#"<w:ins w:id="1" w:author="x"><w:r><w:t>b</w:t></w:r></w:ins>"#,
            r#"<w:r><w:t>c</w:t></w:r></w:p>"#
        ));
        accept_all(&mut tree);
        assert_eq!(body_text(&tree), "abc");
        assert!(!tree
            .descendants(tree.root())
            .any(|n| tree.is_element(n, "ins")));
    }

    #[test]
    fn deletions_disappear_with_their_content() {
        let mut tree = doc(concat!(
            r#"<w:p><w:r><w:t>keep</w:t></w:r>"#,
            r#"<w:del w:id="1" w:author="x"><w:r><w:delText>drop</w:delText></w:r></w:del></w:p>"#
        ));
        accept_all(&mut tree);
        assert_eq!(body_text(&tree), "keep");
    }

    #[test]
    fn deletion_inside_insertion_is_dropped_before_unwrapping() {
        let mut tree = doc(concat!(
            r#"<w:p><w:ins w:id="1" w:author="x"><w:r><w:t>a</w:t></w:r>"#,
            r#"<w:del w:id="2" w:author="x"><w:r><w:delText>b</w:delText></w:r></w:del>"#,
            r#"</w:ins></w:p>"#
        ));
        accept_all(&mut tree);
        assert_eq!(body_text(&tree), "a");
    }

    #[test]
    fn comment_anchors_are_stripped() {
        let mut tree = doc(concat!(
            r#"<w:p><w:commentRangeStart w:id="0"/><w:r><w:t>text</w:t></w:r>"#,
            r#"<w:commentRangeEnd w:id="0"/>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:commentReference w:id="0"/></w:r></w:p>"#
        ));
        accept_all(&mut tree);
        assert_eq!(body_text(&tree), "text");
        let para = tree
            .descendants(tree.root())
            .find(|&n| tree.is_element(n, "p"))
            .unwrap();
        assert_eq!(tree.children(para).count(), 1);
    }

    #[test]
    fn accepting_twice_is_a_noop() {
        let mut tree = doc(concat!(
            r#"<w:p><w:ins w:id="1" w:author="x"><w:r><w:t>b</w:t></w:r></w:ins></w:p>"#
        ));
        accept_all(&mut tree);
        let once = tree.serialize("t").unwrap();
        accept_all(&mut tree);
        assert_eq!(tree.serialize("t").unwrap(), once);
    }
}
