//! End-to-end tests: build a minimal document archive in memory, run it
//! through open -> apply -> save, and inspect the output package.

use chrono::{TimeZone, Utc};
use redline::{
    accept_all, apply_edits, open_document, save_document, Edit, FlatIndex, SkipReason,
};
use std::io::Write;
use zip::write::SimpleFileOptions;

const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    r#"</w:styles>"#
);

fn build_docx(body: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let mut add = |name: &str, content: &str| {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };
    add(
        "[Content_Types].xml",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
            r#"</Types>"#
        ),
    );
    add(
        "_rels/.rels",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
            r#"</Relationships>"#
        ),
    );
    add(
        "word/_rels/document.xml.rels",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            r#"</Relationships>"#
        ),
    );
    add("word/styles.xml", STYLES_XML);
    add(
        "word/document.xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W_NS}><w:body>{body}</w:body></w:document>"#
        ),
    );
    zip.finish().unwrap().into_inner()
}

fn para(runs: &str) -> String {
    format!("<w:p>{runs}</w:p>")
}

fn run(text: &str) -> String {
    format!("<w:r><w:t>{text}</w:t></w:r>")
}

fn apply(bytes: &[u8], edits: &[Edit]) -> (Vec<u8>, redline::Report) {
    let mut handle = open_document(bytes).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
    let report = apply_edits(&mut handle, edits, "Reviewer", now).unwrap();
    (save_document(handle).unwrap(), report)
}

fn part_text(bytes: &[u8], name: &str) -> Option<String> {
    let pack = opc::WordPackage::open(bytes).unwrap();
    pack.part_bytes(name)
        .map(|b| String::from_utf8(b.to_vec()).unwrap())
}

fn main_xml(bytes: &[u8]) -> String {
    part_text(bytes, "word/document.xml").unwrap()
}

/// Flat text after accepting every tracked change.
fn accepted_text(bytes: &[u8]) -> String {
    let pack = opc::WordPackage::open(bytes).unwrap();
    let mut main = pack.parse_xml("word/document.xml").unwrap();
    accept_all(&mut main);
    FlatIndex::build(&main).unwrap().flat_text().to_string()
}

// ----------------------------------------------------------------------
// Scenarios
// ----------------------------------------------------------------------

#[test]
fn s1_simple_replace() {
    let input = build_docx(&para(&run("The term is 30 days.")));
    let (output, report) = apply(&input, &[Edit::modify("30 days", "sixty (60) days")]);
    assert_eq!(report.applied, 1);
    assert!(report.skipped.is_empty());

    let xml = main_xml(&output);
    assert!(xml.contains(r#"<w:del w:id="1" w:author="Reviewer" w:date="2026-03-14T09:26:53Z">"#));
    assert!(xml.contains("<w:delText>30 days</w:delText>"));
    // The insertion sits immediately before the deletion.
    let ins_at = xml.find("sixty (60) days").unwrap();
    let del_at = xml.find("<w:delText>").unwrap();
    assert!(ins_at < del_at);
    assert_eq!(accepted_text(&output), "The term is sixty (60) days.");
}

#[test]
fn s2_deletion_across_split_runs() {
    let input = build_docx(&para(&format!("{}{}", run("Agree"), run("ment"))));
    let (output, _) = apply(&input, &[Edit::delete("greem")]);

    let xml = main_xml(&output);
    // Three runs survive: "A", the deleted "greem", "ent".
    assert!(xml.contains("<w:t>A</w:t>"));
    assert!(xml.contains("<w:delText>greem</w:delText>"));
    assert!(xml.contains("<w:t>ent</w:t>"));
    assert_eq!(xml.matches("<w:del ").count(), 1);
    assert_eq!(accepted_text(&output), "Aent");
}

#[test]
fn s3_occurrence_selects_the_right_repeat() {
    let input = build_docx(&format!("{}{}", para(&run("0")), para(&run("0"))));
    let (output, _) = apply(&input, &[Edit::modify("0", "1").at_occurrence(1)]);
    assert_eq!(accepted_text(&output), "0\n\n1");
}

#[test]
fn s4_prefix_insertion_inherits_the_next_runs_style() {
    let body = para(r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Important</w:t></w:r>"#);
    let input = build_docx(&body);
    let (output, _) = apply(&input, &[Edit::insert("", "Very ")]);

    let xml = main_xml(&output);
    // The inserted run carries the bold properties of "Important".
    let ins_at = xml.find("<w:ins ").unwrap();
    let ins_end = xml[ins_at..].find("</w:ins>").unwrap() + ins_at;
    let ins_markup = &xml[ins_at..ins_end];
    assert!(ins_markup.contains("<w:b/>"));
    assert!(ins_markup.contains("Very I"));
    assert_eq!(accepted_text(&output), "Very Important");
}

#[test]
fn s5_comment_anchoring_wires_the_package() {
    let input = build_docx(&para(&run("governed by the governing law of the state")));
    let (output, _) = apply(
        &input,
        &[Edit::modify("governing law", "laws of New York").with_comment("Client prefers NY")],
    );

    // Markers pair up around the change.
    let xml = main_xml(&output);
    let start = xml.find(r#"<w:commentRangeStart w:id="0"/>"#).unwrap();
    let end = xml.find(r#"<w:commentRangeEnd w:id="0"/>"#).unwrap();
    let reference = xml.find(r#"<w:commentReference w:id="0"/>"#).unwrap();
    assert!(start < end && end < reference);

    // The comments part holds the record.
    let comments = part_text(&output, "word/comments.xml").unwrap();
    assert!(comments.contains(r#"w:id="0""#));
    assert!(comments.contains(r#"w:author="Reviewer""#));
    assert!(comments.contains(r#"w:initials="R""#));
    assert!(comments.contains("Client prefers NY"));

    // Relationship and content type registered.
    let rels = part_text(&output, "word/_rels/document.xml.rels").unwrap();
    assert!(rels.contains("relationships/comments"));
    assert!(rels.contains(r#"Target="comments.xml""#));
    let types = part_text(&output, "[Content_Types].xml").unwrap();
    assert!(types.contains("/word/comments.xml"));
}

#[test]
fn s6_batch_matches_forward_string_application() {
    let text = "The quick brown fox jumps over the lazy dog.";
    let input = build_docx(&para(&run(text)));
    let (output, report) = apply(
        &input,
        &[
            Edit::modify("quick", "slow"),
            Edit::delete("lazy "),
        ],
    );
    assert_eq!(report.applied, 2);
    let expected = text.replace("quick", "slow").replace("lazy ", "");
    assert_eq!(accepted_text(&output), expected);
}

// ----------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------

#[test]
fn empty_edit_list_preserves_every_part_byte_for_byte() {
    let input = build_docx(&para(&run("untouched")));
    let (output, report) = apply(&input, &[]);
    assert_eq!(report.applied, 0);
    for name in ["[Content_Types].xml", "_rels/.rels", "word/document.xml", "word/styles.xml"] {
        assert_eq!(part_text(&input, name), part_text(&output, name), "{name}");
    }
}

#[test]
fn untouched_parts_survive_an_edit_byte_for_byte() {
    let input = build_docx(&para(&run("The term is 30 days.")));
    let (output, _) = apply(&input, &[Edit::delete("30 ")]);
    assert_eq!(part_text(&output, "word/styles.xml").unwrap(), STYLES_XML);
    assert_eq!(part_text(&input, "_rels/.rels"), part_text(&output, "_rels/.rels"));
    assert_ne!(part_text(&input, "word/document.xml"), part_text(&output, "word/document.xml"));
}

#[test]
fn delete_round_trip_removes_exactly_the_target() {
    let input = build_docx(&format!(
        "{}{}",
        para(&run("first paragraph here")),
        para(&run("second paragraph here"))
    ));
    let (output, _) = apply(&input, &[Edit::delete("paragraph ").at_occurrence(1)]);
    assert_eq!(accepted_text(&output), "first paragraph here\n\nsecond here");
}

#[test]
fn insert_round_trip_adds_exactly_the_text() {
    let input = build_docx(&para(&run("Hello world")));
    let (output, _) = apply(&input, &[Edit::insert("Hello", " brave new")]);
    assert_eq!(accepted_text(&output), "Hello brave new world");
}

#[test]
fn trailing_space_insertion_inherits_the_following_runs_style() {
    let body = para(concat!(
        "<w:r><w:t>plain </w:t></w:r>",
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r>"#
    ));
    let input = build_docx(&body);
    // The inserted text ends with whitespace: it prefixes the next word,
    // so it takes the next run's (bold) properties.
    let (output, _) = apply(&input, &[Edit::insert("plain ", "very ")]);
    let xml = main_xml(&output);
    let ins_at = xml.find("<w:ins ").unwrap();
    let ins_end = xml[ins_at..].find("</w:ins>").unwrap() + ins_at;
    assert!(xml[ins_at..ins_end].contains("<w:b/>"));
    assert_eq!(accepted_text(&output), "plain very bold");
}

#[test]
fn insertion_with_whitespace_edges_is_space_preserved() {
    let input = build_docx(&para(&run("Hello world")));
    let (output, _) = apply(&input, &[Edit::insert("Hello", " dear")]);
    let xml = main_xml(&output);
    assert!(xml.contains(r#"<w:t xml:space="preserve"> dear</w:t>"#));
}

#[test]
fn revision_ids_continue_past_existing_ones_in_input_order() {
    let body = format!(
        "{}{}",
        para(r#"<w:ins w:id="5" w:author="earlier"><w:r><w:t>old change </w:t></w:r></w:ins><w:r><w:t>alpha beta</w:t></w:r>"#),
        para(&run("gamma delta"))
    );
    let input = build_docx(&body);
    // First-listed edit targets the later offset; ids still follow input
    // order, not application order.
    let (output, _) = apply(
        &input,
        &[Edit::delete("delta"), Edit::delete("alpha ")],
    );
    let xml = main_xml(&output);
    let id6 = xml.find(r#"<w:del w:id="6""#).unwrap();
    let id7 = xml.find(r#"<w:del w:id="7""#).unwrap();
    assert!(xml.contains("<w:delText>delta</w:delText>"));
    // id 6 (first-listed, "delta") appears after id 7 ("alpha ") in
    // document order.
    assert!(id7 < id6);
}

#[test]
fn comment_ids_pair_and_count_matches_the_comments_part() {
    let input = build_docx(&format!(
        "{}{}",
        para(&run("clause one stands")),
        para(&run("clause two stands"))
    ));
    let (output, _) = apply(
        &input,
        &[
            Edit::delete("one ").with_comment("drop it"),
            Edit::modify("two", "2").with_comment("digits"),
        ],
    );
    let xml = main_xml(&output);
    for id in ["0", "1"] {
        let start = xml
            .find(&format!(r#"<w:commentRangeStart w:id="{id}"/>"#))
            .unwrap();
        let end = xml
            .find(&format!(r#"<w:commentRangeEnd w:id="{id}"/>"#))
            .unwrap();
        assert!(start < end);
    }
    let comments = part_text(&output, "word/comments.xml").unwrap();
    assert_eq!(comments.matches("<w:comment ").count(), 2);
}

#[test]
fn no_comment_means_no_comments_part_or_relationship() {
    let input = build_docx(&para(&run("plain edit")));
    let (output, _) = apply(&input, &[Edit::delete("plain ")]);
    assert!(part_text(&output, "word/comments.xml").is_none());
    let rels = part_text(&output, "word/_rels/document.xml.rels").unwrap();
    assert!(!rels.contains("relationships/comments"));
}

// ----------------------------------------------------------------------
// Skips and conflicts
// ----------------------------------------------------------------------

#[test]
fn unresolvable_edits_are_skipped_not_fatal() {
    let input = build_docx(&para(&run("some text")));
    let (output, report) = apply(
        &input,
        &[
            Edit::delete("missing target"),
            Edit::delete("text"),
            Edit::delete(""),
        ],
    );
    assert_eq!(report.applied, 1);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].index, 0);
    assert_eq!(report.skipped[0].reason, SkipReason::TargetNotFound);
    assert_eq!(report.skipped[1].index, 2);
    assert_eq!(report.skipped[1].reason, SkipReason::EmptyTarget);
    assert_eq!(accepted_text(&output), "some ");
}

#[test]
fn overlapping_edits_keep_the_earliest_listed() {
    let input = build_docx(&para(&run("shared target words")));
    let (output, report) = apply(
        &input,
        &[
            Edit::modify("target", "goal"),
            Edit::delete("target words"),
        ],
    );
    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);
    assert_eq!(report.skipped[0].reason, SkipReason::OverlapConflict);
    assert_eq!(accepted_text(&output), "shared goal words");
}

#[test]
fn two_edits_in_one_run_apply_back_to_front() {
    let input = build_docx(&para(&run("alpha beta gamma delta")));
    let (output, _) = apply(
        &input,
        &[Edit::delete("beta "), Edit::delete("delta")],
    );
    assert_eq!(accepted_text(&output), "alpha gamma ");
}

#[test]
fn edits_on_separate_text_nodes_of_one_run() {
    let body = para(r#"<w:r><w:t>ab</w:t><w:tab/><w:t>cd</w:t></w:r>"#);
    let input = build_docx(&body);
    let (output, report) = apply(&input, &[Edit::delete("cd"), Edit::delete("ab")]);
    assert_eq!(report.applied, 2);
    assert_eq!(accepted_text(&output), "");
    // The tab marker is not part of either deletion.
    let xml = main_xml(&output);
    let tab = xml.find("<w:tab/>").unwrap();
    for del_start in [xml.find("<w:del ").unwrap(), xml.rfind("<w:del ").unwrap()] {
        let del_end = xml[del_start..].find("</w:del>").unwrap() + del_start;
        assert!(tab < del_start || tab > del_end);
    }
}

#[test]
fn insertion_inside_an_existing_insertion_never_nests() {
    let body = para(concat!(
        r#"<w:ins w:id="3" w:author="earlier" w:date="2026-01-01T00:00:00Z">"#,
        r#"<w:r><w:t>inserted text</w:t></w:r></w:ins>"#
    ));
    let input = build_docx(&body);
    let (output, _) = apply(&input, &[Edit::insert("inserted", "X")]);
    // Position is preserved by splitting the existing wrapper.
    assert_eq!(accepted_text(&output), "insertedX text");
    // No w:ins nested under another w:ins.
    let pack = opc::WordPackage::open(&output).unwrap();
    let main = pack.parse_xml("word/document.xml").unwrap();
    for node in main.descendants(main.root()) {
        if main.is_element(node, "ins") {
            let nested = main
                .ancestors(node)
                .skip(1)
                .any(|a| main.is_element(a, "ins"));
            assert!(!nested);
        }
    }
}

#[test]
fn deleting_previously_inserted_text_nests_del_inside_ins() {
    let body = para(concat!(
        r#"<w:r><w:t>base </w:t></w:r>"#,
        r#"<w:ins w:id="2" w:author="earlier" w:date="2026-01-01T00:00:00Z">"#,
        r#"<w:r><w:t>added</w:t></w:r></w:ins>"#
    ));
    let input = build_docx(&body);
    let (output, _) = apply(&input, &[Edit::delete("added")]);
    let xml = main_xml(&output);
    // The del wrapper lives inside the earlier insertion.
    let ins_at = xml.find(r#"<w:ins w:id="2""#).unwrap();
    let del_at = xml.find("<w:del ").unwrap();
    let ins_end = xml.find("</w:ins>").unwrap();
    assert!(ins_at < del_at && del_at < ins_end);
    assert_eq!(accepted_text(&output), "base ");
}

#[test]
fn report_serializes_for_callers() {
    let input = build_docx(&para(&run("abc")));
    let (_, report) = apply(&input, &[Edit::delete("zzz")]);
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains(r#""reason":"target_not_found""#));
}

#[test]
fn output_survives_a_disk_round_trip() {
    let input = build_docx(&para(&run("The term is 30 days.")));
    let (output, _) = apply(&input, &[Edit::modify("30 days", "sixty (60) days")]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redlined.docx");
    std::fs::write(&path, &output).unwrap();
    let reread = std::fs::read(&path).unwrap();
    assert_eq!(accepted_text(&reread), "The term is sixty (60) days.");
}

// ----------------------------------------------------------------------
// Wire-schema ingestion
// ----------------------------------------------------------------------

#[test]
fn json_batch_drives_the_engine() {
    let input = build_docx(&para(&run("The term is 30 days.")));
    let edits = Edit::batch_from_json(
        r#"[{"operation": "MODIFY", "target": "30 days", "new_text": "ninety (90) days", "comment": "longer cure period"}]"#,
    )
    .unwrap();
    let (output, report) = apply(&input, &edits);
    assert_eq!(report.applied, 1);
    assert_eq!(accepted_text(&output), "The term is ninety (90) days.");
    assert!(part_text(&output, "word/comments.xml").is_some());
}
