//! End-to-end checks of the standard transform pipeline: a document goes
//! out for editing, gets mutated the way a user would mutate it, and comes
//! back intact.

use markup::serialize;
use massage::{EditContext, EditorSettings, Pipeline};

fn settings() -> EditorSettings {
    EditorSettings {
        base_uri: "https://edit.example.edu/loki/".to_string(),
        page_url: "https://edit.example.edu/pages/about".to_string(),
        sanitize_unsecured: true,
    }
}

fn context(html: &str) -> EditContext {
    EditContext::from_html(html, settings()).expect("fixture parses")
}

/// Every construct at once, authored in the shape the transforms preserve
/// exactly (table already sectioned, cells without trailing breaks).
const KITCHEN_SINK: &str = "<h2>Report</h2>\
<p><strong>bold</strong> and <em>italic</em> text</p>\
<p><a name=\"summary\"></a>Summary paragraph.</p>\
<ul><li>one<ul><li>nested</li></ul></li><li>two</li></ul>\
<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>\
<p><object data=\"movie.swf\"><param name=\"loop\" value=\"true\" />alt</object></p>\
<p><img title=\"t\" alt=\"logo\" src=\"http://cdn.example.net/logo.png\" /></p>";

#[test]
fn unmassage_undoes_massage_on_a_full_document() {
    let mut cx = context(KITCHEN_SINK);
    let pipeline = Pipeline::standard();
    pipeline.massage_body(&mut cx);
    pipeline.unmassage_body(&mut cx);
    assert_eq!(serialize(&cx.doc, cx.body), KITCHEN_SINK);
}

#[test]
fn massage_is_idempotent_across_the_whole_pipeline() {
    let mut cx = context(KITCHEN_SINK);
    let pipeline = Pipeline::standard();
    pipeline.massage_body(&mut cx);
    let once = serialize(&cx.doc, cx.body);
    pipeline.massage_body(&mut cx);
    assert_eq!(
        serialize(&cx.doc, cx.body),
        once,
        "a second massage pass must change nothing"
    );
}

#[test]
fn massaged_document_contains_no_raw_constructs() {
    let mut cx = context(KITCHEN_SINK);
    Pipeline::standard().massage_body(&mut cx);
    let body = cx.body;
    assert!(cx.doc.elements_by_tag_name(body, "OBJECT").is_empty());
    assert!(cx.doc.elements_by_tag_name(body, "STRONG").is_empty());
    assert!(cx.doc.elements_by_tag_name(body, "EM").is_empty());
    for img in cx.doc.elements_by_tag_name(body, "IMG") {
        let src = cx.doc.attribute(img, "src").unwrap_or("");
        assert!(
            !src.to_ascii_lowercase().starts_with("http:"),
            "no image may load insecurely while editing, got src: {src}"
        );
    }
}

#[test]
fn placeholders_are_recognized_and_content_is_not() {
    let mut cx = context(KITCHEN_SINK);
    let pipeline = Pipeline::standard();
    pipeline.massage_body(&mut cx);

    let body = cx.body;
    for img in cx.doc.elements_by_tag_name(body, "IMG") {
        assert!(
            pipeline.is_placeholder(&cx, img),
            "every image in the massaged fixture is synthetic"
        );
    }
    for bold in cx.doc.elements_by_tag_name(body, "B") {
        assert!(pipeline.is_placeholder(&cx, bold));
    }
    for table in cx.doc.elements_by_tag_name(body, "TABLE") {
        assert!(
            !pipeline.is_placeholder(&cx, table),
            "tables are user content even while massaged"
        );
    }
    for list in cx.doc.elements_by_tag_name(body, "UL") {
        assert!(!pipeline.is_placeholder(&cx, list));
    }
}

#[test]
fn anchor_keeps_its_identity_when_its_marker_moves() {
    let mut cx = context(
        "<p id=\"here\"><a name=\"target\"></a>first</p><p id=\"there\">second</p>",
    );
    let pipeline = Pipeline::standard();
    pipeline.massage_body(&mut cx);

    let body = cx.body;
    let marker = cx
        .doc
        .elements_by_tag_name(body, "IMG")
        .into_iter()
        .find(|&img| cx.doc.has_attribute(img, "loki:anchor_id"))
        .expect("anchor marker present");
    let there = cx.doc.element_by_id(body, "there").expect("target exists");
    cx.doc.append_child(there, marker);

    pipeline.unmassage_body(&mut cx);
    assert_eq!(
        serialize(&cx.doc, body),
        "<p id=\"here\">first</p><p id=\"there\">second<a name=\"target\"></a></p>"
    );
}

#[test]
fn media_survives_a_move_byte_for_byte() {
    let mut cx = context(
        "<p id=\"a\"><video controls src=\"clip.webm\">fallback</video></p><p id=\"b\"></p>",
    );
    let pipeline = Pipeline::standard();
    pipeline.massage_body(&mut cx);

    let body = cx.body;
    let placeholder = cx
        .doc
        .elements_by_tag_name(body, "IMG")
        .into_iter()
        .find(|&img| cx.doc.has_class(img, "loki__media_placeholder"))
        .expect("media placeholder present");
    let dest = cx.doc.element_by_id(body, "b").expect("dest exists");
    cx.doc.append_child(dest, placeholder);

    pipeline.unmassage_body(&mut cx);
    assert_eq!(
        serialize(&cx.doc, body),
        "<p id=\"a\"></p><p id=\"b\"><video controls=\"controls\" src=\"clip.webm\">fallback</video></p>"
    );
}

#[test]
fn tables_come_back_sectioned_even_when_authored_loose() {
    let mut cx = context("<table><tr><th>Col</th></tr><tr><td>val</td></tr></table>");
    let pipeline = Pipeline::standard();
    pipeline.massage_body(&mut cx);
    pipeline.unmassage_body(&mut cx);
    assert_eq!(
        serialize(&cx.doc, cx.body),
        "<table><thead><tr><th>Col</th></tr></thead><tbody><tr><td>val</td></tr></tbody></table>",
        "sectioning normalization is deliberately one-way"
    );
}

#[test]
fn pasted_placeholder_from_another_session_survives_save() {
    let html = "<p>before <img id=\"_loki_zzyzx\" class=\"loki__media_placeholder\" \
src=\"gone.gif\" loki:fake=\"true\" /> after</p>";
    let mut cx = context(html);
    Pipeline::standard().unmassage_body(&mut cx);
    assert_eq!(
        serialize(&cx.doc, cx.body),
        html,
        "a placeholder with no stashed media must pass through untouched"
    );
}
