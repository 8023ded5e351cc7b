// ABOUTME: Integration tests for filler and bogus node handling through both transforms.
// ABOUTME: Covers empty blocks, trailing breaks, breaks before nested blocks and inter-block breaks.

use htmldp_processor::{Capabilities, DataProcessor, EditableOptions, FillEmptyBlocks};
use pretty_assertions::assert_eq;

fn editable(processor: &mut DataProcessor, data: &str) -> String {
    processor.to_editable_form(data, &EditableOptions::default())
}

fn default_processor() -> DataProcessor {
    DataProcessor::builder().build().unwrap()
}

#[test]
fn empty_blocks_get_marked_breaks_while_editing() {
    let mut p = default_processor();
    assert_eq!(
        editable(&mut p, "<h1></h1><div></div>"),
        r#"<h1><br data-cke-bogus="1" /></h1><div><br data-cke-bogus="1" /></div>"#
    );
}

#[test]
fn empty_blocks_get_nbsp_in_storage() {
    let mut p = default_processor();
    assert_eq!(
        p.to_storage_form(r#"<h1><br data-cke-bogus="1" /></h1><p></p>"#),
        "<h1>&nbsp;</h1><p>&nbsp;</p>"
    );
}

#[test]
fn filling_can_be_disabled() {
    let mut p = DataProcessor::builder()
        .fill_empty_blocks(false)
        .build()
        .unwrap();
    assert_eq!(editable(&mut p, "<p></p>"), "<p></p>");
    assert_eq!(p.to_storage_form("<p></p>"), "<p></p>");
}

#[test]
fn mandatory_filler_ignores_disabled_filling_while_editing() {
    let caps = Capabilities {
        mandatory_editing_filler: true,
        ..Capabilities::default()
    };
    let mut p = DataProcessor::builder()
        .capabilities(caps)
        .fill_empty_blocks(FillEmptyBlocks::Never)
        .build()
        .unwrap();
    assert_eq!(editable(&mut p, "<p></p>"), r#"<p><br data-cke-bogus="1" /></p>"#);
    assert_eq!(p.to_storage_form("<p></p>"), "<p></p>");
}

#[test]
fn lone_nbsp_becomes_filler_while_editing() {
    let mut p = default_processor();
    assert_eq!(
        editable(&mut p, "<p>&nbsp;</p>"),
        r#"<p><br data-cke-bogus="1" /></p>"#
    );
}

#[test]
fn tail_nbsp_after_text_is_kept() {
    let mut p = default_processor();
    assert_eq!(editable(&mut p, "<p>foo&nbsp;</p>"), "<p>foo&nbsp;</p>");
    assert_eq!(p.to_storage_form("<p>foo&nbsp;</p>"), "<p>foo&nbsp;</p>");
}

#[test]
fn trailing_break_after_text_keeps_its_line() {
    let mut p = default_processor();
    let html = editable(&mut p, "<p>foo<br></p>");
    assert_eq!(html, r#"<p>foo<br /><br data-cke-bogus="1" /></p>"#);
    assert_eq!(p.to_storage_form(&html), "<p>foo<br />&nbsp;</p>");
}

#[test]
fn stored_trailing_break_loads_with_one_filler() {
    let mut p = default_processor();
    assert_eq!(
        editable(&mut p, "<p>foo<br />&nbsp;</p>"),
        r#"<p>foo<br /><br data-cke-bogus="1" /></p>"#
    );
}

#[test]
fn break_before_nested_block_gets_filler() {
    let mut p = default_processor();
    let html = editable(&mut p, "<div>foo<br><p>x</p></div>");
    assert_eq!(
        html,
        r#"<div>foo<br /><br data-cke-bogus="1" /><p>x</p></div>"#
    );
    let stored = p.to_storage_form(&html);
    assert_eq!(stored, "<div>foo<br />&nbsp;<p>x</p></div>");
    assert_eq!(editable(&mut p, &stored), html);
}

#[test]
fn break_between_blocks_is_normalized() {
    let mut p = default_processor();
    let html = editable(&mut p, "<div><p>a</p><br><p>b</p></div>");
    assert_eq!(html, r#"<div><p>a</p><br data-cke-bogus="1" /><p>b</p></div>"#);
    assert_eq!(
        p.to_storage_form(&html),
        "<div><p>a</p>&nbsp;<p>b</p></div>"
    );
}

#[test]
fn nbsp_surface_edits_with_nbsp_fillers() {
    let caps = Capabilities {
        needs_nbsp_filler: true,
        ..Capabilities::default()
    };
    let mut p = DataProcessor::builder().capabilities(caps).build().unwrap();
    let html = editable(&mut p, "<p></p><p>foo<br></p>");
    assert_eq!(html, "<p>&nbsp;</p><p>foo<br />&nbsp;</p>");
    assert_eq!(p.to_storage_form(&html), "<p>&nbsp;</p><p>foo<br />&nbsp;</p>");
}

#[test]
fn at_most_one_trailing_filler_per_block() {
    let mut p = default_processor();
    let once = editable(&mut p, "<p>x<br></p><p></p>");
    let twice = editable(&mut p, &once);
    assert_eq!(twice, once);
    let stored = p.to_storage_form(&twice);
    assert_eq!(stored, "<p>x<br />&nbsp;</p><p>&nbsp;</p>");
    assert_eq!(p.to_storage_form(&stored), stored);
}
