// ABOUTME: Round-trip tests for source protection and the full inbound/outbound pipeline.
// ABOUTME: Property tests check unprotect(protect(s)) == s and that protecting twice changes nothing.

use htmldp_processor::protect::SourceProtector;
use htmldp_processor::{DataProcessor, DataStore, EditableOptions};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn processor() -> DataProcessor {
    DataProcessor::builder().salt(500).build().unwrap()
}

fn round_trip(processor: &mut DataProcessor, source: &str) -> String {
    let editable = processor.to_editable_form(source, &EditableOptions::default());
    processor.to_storage_form(&editable)
}

#[test]
fn comment_inside_attribute_is_byte_identical() {
    let mut p = processor();
    let source = r#"<p><img alt="<!-- keep me -->" src="a.png" /></p>"#;
    assert_eq!(round_trip(&mut p, source), source);
}

#[test]
fn comments_and_scripts_survive() {
    let mut p = processor();
    let source = "<p>one</p><!-- between --><script>var s = '<p>';</script><p>two</p>";
    assert_eq!(round_trip(&mut p, source), source);
}

#[test]
fn comment_nested_in_script_survives() {
    let mut p = processor();
    let source = "<script><!--\nhidden();\n//--></script><p>x</p>";
    assert_eq!(round_trip(&mut p, source), source);
}

#[test]
fn noscript_survives() {
    let mut p = processor();
    let source = "<noscript><p>Enable scripts</p></noscript><p>x</p>";
    assert_eq!(round_trip(&mut p, source), source);
}

#[test]
fn placeholders_resolve_across_passes() {
    let mut p = processor();
    let first = p.to_editable_form(r#"<p title="<!--a-->">x</p>"#, &EditableOptions::default());
    let second = p.to_editable_form(r#"<p title="<!--b-->">y</p>"#, &EditableOptions::default());
    assert_eq!(first, r#"<p title="{cke_protected_1}">x</p>"#);
    assert_eq!(second, r#"<p title="{cke_protected_2}">y</p>"#);
    assert_eq!(p.store().len(), 2);
    assert_eq!(
        p.to_storage_form(&format!("{}{}", second, first)),
        r#"<p title="<!--b-->">y</p><p title="<!--a-->">x</p>"#
    );
}

#[test]
fn relative_links_kept_verbatim() {
    let mut p = processor();
    let source = r#"<p><a href="../x.html#top" name="n">go</a><img src="img/a b.png" /></p>"#;
    assert_eq!(round_trip(&mut p, source), source);
}

fn segment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "<p>",
        "</p>",
        "text",
        " ",
        "\n",
        "\"",
        "'",
        "&amp;",
        "é",
        "<!-- c -->",
        "<!---->",
        "<script>x()</script>",
        "<SCRIPT type=\"a\">if (a<b) {}</SCRIPT>",
        "<noscript>n</noscript>",
        "title=\"<!-- q -->\"",
    ])
}

proptest! {
    #[test]
    fn unprotect_inverts_protect(parts in prop::collection::vec(segment(), 0..12)) {
        let source = parts.concat();
        let protector = SourceProtector::default();
        let mut store = DataStore::new();
        let protected = protector.protect(&source, &mut store);
        prop_assert_eq!(protector.unprotect(&protected, &store), source);
    }

    #[test]
    fn protect_is_idempotent(parts in prop::collection::vec(segment(), 0..12)) {
        let source = parts.concat();
        let protector = SourceProtector::default();
        let mut store = DataStore::new();
        let protected = protector.protect(&source, &mut store);
        let again = protector.protect(&protected, &mut store);
        prop_assert_eq!(again, protected);
    }
}
