// ABOUTME: Integration tests for the structural outbound rules.
// ABOUTME: Table child order, empty anchors, objects with params and embeds, private markup cleanup.

use htmldp_processor::{DataProcessor, EditableOptions};
use pretty_assertions::assert_eq;

fn processor() -> DataProcessor {
    DataProcessor::builder().salt(777).build().unwrap()
}

#[test]
fn table_children_sorted_canonically() {
    let mut p = processor();
    let html = "<table><tfoot><tr><td>f</td></tr></tfoot><tbody><tr><td>b</td></tr></tbody>\
                <thead><tr><th>h</th></tr></thead><caption>c</caption></table>";
    assert_eq!(
        p.to_storage_form(html),
        "<table><caption>c</caption><thead><tr><th>h</th></tr></thead>\
         <tfoot><tr><td>f</td></tr></tfoot><tbody><tr><td>b</td></tr></tbody></table>"
    );
}

#[test]
fn table_already_in_order_is_untouched() {
    let mut p = processor();
    let html = "<table><colgroup><col /></colgroup><tbody><tr><td>x</td></tr></tbody></table>";
    assert_eq!(p.to_storage_form(html), html);
}

#[test]
fn empty_table_cells_filled() {
    let mut p = processor();
    assert_eq!(
        p.to_storage_form("<table><tbody><tr><td></td></tr></tbody></table>"),
        "<table><tbody><tr><td>&nbsp;</td></tr></tbody></table>"
    );
}

#[test]
fn anchors_without_content_or_name_removed() {
    let mut p = processor();
    assert_eq!(
        p.to_storage_form(r#"<p>a<a href="x"></a>b</p>"#),
        "<p>ab</p>"
    );
}

#[test]
fn named_anchor_survives_round_trip() {
    let mut p = processor();
    let editable = p.to_editable_form(r#"<p><a name="top"></a>x</p>"#, &EditableOptions::default());
    assert_eq!(
        editable,
        r#"<p><a data-cke-saved-name="top" name="top"></a>x</p>"#
    );
    assert_eq!(p.to_storage_form(&editable), r#"<p><a name="top"></a>x</p>"#);
}

#[test]
fn saved_name_alone_keeps_anchor() {
    let mut p = processor();
    assert_eq!(
        p.to_storage_form(r#"<p><a data-cke-saved-name="s"></a>x</p>"#),
        r#"<p><a name="s"></a>x</p>"#
    );
}

#[test]
fn object_with_self_closed_param() {
    let mut p = processor();
    let editable = p.to_editable_form(
        r#"<object width="10" height="20"><param name="movie" value="m.swf"/><embed src="m.swf"></object>"#,
        &EditableOptions::default(),
    );
    assert_eq!(
        editable,
        r#"<p><cke:object width="10" height="20"><cke:param name="movie" value="m.swf"></cke:param><cke:embed src="m.swf"></cke:embed></cke:object></p>"#
    );
    assert_eq!(
        p.to_storage_form(&editable),
        r#"<p><object width="10" height="20"><param name="movie" value="m.swf" /><embed src="m.swf" width="10" height="20" /></object></p>"#
    );
}

#[test]
fn private_markup_removed_on_output() {
    let mut p = processor();
    assert_eq!(
        p.to_storage_form(
            r#"<p class="cke_focus" data-cke-expando="1">a<span data-cke-temp="1">tmp</span><span class="Apple-style-span">b</span></p>"#
        ),
        "<p>ab</p>"
    );
}

#[test]
fn form_controls_locked_while_editing() {
    let mut p = processor();
    let editable = p.to_editable_form(
        r#"<p><input type="text" value="v" /><textarea>t</textarea></p>"#,
        &EditableOptions::default(),
    );
    assert_eq!(
        editable,
        r#"<p><input type="text" value="v" data-cke-editable="1" contenteditable="false" /><textarea data-cke-editable="1" contenteditable="false">t</textarea></p>"#
    );
    assert_eq!(
        p.to_storage_form(&editable),
        r#"<p><input type="text" value="v" /><textarea>t</textarea></p>"#
    );
}
