// ABOUTME: The DataProcessor that converts raw markup to editable markup and editable markup to storage markup.
// ABOUTME: Chains the string protectors, the bridge, the tree parser, the direction's filter and the writer.

use crate::dom::{Html5Bridge, Html5Parser, HtmlWriter, MarkupBridge, TreeParser};
use crate::error::ConfigError;
use crate::filter::{bogus_and_filler_rules, data_filter_rules, html_filter_rules, Filter};
use crate::options::{Capabilities, Config, Context, EditableOptions, ProcessorBuilder};
use crate::protect::{
    protect_element_names, protect_elements, protect_pre_formatted, protect_real_comments,
    protect_self_closing, unprotect_element_names, unprotect_elements, unprotect_real_comments,
    AttributeProtector, DataStore, SourceProtector,
};

/// Leading character sent through the bridge and stripped afterwards, so a
/// comment is never the first thing the bridge sees.
const BRIDGE_SENTINEL: char = 'a';

/// Two-way markup processor for one editing session.
///
/// A processor owns the session's [`DataStore`], so placeholders handed out by
/// [`to_editable_form`](Self::to_editable_form) resolve in a later
/// [`to_storage_form`](Self::to_storage_form) on the same instance. Rule sets
/// are assembled once at build time and never change afterwards.
///
/// # Example
///
/// ```
/// use htmldp_processor::{DataProcessor, EditableOptions};
///
/// let mut processor = DataProcessor::builder().build().unwrap();
/// let editable = processor.to_editable_form("<p></p>", &EditableOptions::default());
/// assert_eq!(editable, r#"<p><br data-cke-bogus="1" /></p>"#);
/// assert_eq!(processor.to_storage_form(&editable), "<p>&nbsp;</p>");
/// ```
#[derive(Debug)]
pub struct DataProcessor<P = Html5Parser, B = Html5Bridge> {
    config: Config,
    caps: Capabilities,
    data_filter: Filter,
    html_filter: Filter,
    source: SourceProtector,
    attributes: AttributeProtector,
    writer: HtmlWriter,
    store: DataStore,
    parser: P,
    bridge: B,
}

impl DataProcessor {
    /// Create a new builder for configuring a DataProcessor.
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }
}

impl<P: TreeParser, B: MarkupBridge> DataProcessor<P, B> {
    pub(crate) fn from_parts(
        config: Config,
        caps: Capabilities,
        salt: u32,
        parser: P,
        bridge: B,
    ) -> Result<Self, ConfigError> {
        let source = SourceProtector::new(config.protected_source.as_slice())?;

        let mut data_rules = data_filter_rules();
        data_rules.merge(bogus_and_filler_rules(
            false,
            caps,
            config.fill_empty_blocks.clone(),
        ));
        let mut html_rules = html_filter_rules(caps);
        html_rules.merge(bogus_and_filler_rules(
            true,
            caps,
            config.fill_empty_blocks.clone(),
        ));

        Ok(Self {
            config,
            caps,
            data_filter: Filter::new(data_rules),
            html_filter: Filter::new(html_rules),
            source,
            attributes: AttributeProtector::new(salt)?,
            writer: HtmlWriter::new(),
            store: DataStore::new(),
            parser,
            bridge,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Salt of the temporary attribute copies.
    pub fn salt(&self) -> u32 {
        self.attributes.salt()
    }

    /// The session's placeholder store.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Turns raw, possibly malformed markup into markup ready for the
    /// editing surface.
    pub fn to_editable_form(&mut self, data: &str, options: &EditableOptions) -> String {
        tracing::debug!(len = data.len(), context = ?options.context, "Converting to editable form");

        let mut data = self.source.protect(data, &mut self.store);
        data = self.attributes.protect(&data);
        data = protect_elements(&data);
        data = protect_element_names(&data);
        data = protect_self_closing(&data);
        if !self.caps.keeps_pre_leading_newline {
            data = protect_pre_formatted(&data);
        }

        let context = match &options.context {
            Context::Editable => Some(self.config.editable_tag.as_str()),
            Context::None => None,
            Context::Element(tag) => Some(tag.as_str()),
        };
        let mut container = context.unwrap_or(self.config.editable_tag.as_str());

        let wrapped_in_pre = self.caps.loses_pre_formatting && container == "pre";
        if wrapped_in_pre {
            container = "div";
            data = format!("<pre>{}</pre>", data);
        }

        let echoed = self
            .bridge
            .insert_and_read_back(container, &format!("{}{}", BRIDGE_SENTINEL, data));
        data = match echoed.strip_prefix(BRIDGE_SENTINEL) {
            Some(rest) => rest.to_string(),
            None => {
                tracing::warn!("Bridge dropped the leading sentinel");
                echoed
            }
        };

        data = self.attributes.restore(&data);
        if wrapped_in_pre {
            data = strip_pre_wrapper(&data);
        }

        data = unprotect_element_names(&data);
        data = unprotect_elements(&data);
        data = unprotect_real_comments(&data);

        let fix_body = if options.fix_for_body {
            self.config.fix_body_tag()
        } else {
            None
        };
        let mut doc = self.parser.parse(&data, context, fix_body);
        let html = HtmlWriter::new().serialize(&mut doc, &self.data_filter);
        let html = protect_real_comments(&html);

        tracing::debug!(len = html.len(), "Editable form ready");
        html
    }

    /// Turns editable markup back into clean storage markup, restoring every
    /// protected construct.
    pub fn to_storage_form(&mut self, html: &str) -> String {
        tracing::debug!(len = html.len(), "Converting to storage form");

        let mut doc = self.parser.parse(
            html,
            Some(self.config.editable_tag.as_str()),
            self.config.fix_body_tag(),
        );
        self.writer.reset();
        let data = self.writer.serialize(&mut doc, &self.html_filter);
        let data = unprotect_real_comments(&data);
        let data = self.source.unprotect(&data, &self.store);

        tracing::debug!(len = data.len(), "Storage form ready");
        data
    }
}

fn strip_pre_wrapper(html: &str) -> String {
    let mut out = html;
    if out.get(..5).is_some_and(|head| head.eq_ignore_ascii_case("<pre>")) {
        out = &out[5..];
    }
    let tail = out.len().saturating_sub(6);
    if out.get(tail..).is_some_and(|end| end.eq_ignore_ascii_case("</pre>")) {
        out = &out[..tail];
    }
    out.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{EnterMode, FillEmptyBlocks};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn processor() -> DataProcessor {
        DataProcessor::builder().salt(123).build().unwrap()
    }

    fn editable(processor: &mut DataProcessor, data: &str) -> String {
        processor.to_editable_form(data, &EditableOptions::default())
    }

    #[test]
    fn test_empty_paragraph_filled_both_ways() {
        let mut p = processor();
        let html = editable(&mut p, "<p></p>");
        assert_eq!(html, r#"<p><br data-cke-bogus="1" /></p>"#);
        assert_eq!(p.to_storage_form(&html), "<p>&nbsp;</p>");
        assert_eq!(p.to_storage_form("<p></p>"), "<p>&nbsp;</p>");
    }

    #[test]
    fn test_empty_paragraph_with_nbsp_surface() {
        let caps = Capabilities {
            needs_nbsp_filler: true,
            ..Capabilities::default()
        };
        let mut p = DataProcessor::builder().capabilities(caps).build().unwrap();
        assert_eq!(editable(&mut p, "<p></p>"), "<p>&nbsp;</p>");
    }

    #[test]
    fn test_trailing_break_after_text_kept() {
        let mut p = processor();
        let html = editable(&mut p, "<p>foo<br></p>");
        assert_eq!(html, r#"<p>foo<br /><br data-cke-bogus="1" /></p>"#);
        let stored = p.to_storage_form(&html);
        assert_eq!(stored, "<p>foo<br />&nbsp;</p>");
        assert_eq!(editable(&mut p, &stored), html);
    }

    #[test]
    fn test_double_break_keeps_both_lines() {
        let mut p = processor();
        let html = editable(&mut p, "<p>foo<br><br></p>");
        assert_eq!(html, r#"<p>foo<br /><br /><br data-cke-bogus="1" /></p>"#);
        assert_eq!(p.to_storage_form(&html), "<p>foo<br /><br />&nbsp;</p>");
    }

    #[test]
    fn test_break_before_nested_block_survives_round_trip() {
        let mut p = processor();
        let html = editable(&mut p, "<div>foo<br><p>x</p></div>");
        assert_eq!(html, r#"<div>foo<br /><br data-cke-bogus="1" /><p>x</p></div>"#);
        assert_eq!(p.to_storage_form(&html), "<div>foo<br />&nbsp;<p>x</p></div>");
    }

    #[test]
    fn test_table_sections_reordered() {
        let mut p = processor();
        assert_eq!(
            p.to_storage_form(
                "<table><tbody><tr><td>a</td></tr></tbody><thead><tr><th>h</th></tr></thead></table>"
            ),
            "<table><thead><tr><th>h</th></tr></thead><tbody><tr><td>a</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_comment_in_attribute_round_trips() {
        let mut p = processor();
        let source = r#"<p title="<!-- keep me -->">x</p>"#;
        let html = editable(&mut p, source);
        assert_eq!(html, r#"<p title="{cke_protected_1}">x</p>"#);
        assert_eq!(p.store().get(1), Some("<!-- keep me -->"));
        assert_eq!(p.to_storage_form(&html), source);
    }

    #[test]
    fn test_script_and_comment_survive() {
        let mut p = processor();
        let source = "<p>a</p><!-- note --><script>if (a < b) {}</script>";
        let html = editable(&mut p, source);
        assert!(html.starts_with("<p>a</p><!--{cke_protected}{C}"));
        assert!(!html.contains("<script"));
        assert_eq!(p.to_storage_form(&html), source);
    }

    #[test]
    fn test_bare_text_wrapped_per_enter_mode() {
        let mut p = processor();
        assert_eq!(editable(&mut p, "foo"), "<p>foo</p>");

        let mut div = DataProcessor::builder()
            .enter_mode(EnterMode::Div)
            .build()
            .unwrap();
        assert_eq!(editable(&mut div, "foo"), "<div>foo</div>");

        let mut br = DataProcessor::builder()
            .enter_mode(EnterMode::Br)
            .build()
            .unwrap();
        assert_eq!(editable(&mut br, "foo"), "foo");
    }

    #[test]
    fn test_fix_for_body_disabled() {
        let mut p = processor();
        let options = EditableOptions::default().fix_for_body(false);
        assert_eq!(p.to_editable_form("foo", &options), "foo");
    }

    #[test]
    fn test_context_without_block_children_not_wrapped() {
        let mut p = processor();
        let options = EditableOptions::default().with_context(Context::element("p").unwrap());
        assert_eq!(p.to_editable_form("foo <b>bar</b>", &options), "foo <b>bar</b>");
    }

    #[test]
    fn test_event_handlers_parked_while_editing() {
        let mut p = processor();
        let html = editable(&mut p, r#"<p onclick="go()">x</p>"#);
        assert_eq!(html, r#"<p data-cke-pa-onclick="go()">x</p>"#);
        assert_eq!(p.to_storage_form(&html), r#"<p onclick="go()">x</p>"#);
    }

    #[test]
    fn test_links_shadowed_and_restored() {
        let mut p = processor();
        let html = editable(&mut p, r#"<p><a href="../page.html">x</a></p>"#);
        assert_eq!(
            html,
            r#"<p><a data-cke-saved-href="../page.html" href="../page.html">x</a></p>"#
        );
        assert_eq!(
            p.to_storage_form(&html),
            r#"<p><a href="../page.html">x</a></p>"#
        );
    }

    #[test]
    fn test_empty_anchor_removed_on_output() {
        let mut p = processor();
        assert_eq!(
            p.to_storage_form(r#"<p>a<a href="x"></a><a name="top"></a></p>"#),
            r#"<p>a<a name="top"></a></p>"#
        );
    }

    #[test]
    fn test_style_element_survives() {
        let mut p = processor();
        let html = editable(&mut p, "<style>\n p { color: red }\n</style><p>x</p>");
        assert_eq!(html, "<style>\n p { color: red }\n</style><p>x</p>");
        assert_eq!(
            p.to_storage_form(&html),
            r#"<style type="text/css">p { color: red }</style><p>x</p>"#
        );
    }

    #[test]
    fn test_configured_protected_source() {
        let mut p = DataProcessor::builder()
            .protected_source(r"<\?[\s\S]*?\?>")
            .build()
            .unwrap();
        let source = "<p><?php echo 1; ?></p>";
        let html = editable(&mut p, source);
        assert!(!html.contains("<?php"));
        assert_eq!(p.to_storage_form(&html), source);
    }

    #[test]
    fn test_fill_policy_predicate() {
        let mut p = DataProcessor::builder()
            .fill_empty_blocks(FillEmptyBlocks::predicate(|el| !el.is("div")))
            .build()
            .unwrap();
        assert_eq!(p.to_storage_form("<div></div><p></p>"), "<div></div><p>&nbsp;</p>");
    }

    #[test]
    fn test_legacy_pre_container() {
        let caps = Capabilities {
            loses_pre_formatting: true,
            ..Capabilities::default()
        };
        let seen = RecordingBridge::default();
        let mut p = DataProcessor::builder()
            .capabilities(caps)
            .build_with(Html5Parser, seen)
            .unwrap();
        let options = EditableOptions::default().with_context(Context::element("pre").unwrap());
        assert_eq!(p.to_editable_form("x  y", &options), "x  y");
        assert_eq!(
            p.bridge.calls.borrow().as_slice(),
            &[("div".to_string(), "a<pre>x  y</pre>".to_string())]
        );
    }

    #[test]
    fn test_strip_pre_wrapper() {
        assert_eq!(strip_pre_wrapper("<PRE>x</PRE>"), "x");
        assert_eq!(strip_pre_wrapper("x</pre>"), "x");
        assert_eq!(strip_pre_wrapper("<p>x</p>"), "<p>x</p>");
    }

    #[derive(Default)]
    struct RecordingBridge {
        calls: RefCell<Vec<(String, String)>>,
    }

    impl MarkupBridge for RecordingBridge {
        fn insert_and_read_back(&self, tag: &str, markup: &str) -> String {
            self.calls
                .borrow_mut()
                .push((tag.to_string(), markup.to_string()));
            Html5Bridge.insert_and_read_back(tag, markup)
        }
    }
}
