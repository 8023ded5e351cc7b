// ABOUTME: Markup-to-tree parsing: the TreeParser seam and its html5ever-backed default.
// ABOUTME: Converts scraper's tree into the arena Document and auto-wraps bare inline runs.

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::dom::dtd;
use crate::dom::node::{Document, Element, Node};

/// Turns markup into a working tree.
pub trait TreeParser {
    /// Parses `markup` as content of `context` (None: no container). When
    /// `fix_body` names a tag, bare inline content at the root is wrapped in it.
    fn parse(&self, markup: &str, context: Option<&str>, fix_body: Option<&str>) -> Document;
}

/// Markup that carries its own document structure.
static DOCUMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:!doctype|html)[\s>]").unwrap());

/// Default parser backed by `scraper` (html5ever).
///
/// Fragments are parsed in body context. Markup containing a doctype or an
/// `<html>` tag is parsed as a whole document so `html`, `head`, `body` and
/// `title` survive as elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5Parser;

impl TreeParser for Html5Parser {
    fn parse(&self, markup: &str, context: Option<&str>, fix_body: Option<&str>) -> Document {
        let mut doc = Document::new();
        let root = doc.root();

        if DOCUMENT_RE.is_match(markup) {
            let html = Html::parse_document(markup);
            for child in html.tree.root().children() {
                import(&mut doc, root, child);
            }
            return doc;
        }

        let fragment = Html::parse_fragment(markup);
        for child in fragment.root_element().children() {
            import(&mut doc, root, child);
        }

        if let Some(tag) = fix_body {
            if context.map_or(true, dtd::accepts_blocks) {
                wrap_inline_runs(&mut doc, tag);
            }
        }
        doc
    }
}

fn import(doc: &mut Document, parent: NodeId, node: ego_tree::NodeRef<scraper::Node>) {
    match node.value() {
        scraper::Node::Text(t) => {
            doc.append(parent, Node::text(&**t));
        }
        scraper::Node::Element(el) => {
            let mut element = Element::new(el.name());
            for (k, v) in el.attrs() {
                element.set_attr(k, v);
            }
            if let Some(id) = doc.append(parent, Node::Element(element)) {
                for child in node.children() {
                    import(doc, id, child);
                }
            }
        }
        scraper::Node::Comment(c) => {
            doc.append(parent, Node::Comment((**c).to_string()));
        }
        _ => {}
    }
}

/// Elements that neither start a block nor count as paragraph content.
fn is_non_body_content(name: &str) -> bool {
    matches!(
        name,
        "base" | "link" | "meta" | "noscript" | "script" | "style" | "template" | "title"
    )
}

fn is_block_child(doc: &Document, id: NodeId) -> bool {
    doc.name(id)
        .is_some_and(|name| dtd::is_block_like(name) && !is_non_body_content(name))
}

fn is_inline_content(doc: &Document, id: NodeId) -> bool {
    match doc.node(id) {
        Some(Node::Text(text)) => !text.trim().is_empty(),
        Some(Node::Element(el)) => !is_non_body_content(&el.name),
        _ => false,
    }
}

/// Wraps every maximal run of root-level non-block nodes holding inline
/// content. Leading whitespace and comments stay outside the wrapper.
fn wrap_inline_runs(doc: &mut Document, tag: &str) {
    let root = doc.root();
    let mut run = Vec::new();
    for child in doc.children(root) {
        if is_block_child(doc, child) {
            wrap_run(doc, std::mem::take(&mut run), tag);
        } else {
            run.push(child);
        }
    }
    wrap_run(doc, run, tag);
}

fn wrap_run(doc: &mut Document, run: Vec<NodeId>, tag: &str) {
    let Some(start) = run.iter().position(|&id| is_inline_content(doc, id)) else {
        return;
    };
    let Some(wrapper) = doc.insert_before(run[start], Node::element(tag)) else {
        return;
    };
    for &id in &run[start..] {
        doc.append_existing(wrapper, id);
    }
}
