// ABOUTME: Basic markup writer that serializes a filtered Document back to a string.
// ABOUTME: Escapes text and attributes, keeps raw-text elements verbatim, self-closes void elements.

use ego_tree::NodeId;

use crate::dom::dtd;
use crate::dom::node::{Document, Node};
use crate::filter::Filter;

/// Serializes documents. The buffer is reused across calls; `reset` discards
/// anything left over from an interrupted write.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the output buffer.
    pub fn reset(&mut self) {
        self.out.clear();
    }

    /// Applies `filter` to the document, then writes the root's children and
    /// returns the markup, leaving the buffer empty.
    pub fn serialize(&mut self, doc: &mut Document, filter: &Filter) -> String {
        filter.apply(doc);
        self.write_children(doc, doc.root());
        std::mem::take(&mut self.out)
    }

    /// Writes the document without filtering.
    pub fn write(&mut self, doc: &Document) -> String {
        self.write_children(doc, doc.root());
        std::mem::take(&mut self.out)
    }

    fn write_children(&mut self, doc: &Document, parent: NodeId) {
        for child in doc.children(parent) {
            self.write_node(doc, child);
        }
    }

    fn write_node(&mut self, doc: &Document, id: NodeId) {
        match doc.node(id) {
            Some(Node::Text(text)) => {
                let raw = doc
                    .parent(id)
                    .and_then(|p| doc.name(p))
                    .is_some_and(dtd::is_raw_text);
                if raw {
                    self.out.push_str(text);
                } else {
                    self.out.push_str(&escape_text(text));
                }
            }
            Some(Node::Comment(comment)) => {
                self.out.push_str("<!--");
                self.out.push_str(comment);
                self.out.push_str("-->");
            }
            Some(Node::Element(el)) => {
                let name = el.name.as_str();
                if name.is_empty() {
                    self.write_children(doc, id);
                    return;
                }

                self.out.push('<');
                self.out.push_str(name);
                for (k, v) in el.attrs() {
                    self.out.push(' ');
                    self.out.push_str(k);
                    self.out.push_str("=\"");
                    self.out.push_str(&escape_attr(v));
                    self.out.push('"');
                }

                if el.forced_empty || dtd::is_void(name) {
                    self.out.push_str(" />");
                    return;
                }

                self.out.push('>');
                if name == "pre" && starts_with_newline(doc, id) {
                    self.out.push('\n');
                }
                self.write_children(doc, id);
                self.out.push_str("</");
                self.out.push_str(name);
                self.out.push('>');
            }
            Some(Node::Fragment) => self.write_children(doc, id),
            None => {}
        }
    }
}

// The tokenizer drops one newline right after `<pre>`.
fn starts_with_newline(doc: &Document, pre: NodeId) -> bool {
    doc.first_child(pre)
        .and_then(|child| doc.text(child))
        .is_some_and(|text| text.starts_with('\n'))
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
