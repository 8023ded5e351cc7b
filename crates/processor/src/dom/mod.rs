// ABOUTME: Document model and the collaborators that move markup in and out of it.
// ABOUTME: Node arena, element tables, html5ever-backed parser and bridge, and the basic writer.

//! Document tree utilities.
//!
//! The arena [`Document`] is the working tree every filter rule operates on.
//! [`TreeParser`] and [`MarkupBridge`] are the seams to the tokenizer; the
//! defaults are backed by `scraper` (html5ever). [`HtmlWriter`] turns a filtered
//! tree back into markup.

pub mod bridge;
pub mod dtd;
pub mod node;
pub mod parser;
pub mod writer;

pub use bridge::{Html5Bridge, MarkupBridge};
pub use node::{Document, Element, Node};
pub use parser::{Html5Parser, TreeParser};
pub use writer::HtmlWriter;
