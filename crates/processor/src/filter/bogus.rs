// ABOUTME: Bogus/filler normalization that keeps empty blocks and trailing breaks at line height.
// ABOUTME: Removes stray fillers, converts inter-block breaks, and appends the direction's filler form.

//! Fillers and bogus nodes.
//!
//! A *filler* is the invisible node that gives an otherwise empty block, or
//! the line after a genuine trailing `<br>`, its height: a marked
//! `<br data-cke-bogus="1">` while editing on surfaces that need one, and a
//! single U+00A0 text node everywhere else (always in output). A filler-shaped
//! node that does not serve that purpose is *bogus* and gets removed.
//!
//! Two rules implement this. The line-break rule, run on every `<br>`, appends
//! a filler after a real break that ends its block, or before a nested block
//! that directly follows it. The block rule runs on every text block once its
//! children are done: it cleans bogus nodes, gives real breaks back the
//! fillers cleanup took from them, and fills the block when it is empty.

use ego_tree::NodeId;

use crate::dom::dtd;
use crate::dom::node::{Document, Element, Node};
use crate::filter::rules::{ElementRule, RuleSet};
use crate::options::{Capabilities, FillEmptyBlocks};

/// Marks a synthetic line-break filler.
pub const BOGUS_ATTR: &str = "data-cke-bogus";
/// Marks a break that closes a line on purpose.
pub const EOL_ATTR: &str = "data-cke-eol";
/// Marks invisible selection bookmarks.
pub const BOOKMARK_ATTR: &str = "data-cke-bookmark";

const NBSP: char = '\u{a0}';

/// Direction and surface the rules are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillerContext {
    /// True for the outbound (storage) direction.
    pub output: bool,
    pub caps: Capabilities,
}

impl FillerContext {
    pub fn new(output: bool, caps: Capabilities) -> Self {
        Self { output, caps }
    }

    fn create_filler(&self) -> Node {
        if self.output || self.caps.needs_nbsp_filler {
            Node::text(NBSP.to_string())
        } else {
            Node::Element(Element::new("br").with_attr(BOGUS_ATTR, "1"))
        }
    }

    /// Whether `id` already is this direction's filler.
    fn is_filler(&self, doc: &Document, id: NodeId) -> bool {
        if self.output || self.caps.needs_nbsp_filler {
            doc.text(id).is_some_and(|value| value == "\u{a0}")
        } else {
            doc.element(id)
                .is_some_and(|el| el.is("br") && el.has_attr(BOGUS_ATTR))
        }
    }

    /// Whether `id` may be a bogus node. A text node ending in U+00A0 is split
    /// first so the trailing space stands alone.
    fn maybe_bogus(&self, doc: &mut Document, id: NodeId, at_block_end: bool) -> bool {
        if !(self.output && !self.caps.needs_br_filler) {
            if let Some(el) = doc.element(id) {
                if el.is("br") && !el.has_attr(EOL_ATTR) {
                    return true;
                }
            }
        }

        let head = match doc.text(id) {
            Some(value) if value.ends_with(NBSP) => {
                value[..value.len() - NBSP.len_utf8()].to_string()
            }
            _ => return false,
        };
        if !head.is_empty() {
            doc.insert_before(id, Node::text(head));
            doc.set_text(id, NBSP.to_string());
        }

        if !self.caps.needs_br_filler && self.output {
            let in_text_block = doc
                .parent(id)
                .and_then(|p| doc.name(p))
                .is_some_and(dtd::is_text_block);
            if !at_block_end || in_text_block {
                return true;
            }
        }

        if !self.output {
            match doc.prev_sibling(id) {
                // After a line break at the end of a block.
                Some(prev) if doc.is_element_named(prev, "br") => return true,
                Some(prev) if !is_block_boundary(doc, prev) => {}
                // Alone, or between two blocks.
                _ => return true,
            }
        }

        false
    }

    /// Removes bogus nodes from `block` and converts inter-block fillers.
    fn clean_bogus(&self, doc: &mut Document, block: NodeId) {
        let mut bogus = Vec::new();
        let mut last = last_meaningful(doc, block);

        if let Some(id) = last {
            if self.maybe_bogus(doc, id, true) {
                bogus.push(id);
            }
        }

        while let Some(current) = last {
            if is_block_boundary(doc, current) {
                if let Some(node) = prev_meaningful(doc, current) {
                    if self.maybe_bogus(doc, node, false) {
                        match prev_meaningful(doc, node) {
                            Some(prev) if !is_block_boundary(doc, prev) => bogus.push(node),
                            // A lone break between two blocks is spacing, not bogus.
                            _ => {
                                doc.insert_after(node, self.create_filler());
                                doc.detach(node);
                            }
                        }
                    }
                }
            }
            last = doc.prev_sibling(current);
        }

        for id in bogus {
            tracing::trace!(?id, "Removing bogus filler");
            doc.detach(id);
        }
    }

    fn is_empty_block_need_filler(&self, doc: &Document, block: NodeId) -> bool {
        let editing_without_br = !self.output && !self.caps.needs_br_filler;
        if editing_without_br {
            if doc.is_fragment(block) || self.caps.native_empty_blocks {
                return false;
            }
            let name = doc.name(block).unwrap_or_default();
            if dtd::is_table_cell(name) || dtd::is_list_item(name) {
                return false;
            }
        }
        last_meaningful(doc, block).is_none()
    }
}

/// Cleans a text block and fills it when empty.
#[derive(Debug, Clone)]
pub struct BlockFilter {
    ctx: FillerContext,
    fill: FillEmptyBlocks,
}

impl BlockFilter {
    pub fn new(ctx: FillerContext, fill: FillEmptyBlocks) -> Self {
        Self { ctx, fill }
    }

    pub fn apply(&self, doc: &mut Document, block: NodeId) {
        if doc.is_fragment(block) {
            return;
        }

        self.ctx.clean_bogus(doc, block);

        let breaks: Vec<NodeId> = doc
            .children(block)
            .into_iter()
            .filter(|&id| doc.is_element_named(id, "br"))
            .collect();
        let line_breaks = LineBreakFilter::new(self.ctx);
        for br in breaks {
            line_breaks.apply(doc, br);
        }

        let mandatory = self.ctx.caps.mandatory_editing_filler && !self.ctx.output;
        let wanted = mandatory || doc.element(block).is_some_and(|el| self.fill.allows(el));
        if wanted && self.ctx.is_empty_block_need_filler(doc, block) {
            doc.append(block, self.ctx.create_filler());
        }
    }
}

/// Adds a filler after a real line break that ends a line.
#[derive(Debug, Clone, Copy)]
pub struct LineBreakFilter {
    ctx: FillerContext,
}

impl LineBreakFilter {
    pub fn new(ctx: FillerContext) -> Self {
        Self { ctx }
    }

    pub fn apply(&self, doc: &mut Document, br: NodeId) {
        let Some(parent) = doc.parent(br) else {
            return;
        };
        if doc.is_fragment(parent) {
            return;
        }
        if let Some(el) = doc.element(br) {
            if el.has_attr(BOGUS_ATTR) || el.has_attr(EOL_ATTR) {
                return;
            }
        }

        let next = next_meaningful(doc, br);
        if next.is_some_and(|id| self.ctx.is_filler(doc, id)) {
            return;
        }
        let previous = prev_meaningful(doc, br);

        match next {
            None if is_block_boundary(doc, parent) => {
                doc.append(parent, self.ctx.create_filler());
            }
            Some(next)
                if is_block_boundary(doc, next)
                    && previous.is_some_and(|p| !is_block_boundary(doc, p)) =>
            {
                doc.insert_before(next, self.ctx.create_filler());
            }
            _ => {}
        }
    }
}

/// Builds the filler rules for one direction: the block rule on every text
/// block, a root rule that never fills, and the line-break rule.
pub fn bogus_and_filler_rules(output: bool, caps: Capabilities, fill: FillEmptyBlocks) -> RuleSet {
    let ctx = FillerContext::new(output, caps);
    let mut rules = RuleSet::new();
    for tag in dtd::TEXT_BLOCKS {
        rules.add_element_rule(tag, ElementRule::Block(BlockFilter::new(ctx, fill.clone())));
    }
    rules
        .root
        .push(ElementRule::Block(BlockFilter::new(ctx, FillEmptyBlocks::Never)));
    rules.add_element_rule("br", ElementRule::LineBreak(LineBreakFilter::new(ctx)));
    rules
}

/// Whitespace-only text and bookmarks are skipped when looking for
/// neighbours.
fn is_ignorable(doc: &Document, id: NodeId) -> bool {
    match doc.node(id) {
        Some(Node::Text(value)) => value
            .trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
            .is_empty(),
        Some(Node::Element(el)) => el.attr(BOOKMARK_ATTR).is_some_and(|v| !v.is_empty()),
        _ => false,
    }
}

pub(crate) fn is_block_boundary(doc: &Document, id: NodeId) -> bool {
    match doc.node(id) {
        Some(Node::Fragment) => true,
        Some(Node::Element(el)) => dtd::is_block_like(&el.name),
        _ => false,
    }
}

fn last_meaningful(doc: &Document, parent: NodeId) -> Option<NodeId> {
    let mut current = doc.last_child(parent);
    while let Some(id) = current {
        if !is_ignorable(doc, id) {
            return Some(id);
        }
        current = doc.prev_sibling(id);
    }
    None
}

fn prev_meaningful(doc: &Document, id: NodeId) -> Option<NodeId> {
    let mut current = doc.prev_sibling(id);
    while let Some(id) = current {
        if !is_ignorable(doc, id) {
            return Some(id);
        }
        current = doc.prev_sibling(id);
    }
    None
}

fn next_meaningful(doc: &Document, id: NodeId) -> Option<NodeId> {
    let mut current = doc.next_sibling(id);
    while let Some(id) = current {
        if !is_ignorable(doc, id) {
            return Some(id);
        }
        current = doc.next_sibling(id);
    }
    None
}
