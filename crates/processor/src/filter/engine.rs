// ABOUTME: Filter engine: walks a Document depth-first and interprets a RuleSet on every node.
// ABOUTME: Per element: name rewrite, wildcard and tag rules, children, block rules, then attributes.

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::dom::dtd;
use crate::dom::node::{Document, Element, Node};
use crate::filter::rules::{rewrite_name, AttributeRule, ElementRule, RuleSet, Verdict};
use crate::protect::attributes::SAVED_PREFIX;

static CKE_CLASS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s+)cke_\S*").unwrap());
static STYLE_PROPERTY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|;)([^:]+)").unwrap());

const SHADOWED_ATTRIBUTES: &[&str] = &["name", "href", "src"];

/// What happened to a node during filtering.
enum Outcome {
    Kept,
    Removed,
    /// Replaced by its children; carries the first of them.
    Unwrapped(Option<NodeId>),
}

/// An immutable rule set ready to be applied to any number of documents.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    rules: RuleSet,
}

impl Filter {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Filters the whole document in place.
    pub fn apply(&self, doc: &mut Document) {
        let root = doc.root();
        let (after, before): (Vec<_>, Vec<_>) =
            self.rules.root.iter().partition(|rule| rule.runs_after_children());
        for rule in before {
            self.run_element_rule(doc, root, rule);
        }
        self.filter_children(doc, root);
        for rule in after {
            self.run_element_rule(doc, root, rule);
        }
    }

    fn filter_children(&self, doc: &mut Document, parent: NodeId) {
        let mut cursor = doc.first_child(parent);
        while let Some(id) = cursor {
            // Nodes a rule inserts after `id` are not visited.
            let next = doc.next_sibling(id);
            cursor = match self.filter_node(doc, id) {
                Outcome::Kept | Outcome::Removed => next,
                Outcome::Unwrapped(first) => first.or(next),
            };
        }
    }

    fn filter_node(&self, doc: &mut Document, id: NodeId) -> Outcome {
        let Some(name) = doc.name(id).map(str::to_string) else {
            return Outcome::Kept;
        };

        if let Some(renamed) = rewrite_name(&self.rules.element_names, &name) {
            if renamed.is_empty() {
                tracing::trace!(tag = %name, "Unwrapping element");
                return Outcome::Unwrapped(doc.replace_with_children(id));
            }
            doc.with_element_mut(id, |el| el.name = renamed);
        }

        let tag = doc.name(id).unwrap_or_default().to_string();
        let (after, before): (Vec<&ElementRule>, Vec<&ElementRule>) = self
            .rules
            .wildcard
            .iter()
            .chain(self.rules.element_rules(&tag))
            .partition(|rule| rule.runs_after_children());

        for rule in before {
            if let Some(outcome) = self.settle(doc, id, rule) {
                return outcome;
            }
        }

        if !doc.element(id).is_some_and(|el| el.forced_empty) {
            self.filter_children(doc, id);
        }

        // Nested blocks and breaks are settled before the block itself.
        for rule in after {
            if let Some(outcome) = self.settle(doc, id, rule) {
                return outcome;
            }
        }
        self.filter_attributes(doc, id);
        Outcome::Kept
    }

    /// Runs one rule; Some when the element left the tree.
    fn settle(&self, doc: &mut Document, id: NodeId, rule: &ElementRule) -> Option<Outcome> {
        match self.run_element_rule(doc, id, rule) {
            Verdict::Keep => None,
            Verdict::Remove => {
                tracing::trace!(tag = doc.name(id).unwrap_or_default(), "Removing element");
                doc.detach(id);
                Some(Outcome::Removed)
            }
            Verdict::Unwrap => {
                tracing::trace!(tag = doc.name(id).unwrap_or_default(), "Unwrapping element");
                Some(Outcome::Unwrapped(doc.replace_with_children(id)))
            }
        }
    }

    fn run_element_rule(&self, doc: &mut Document, id: NodeId, rule: &ElementRule) -> Verdict {
        match rule {
            ElementRule::DropTemporary => {
                let temporary = doc
                    .element(id)
                    .and_then(|el| el.attr("data-cke-temp"))
                    .is_some_and(|v| !v.is_empty());
                if temporary {
                    return Verdict::Remove;
                }
            }
            ElementRule::DropShadowedAttributes => {
                doc.with_element_mut(id, |el| {
                    for name in SHADOWED_ATTRIBUTES {
                        if el.has_attr(&format!("{}{}", SAVED_PREFIX, name)) {
                            el.remove_attr(name);
                        }
                    }
                });
            }
            ElementRule::ReorderTable => reorder_table(doc, id),
            ElementRule::InheritObjectSize => {
                let size = doc
                    .parent(id)
                    .and_then(|p| doc.element(p))
                    .filter(|parent| parent.is("object"))
                    .map(|parent| {
                        (
                            parent.attr("width").map(str::to_string),
                            parent.attr("height").map(str::to_string),
                        )
                    });
                if let Some((width, height)) = size {
                    doc.with_element_mut(id, |el| {
                        if let Some(width) = width.filter(|w| !w.is_empty()) {
                            el.set_attr("width", width);
                        }
                        if let Some(height) = height.filter(|h| !h.is_empty()) {
                            el.set_attr("height", height);
                        }
                    });
                }
            }
            ElementRule::ForceEmpty => {
                for child in doc.children(id) {
                    doc.detach(child);
                }
                doc.with_element_mut(id, |el| el.forced_empty = true);
            }
            ElementRule::RemoveEmptyAnchor => {
                let named = doc.element(id).is_some_and(|el| {
                    [el.attr("name"), el.attr("data-cke-saved-name")]
                        .into_iter()
                        .flatten()
                        .any(|v| !v.is_empty())
                });
                if !doc.has_children(id) && !named {
                    return Verdict::Remove;
                }
            }
            ElementRule::UnwrapMarkedSpan => {
                if doc.element(id).and_then(|el| el.attr("class")) == Some("Apple-style-span") {
                    return Verdict::Unwrap;
                }
            }
            ElementRule::StripAttributes(names) => {
                doc.with_element_mut(id, |el| {
                    for name in names.iter() {
                        el.remove_attr(name);
                    }
                });
            }
            ElementRule::NormalizeStyleSheet => {
                if let Some(child) = doc.first_child(id) {
                    let trimmed = doc.text(child).map(|t| t.trim().to_string());
                    if let Some(trimmed) = trimmed {
                        doc.set_text(child, trimmed);
                    }
                }
                doc.with_element_mut(id, |el| {
                    if el.attr("type").map_or(true, str::is_empty) {
                        el.set_attr("type", "text/css");
                    }
                });
            }
            ElementRule::SaveTitle => {
                let text: String = doc
                    .children(id)
                    .into_iter()
                    .filter_map(|child| doc.text(child))
                    .collect();
                doc.with_element_mut(id, |el| el.set_attr("data-cke-title", text));
            }
            ElementRule::RestoreTitle => {
                let title = doc
                    .element(id)
                    .and_then(|el| el.attr("data-cke-title"))
                    .unwrap_or_default()
                    .to_string();
                match doc.first_child(id) {
                    Some(child) if doc.text(child).is_some() => doc.set_text(child, title),
                    Some(child) => {
                        doc.insert_before(child, Node::text(title));
                    }
                    None => {
                        doc.append(id, Node::text(title));
                    }
                }
            }
            ElementRule::LockReadOnly => {
                doc.with_element_mut(id, lock_read_only);
            }
            ElementRule::UnlockReadOnly => {
                doc.with_element_mut(id, unlock_read_only);
            }
            ElementRule::Block(filter) => filter.apply(doc, id),
            ElementRule::LineBreak(filter) => filter.apply(doc, id),
        }
        Verdict::Keep
    }

    /// Renames attributes, then runs value rules keyed by the new name. An
    /// empty name or a `None` value drops the attribute.
    fn filter_attributes(&self, doc: &mut Document, id: NodeId) {
        let rules = &self.rules;
        if rules.attribute_names.is_empty() && rules.attributes.is_empty() {
            return;
        }
        doc.with_element_mut(id, |el| {
            for (name, value) in el.take_attrs() {
                let name = rewrite_name(&rules.attribute_names, &name).unwrap_or(name);
                if name.is_empty() {
                    continue;
                }
                let value = match rules.attributes.get(&name) {
                    Some(rule) => apply_attribute_rule(*rule, &value),
                    None => Some(value),
                };
                if let Some(value) = value {
                    el.set_attr(name, value);
                }
            }
        });
    }
}

fn apply_attribute_rule(rule: AttributeRule, value: &str) -> Option<String> {
    match rule {
        AttributeRule::StripClassPrefix => {
            let cleaned = CKE_CLASS_RE.replace_all(value, "");
            let cleaned = cleaned.trim_start();
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned.to_string())
            }
        }
        AttributeRule::LowercaseStyleProperties => Some(
            STYLE_PROPERTY_RE
                .replace_all(value, |caps: &Captures| caps[0].to_lowercase())
                .into_owned(),
        ),
    }
}

fn lock_read_only(el: &mut Element) {
    let current = el.attr("contenteditable").map(str::to_string);
    if current.as_deref() != Some("false") {
        let marker = if current.is_some_and(|v| !v.is_empty()) { "true" } else { "1" };
        el.set_attr("data-cke-editable", marker);
    }
    el.set_attr("contenteditable", "false");
}

fn unlock_read_only(el: &mut Element) {
    match el.attr("data-cke-editable") {
        Some("true") => el.set_attr("contenteditable", "true"),
        Some("1") => {
            el.remove_attr("contenteditable");
        }
        _ => {}
    }
}

/// Canonical table order. Recognized children are sorted by rank, ties by
/// original position, and put back into the slots recognized children held.
/// Text and unknown elements keep their exact positions.
fn reorder_table(doc: &mut Document, table: NodeId) {
    let children = doc.children(table);
    let rank = |id: NodeId| {
        doc.name(id)
            .and_then(|name| dtd::TABLE_ORDER.iter().position(|t| *t == name))
    };

    let slots: Vec<usize> = (0..children.len())
        .filter(|&i| rank(children[i]).is_some())
        .collect();
    let mut ranked: Vec<(usize, usize)> = slots
        .iter()
        .map(|&i| (rank(children[i]).unwrap_or(usize::MAX), i))
        .collect();
    ranked.sort();

    let mut order = children.clone();
    for (slot, (_, original)) in slots.iter().zip(&ranked) {
        order[*slot] = children[*original];
    }
    if order != children {
        doc.reorder_children(table, &order);
    }
}
