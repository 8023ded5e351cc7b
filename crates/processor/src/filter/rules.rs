// ABOUTME: Declarative rule tables applied by the filter engine.
// ABOUTME: Name rewrites plus closed enums of element and attribute actions, keyed by tag or attribute.

use std::collections::HashMap;

use regex::Regex;

use crate::filter::bogus::{BlockFilter, LineBreakFilter};

/// Pattern-to-replacement rename. An empty result drops the attribute, or
/// unwraps the element (its children take its place).
#[derive(Debug, Clone)]
pub struct NameRule {
    pub pattern: Regex,
    pub replacement: &'static str,
}

impl NameRule {
    pub fn new(pattern: Regex, replacement: &'static str) -> Self {
        Self {
            pattern,
            replacement,
        }
    }
}

/// First matching rule wins. None when no rule matches.
pub(crate) fn rewrite_name(rules: &[NameRule], name: &str) -> Option<String> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(name))
        .map(|rule| rule.pattern.replace(name, rule.replacement).into_owned())
}

/// What the engine does with an element after a rule ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// Detach the element and its subtree.
    Remove,
    /// Replace the element by its children.
    Unwrap,
}

/// Element actions. The engine interprets each variant in one place.
#[derive(Debug, Clone)]
pub enum ElementRule {
    /// Remove elements carrying `data-cke-temp`.
    DropTemporary,
    /// Drop live `name`/`href`/`src` when a `data-cke-saved-*` copy exists.
    DropShadowedAttributes,
    /// Sort table children into caption, colgroup, col, thead, tfoot, tbody.
    ReorderTable,
    /// An `embed` inside an `object` takes the object's width and height.
    InheritObjectSize,
    /// Drop children and write as `<name />`.
    ForceEmpty,
    /// Remove an anchor with no children and no name.
    RemoveEmptyAnchor,
    /// Unwrap a span whose class is exactly `Apple-style-span`.
    UnwrapMarkedSpan,
    StripAttributes(&'static [&'static str]),
    /// Trim the stylesheet text and default `type` to `text/css`.
    NormalizeStyleSheet,
    /// Record the title text in `data-cke-title`.
    SaveTitle,
    /// Set the title text from `data-cke-title`.
    RestoreTitle,
    /// Make a form control non-editable, remembering its prior state.
    LockReadOnly,
    /// Undo `LockReadOnly`.
    UnlockReadOnly,
    Block(BlockFilter),
    LineBreak(LineBreakFilter),
}

impl ElementRule {
    /// Block rules see the element only after its children were filtered.
    pub fn runs_after_children(&self) -> bool {
        matches!(self, ElementRule::Block(_))
    }
}

/// Attribute value actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeRule {
    /// Remove `cke_*` class names; drop the attribute when nothing is left.
    StripClassPrefix,
    /// Lower-case inline style property names, leaving values alone.
    LowercaseStyleProperties,
}

/// A complete rule table for one direction.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub element_names: Vec<NameRule>,
    pub attribute_names: Vec<NameRule>,
    /// Applied to every element before its tag rules.
    pub wildcard: Vec<ElementRule>,
    pub elements: HashMap<String, Vec<ElementRule>>,
    /// Applied once to the document root.
    pub root: Vec<ElementRule>,
    pub attributes: HashMap<String, AttributeRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule for `tag` after any existing ones.
    pub fn add_element_rule(&mut self, tag: &str, rule: ElementRule) {
        self.elements.entry(tag.to_string()).or_default().push(rule);
    }

    /// Merges `other` into this set. Its rules run after the existing ones;
    /// attribute rules from `other` replace existing ones.
    pub fn merge(&mut self, other: RuleSet) {
        self.element_names.extend(other.element_names);
        self.attribute_names.extend(other.attribute_names);
        self.wildcard.extend(other.wildcard);
        for (tag, rules) in other.elements {
            self.elements.entry(tag).or_default().extend(rules);
        }
        self.root.extend(other.root);
        self.attributes.extend(other.attributes);
    }

    pub fn element_rules(&self, tag: &str) -> &[ElementRule] {
        self.elements.get(tag).map(Vec::as_slice).unwrap_or_default()
    }
}
