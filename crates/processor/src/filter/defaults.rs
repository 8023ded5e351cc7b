// ABOUTME: Default rule tables for the inbound (editable) and outbound (storage) directions.
// ABOUTME: Filler rules are merged in separately by the processor, after these tables.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::filter::rules::{AttributeRule, ElementRule, NameRule, RuleSet};
use crate::options::Capabilities;

static EVENT_ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^on").unwrap());
static PRIVATE_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^cke:").unwrap());
static XML_NAMESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\?xml:namespace$").unwrap());
static SHADOW_ATTRIBUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data-cke-(saved|pa)-").unwrap());
static INTERNAL_ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^data-cke-.*").unwrap());
static HIDEFOCUS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^hidefocus$").unwrap());

/// Rules applied while loading markup into the editor.
pub fn data_filter_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    // Event handlers must not run inside the editing surface.
    rules
        .attribute_names
        .push(NameRule::new(EVENT_ATTRIBUTE_RE.clone(), "data-cke-pa-on"));
    for tag in ["input", "textarea"] {
        rules.add_element_rule(tag, ElementRule::LockReadOnly);
    }
    rules.add_element_rule("title", ElementRule::SaveTitle);
    rules
}

/// Rules applied while producing storage markup.
pub fn html_filter_rules(caps: Capabilities) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.element_names = vec![
        NameRule::new(PRIVATE_ELEMENT_RE.clone(), ""),
        NameRule::new(XML_NAMESPACE_RE.clone(), ""),
    ];
    rules.attribute_names = vec![
        NameRule::new(SHADOW_ATTRIBUTE_RE.clone(), ""),
        NameRule::new(INTERNAL_ATTRIBUTE_RE.clone(), ""),
        NameRule::new(HIDEFOCUS_RE.clone(), ""),
    ];
    rules.wildcard = vec![
        ElementRule::DropTemporary,
        ElementRule::DropShadowedAttributes,
    ];

    rules.add_element_rule("table", ElementRule::ReorderTable);
    rules.add_element_rule("embed", ElementRule::InheritObjectSize);
    rules.add_element_rule("param", ElementRule::ForceEmpty);
    rules.add_element_rule("a", ElementRule::RemoveEmptyAnchor);
    rules.add_element_rule("span", ElementRule::UnwrapMarkedSpan);
    rules.add_element_rule(
        "html",
        ElementRule::StripAttributes(&["contenteditable", "class"]),
    );
    rules.add_element_rule(
        "body",
        ElementRule::StripAttributes(&["spellcheck", "contenteditable"]),
    );
    rules.add_element_rule("style", ElementRule::NormalizeStyleSheet);
    rules.add_element_rule("title", ElementRule::RestoreTitle);
    for tag in ["input", "textarea"] {
        rules.add_element_rule(tag, ElementRule::UnlockReadOnly);
    }

    rules
        .attributes
        .insert("class".to_string(), AttributeRule::StripClassPrefix);
    if caps.uppercase_style_properties {
        rules
            .attributes
            .insert("style".to_string(), AttributeRule::LowercaseStyleProperties);
    }
    rules
}
