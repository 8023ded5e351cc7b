// ABOUTME: Shadows URL-bearing attributes so the bridge cannot rewrite their values.
// ABOUTME: Adds data-cke-saved-* copies plus a salted live copy that is renamed back after the bridge.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ConfigError;

static ELEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(a|area|img|input|source)\b([^>]*)>").unwrap());
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(^|\s)((on\w+|href|src|name)\s*=\s*(?:"[^"]*"|'[^']*'|[^ "'>]+))"#).unwrap()
});

/// Prefix of the authoritative attribute copies.
pub const SAVED_PREFIX: &str = "data-cke-saved-";

/// Attribute shadowing for one processor. The salt keeps the temporary live
/// copies from colliding with attributes the document already has.
#[derive(Debug, Clone)]
pub struct AttributeProtector {
    salt: u32,
    salted: Regex,
}

impl AttributeProtector {
    pub fn new(salt: u32) -> Result<Self, ConfigError> {
        let pattern = format!(r"(?i)\sdata-cke-{}-", salt);
        let salted = Regex::new(&pattern).map_err(|e| ConfigError::pattern(pattern, e))?;
        Ok(Self { salt, salted })
    }

    pub fn salt(&self) -> u32 {
        self.salt
    }

    /// Rewrites `href`, `src` and `name` on `a`, `area`, `img`, `input` and
    /// `source` tags. Event handlers and already shadowed attributes are kept.
    pub fn protect(&self, html: &str) -> String {
        ELEMENT_RE
            .replace_all(html, |caps: &Captures| {
                let tag = &caps[1];
                let attributes = &caps[2];
                let lowered = attributes.to_ascii_lowercase();
                let rewritten = ATTRIBUTE_RE.replace_all(attributes, |attr: &Captures| {
                    let lead = &attr[1];
                    let full = &attr[2];
                    let name = attr[3].to_ascii_lowercase();
                    let shadowed = lowered.contains(&format!("{}{}", SAVED_PREFIX, name));
                    if name.starts_with("on") || shadowed {
                        return attr[0].to_string();
                    }
                    format!(
                        "{}{}{} data-cke-{}-{}",
                        lead, SAVED_PREFIX, full, self.salt, full
                    )
                });
                format!("<{}{}>", tag, rewritten)
            })
            .into_owned()
    }

    /// Renames the salted copies back to their live names.
    pub fn restore(&self, html: &str) -> String {
        self.salted.replace_all(html, " ").into_owned()
    }
}
