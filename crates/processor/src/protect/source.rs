// ABOUTME: Reversible protection of comments, scripts and configured source patterns.
// ABOUTME: Hides them in percent-encoded comment markers, or in store placeholders inside attribute values.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ConfigError;
use crate::protect::{decode_payload, encode_payload, DataStore};

/// Prefix of every protected-source comment.
pub const PROTECTED_MARKER: &str = "{cke_protected}";

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TEMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\{cke_temp(comment)?\}(\d*)-->").unwrap());
static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static NOSCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<noscript.*?</noscript>").unwrap());
static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"\n]*"|'[^'\n]*'"#).unwrap());
static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--\{cke_protected\}(\{C\})?(.+?)-->").unwrap());
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{cke_protected_(\d+)\}").unwrap());
static REAL_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--(.+?)-->").unwrap());
static PROTECTED_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--\{cke_protected\}\{C\}(.+?)-->").unwrap());

/// Protects comments, `<script>`, `<noscript>` and any configured pattern.
#[derive(Debug, Clone)]
pub struct SourceProtector {
    patterns: Vec<Regex>,
}

impl Default for SourceProtector {
    fn default() -> Self {
        Self {
            patterns: vec![SCRIPT_RE.clone(), NOSCRIPT_RE.clone()],
        }
    }
}

impl SourceProtector {
    /// Builds a protector with extra patterns appended after the built-in ones.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self, ConfigError> {
        let mut protector = Self::default();
        for pattern in extra {
            let pattern = pattern.as_ref();
            let re = Regex::new(pattern).map_err(|e| ConfigError::pattern(pattern, e))?;
            protector.patterns.push(re);
        }
        Ok(protector)
    }

    /// Escapes every protected construct. Markers already produced by an
    /// earlier pass are left untouched, so protecting twice changes nothing.
    pub fn protect(&self, data: &str, store: &mut DataStore) -> String {
        let mut temp: Vec<String> = Vec::new();

        // Comments go first so later patterns never see their content as markup.
        let mut data = COMMENT_RE
            .replace_all(data, |caps: &Captures| {
                let matched = &caps[0];
                if matched.contains("{cke_protected") {
                    return matched.to_string();
                }
                temp.push(matched.to_string());
                format!("<!--{{cke_tempcomment}}{}-->", temp.len() - 1)
            })
            .into_owned();

        for re in &self.patterns {
            data = re
                .replace_all(&data, |caps: &Captures| {
                    // A match may enclose comments protected above.
                    let restored = restore_temp(&caps[0], &temp);
                    if restored.contains("cke_temp") || restored.contains("{cke_protected") {
                        return caps[0].to_string();
                    }
                    temp.push(restored);
                    format!("<!--{{cke_temp}}{}-->", temp.len() - 1)
                })
                .into_owned();
        }

        data = TEMP_RE
            .replace_all(&data, |caps: &Captures| {
                let raw = caps[2].parse::<usize>().ok().and_then(|i| temp.get(i));
                match raw {
                    Some(raw) => {
                        let kind = if caps.get(1).is_some() { "{C}" } else { "" };
                        format!("<!--{}{}{}-->", PROTECTED_MARKER, kind, encode_payload(raw))
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned();

        // A comment marker is not allowed inside an attribute value; park the
        // original text in the store and leave a placeholder instead.
        QUOTED_RE
            .replace_all(&data, |caps: &Captures| {
                MARKER_RE
                    .replace_all(&caps[0], |marker: &Captures| {
                        let id = store.insert(decode_payload(&marker[2]));
                        format!("{{cke_protected_{}}}", id)
                    })
                    .into_owned()
            })
            .into_owned()
    }

    /// Decodes every marker and resolves store placeholders. Placeholders
    /// with unknown ids are left as they are.
    pub fn unprotect(&self, html: &str, store: &DataStore) -> String {
        let html = MARKER_RE.replace_all(html, |caps: &Captures| decode_payload(&caps[2]));
        PLACEHOLDER_RE
            .replace_all(&html, |caps: &Captures| {
                match caps[1].parse::<u32>().ok().and_then(|id| store.get(id)) {
                    Some(original) => original.to_string(),
                    None => {
                        tracing::warn!(
                            placeholder = &caps[0],
                            "Unknown protected placeholder kept"
                        );
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

fn restore_temp(text: &str, temp: &[String]) -> String {
    TEMP_RE
        .replace_all(text, |caps: &Captures| {
            caps[2]
                .parse::<usize>()
                .ok()
                .and_then(|i| temp.get(i))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Wraps every plain comment into a `{C}` marker.
pub fn protect_real_comments(html: &str) -> String {
    REAL_COMMENT_RE
        .replace_all(html, |caps: &Captures| {
            if caps[1].starts_with(PROTECTED_MARKER) {
                return caps[0].to_string();
            }
            format!("<!--{}{{C}}{}-->", PROTECTED_MARKER, encode_payload(&caps[0]))
        })
        .into_owned()
}

/// Turns `{C}` markers back into plain comments; other markers stay.
pub fn unprotect_real_comments(html: &str) -> String {
    PROTECTED_COMMENT_RE
        .replace_all(html, |caps: &Captures| decode_payload(&caps[1]))
        .into_owned()
}
