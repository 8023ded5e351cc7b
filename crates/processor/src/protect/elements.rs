// ABOUTME: Element-level protection for tags the bridge drops, renames or mangles.
// ABOUTME: Encodes style/link/meta/base, prefixes structural tags with cke:, opens self-closed params.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::protect::{decode_payload, encode_payload};

static PROTECT_ELEMENTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style(?: [^>]*)?>.*?</style>|<(?:link|meta|base)\b[^>]*>").unwrap()
});
static ENCODED_ELEMENTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<cke:encoded>([^<]*)</cke:encoded>").unwrap());
static PROTECT_NAMES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(</?)((?:object|embed|param|html|body|head|title)\b[^>]*>)").unwrap()
});
static UNPROTECT_NAMES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(</?)cke:((?:html|body|head|title)\b[^>]*>)").unwrap());
static SELF_CLOSING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<cke:(param|embed)([^>]*?)/?>").unwrap());
static PRE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(<pre\b[^>]*>)(\r\n|\n)").unwrap());

/// Hides `<style>` blocks and `<link>`, `<meta>`, `<base>` tags from the
/// bridge inside `<cke:encoded>` elements.
pub fn protect_elements(html: &str) -> String {
    PROTECT_ELEMENTS_RE
        .replace_all(html, |caps: &Captures| {
            format!("<cke:encoded>{}</cke:encoded>", encode_payload(&caps[0]))
        })
        .into_owned()
}

pub fn unprotect_elements(html: &str) -> String {
    ENCODED_ELEMENTS_RE
        .replace_all(html, |caps: &Captures| decode_payload(&caps[1]))
        .into_owned()
}

/// Prefixes `object`, `embed`, `param`, `html`, `body`, `head` and `title`
/// tags with `cke:`.
pub fn protect_element_names(html: &str) -> String {
    PROTECT_NAMES_RE.replace_all(html, "${1}cke:${2}").into_owned()
}

/// Drops the prefix from `html`, `body`, `head` and `title` only. Objects,
/// embeds and params keep it until the outbound filter.
pub fn unprotect_element_names(html: &str) -> String {
    UNPROTECT_NAMES_RE.replace_all(html, "${1}${2}").into_owned()
}

/// Rewrites `<cke:param .../>` and `<cke:embed .../>` that are not followed
/// by their end tag into explicit open/close pairs.
pub fn protect_self_closing(html: &str) -> String {
    SELF_CLOSING_RE
        .replace_all(html, |caps: &Captures| {
            let name = &caps[1];
            let end = caps.get(0).map_or(html.len(), |m| m.end());
            let rest = html[end..].trim_start().as_bytes();
            let closing = format!("</cke:{}", name);
            let closed = rest.len() >= closing.len()
                && rest[..closing.len()].eq_ignore_ascii_case(closing.as_bytes());
            if closed {
                caps[0].to_string()
            } else {
                format!("<cke:{}{}></cke:{}>", name, &caps[2], name)
            }
        })
        .into_owned()
}

/// Doubles the newline right after a `<pre>` start tag; parsers swallow one.
pub fn protect_pre_formatted(html: &str) -> String {
    PRE_RE.replace_all(html, "${1}${2}${2}").into_owned()
}
