// ABOUTME: String-level reversible escaping applied around the parse/serialize round trip.
// ABOUTME: Holds the session placeholder store and the payload percent-encoding shared by all protectors.

//! Source protection.
//!
//! Every protector here works on raw markup strings, before the bridge and
//! parser see them, and each has an exact inverse applied on the way out.
//! Payloads travel percent-encoded inside comment-shaped markers so a generic
//! serializer leaves them alone.

pub mod attributes;
pub mod elements;
pub mod source;

use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub use attributes::AttributeProtector;
pub use elements::{
    protect_element_names, protect_elements, protect_pre_formatted, protect_self_closing,
    unprotect_element_names, unprotect_elements,
};
pub use source::{protect_real_comments, unprotect_real_comments, SourceProtector};

/// Characters left as-is when encoding a payload. The apostrophe is encoded
/// so payloads never close a single-quoted attribute value.
const PAYLOAD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a payload and escapes `--` so it can sit inside a comment.
pub(crate) fn encode_payload(raw: &str) -> String {
    utf8_percent_encode(raw, PAYLOAD_ENCODE_SET)
        .to_string()
        .replace("--", "%2D%2D")
}

/// Decodes a payload. Invalid UTF-8 falls back to lossy decoding.
pub(crate) fn decode_payload(encoded: &str) -> String {
    match percent_decode_str(encoded).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Protected payload is not valid UTF-8");
            percent_decode_str(encoded).decode_utf8_lossy().into_owned()
        }
    }
}

/// Session-scoped placeholder store: id to original text.
///
/// Ids start at 1, are never reused and entries are never dropped, so a
/// placeholder handed out on one inbound pass resolves on any later outbound
/// pass of the same session.
#[derive(Debug, Clone)]
pub struct DataStore {
    next_id: u32,
    entries: HashMap<u32, String>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: HashMap::new(),
        }
    }

    /// Stores `text` and returns its id.
    pub fn insert(&mut self, text: String) -> u32 {
        let id = self.next_id;
        self.entries.insert(id, text);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
