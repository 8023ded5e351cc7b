// ABOUTME: Error types raised while assembling a data processor.
// ABOUTME: Transforms never fail; only configuration (patterns, tag names, config files) can.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while building a processor from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A protected-source pattern is not a valid regular expression.
    #[error("invalid protected source pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A tag name (editable or context) is empty or malformed.
    #[error("invalid tag name {0:?}")]
    InvalidTagName(String),

    /// A configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates an InvalidPattern error from a regex compilation failure.
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        ConfigError::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates an InvalidTagName error.
    pub fn tag_name(name: impl fmt::Display) -> Self {
        ConfigError::InvalidTagName(name.to_string())
    }

    /// Returns true if this error came from a bad protected-source pattern.
    pub fn is_pattern(&self) -> bool {
        matches!(self, ConfigError::InvalidPattern { .. })
    }

    /// Returns true if this error came from a bad tag name.
    pub fn is_tag_name(&self) -> bool {
        matches!(self, ConfigError::InvalidTagName(_))
    }
}

/// Validates an element name used as editable or context tag.
pub(crate) fn validate_tag_name(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::tag_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag_name() {
        assert!(validate_tag_name("body").is_ok());
        assert!(validate_tag_name("h1").is_ok());
        assert!(validate_tag_name("cke:param").is_ok());
        assert!(validate_tag_name("").unwrap_err().is_tag_name());
        assert!(validate_tag_name("1p").is_err());
        assert!(validate_tag_name("div class").is_err());
    }

    #[test]
    fn test_pattern_error_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigError::pattern("(", source);
        assert!(err.is_pattern());
        assert!(err.to_string().starts_with("invalid protected source pattern \"(\""));
    }
}
