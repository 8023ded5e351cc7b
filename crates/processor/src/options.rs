// ABOUTME: Configuration for the data processor: Config, Capabilities, per-call options and the builder.
// ABOUTME: ProcessorBuilder offers a fluent API; ConfigFile loads the serializable subset from JSON.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dom::{Element, Html5Bridge, Html5Parser, MarkupBridge, TreeParser};
use crate::error::{validate_tag_name, ConfigError};
use crate::processor::DataProcessor;

/// Which blocks receive a filler when empty.
#[derive(Clone, Default)]
pub enum FillEmptyBlocks {
    #[default]
    Always,
    Never,
    /// Asked per block; `false` suppresses the filler.
    Predicate(Arc<dyn Fn(&Element) -> bool + Send + Sync>),
}

impl FillEmptyBlocks {
    pub fn predicate(f: impl Fn(&Element) -> bool + Send + Sync + 'static) -> Self {
        FillEmptyBlocks::Predicate(Arc::new(f))
    }

    pub fn allows(&self, element: &Element) -> bool {
        match self {
            FillEmptyBlocks::Always => true,
            FillEmptyBlocks::Never => false,
            FillEmptyBlocks::Predicate(f) => f(element),
        }
    }
}

impl From<bool> for FillEmptyBlocks {
    fn from(fill: bool) -> Self {
        if fill {
            FillEmptyBlocks::Always
        } else {
            FillEmptyBlocks::Never
        }
    }
}

impl fmt::Debug for FillEmptyBlocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillEmptyBlocks::Always => write!(f, "Always"),
            FillEmptyBlocks::Never => write!(f, "Never"),
            FillEmptyBlocks::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// What pressing Enter produces, and so which tag wraps bare inline content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnterMode {
    #[default]
    P,
    Div,
    Br,
}

impl fmt::Display for EnterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnterMode::P => "p",
            EnterMode::Div => "div",
            EnterMode::Br => "br",
        };
        write!(f, "{}", s)
    }
}

/// Quirks of the rendering surface the editable markup is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Empty blocks and trailing breaks need a `<br>` filler to get height.
    pub needs_br_filler: bool,
    /// Editable fillers are `&nbsp;` rather than marked `<br>` elements.
    pub needs_nbsp_filler: bool,
    /// Every empty editable block gets a filler, whatever the fill policy.
    pub mandatory_editing_filler: bool,
    /// Empty blocks render with height on their own.
    pub native_empty_blocks: bool,
    /// Inline style property names come back upper-cased.
    pub uppercase_style_properties: bool,
    /// Formatting is lost when markup is loaded into a `pre`.
    pub loses_pre_formatting: bool,
    /// The newline after `<pre>` is not swallowed.
    pub keeps_pre_leading_newline: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            needs_br_filler: true,
            needs_nbsp_filler: false,
            mandatory_editing_filler: false,
            native_empty_blocks: false,
            uppercase_style_properties: false,
            loses_pre_formatting: false,
            keeps_pre_leading_newline: false,
        }
    }
}

/// Editor-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tag of the editing surface, used as the default parse context.
    pub editable_tag: String,
    pub fill_empty_blocks: FillEmptyBlocks,
    /// Extra regular expressions whose matches survive round trips verbatim.
    pub protected_source: Vec<String>,
    pub enter_mode: EnterMode,
    pub auto_paragraph: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editable_tag: "body".to_string(),
            fill_empty_blocks: FillEmptyBlocks::Always,
            protected_source: Vec::new(),
            enter_mode: EnterMode::P,
            auto_paragraph: true,
        }
    }
}

impl Config {
    /// Tag used to wrap bare inline content, if any.
    pub fn fix_body_tag(&self) -> Option<&'static str> {
        if !self.auto_paragraph {
            return None;
        }
        match self.enter_mode {
            EnterMode::P => Some("p"),
            EnterMode::Div => Some("div"),
            EnterMode::Br => None,
        }
    }
}

/// Container the inbound markup is parsed into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Context {
    /// The editing surface's own tag.
    #[default]
    Editable,
    /// No container.
    None,
    Element(String),
}

impl Context {
    pub fn element(tag: impl Into<String>) -> Result<Self, ConfigError> {
        let tag = tag.into().to_ascii_lowercase();
        validate_tag_name(&tag)?;
        Ok(Context::Element(tag))
    }
}

/// Per-call options of the inbound transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableOptions {
    pub context: Context,
    /// Wrap bare inline content according to the enter mode.
    pub fix_for_body: bool,
}

impl Default for EditableOptions {
    fn default() -> Self {
        Self {
            context: Context::Editable,
            fix_for_body: true,
        }
    }
}

impl EditableOptions {
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn fix_for_body(mut self, fix: bool) -> Self {
        self.fix_for_body = fix;
        self
    }
}

/// Builder for constructing DataProcessor instances.
#[derive(Debug, Clone, Default)]
pub struct ProcessorBuilder {
    config: Config,
    caps: Capabilities,
    salt: Option<u32>,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editable_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.editable_tag = tag.into().to_ascii_lowercase();
        self
    }

    pub fn fill_empty_blocks(mut self, fill: impl Into<FillEmptyBlocks>) -> Self {
        self.config.fill_empty_blocks = fill.into();
        self
    }

    /// Adds one protected-source pattern.
    pub fn protected_source(mut self, pattern: impl Into<String>) -> Self {
        self.config.protected_source.push(pattern.into());
        self
    }

    pub fn enter_mode(mut self, mode: EnterMode) -> Self {
        self.config.enter_mode = mode;
        self
    }

    pub fn auto_paragraph(mut self, enabled: bool) -> Self {
        self.config.auto_paragraph = enabled;
        self
    }

    pub fn capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Fixes the attribute-protection salt. Random (100..1000) otherwise.
    pub fn salt(mut self, salt: u32) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Builds a processor with the html5ever parser and bridge.
    pub fn build(self) -> Result<DataProcessor, ConfigError> {
        self.build_with(Html5Parser, Html5Bridge)
    }

    /// Builds a processor with custom collaborators.
    pub fn build_with<P: TreeParser, B: MarkupBridge>(
        self,
        parser: P,
        bridge: B,
    ) -> Result<DataProcessor<P, B>, ConfigError> {
        validate_tag_name(&self.config.editable_tag)?;
        let salt = self
            .salt
            .unwrap_or_else(|| rand::rng().random_range(100..1000));
        DataProcessor::from_parts(self.config, self.caps, salt, parser, bridge)
    }
}

/// Serializable subset of the configuration, as read by the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub editable_tag: Option<String>,
    pub fill_empty_blocks: Option<bool>,
    pub protected_source: Vec<String>,
    pub enter_mode: Option<EnterMode>,
    pub auto_paragraph: Option<bool>,
    pub capabilities: Option<Capabilities>,
    pub salt: Option<u32>,
}

impl ConfigFile {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_builder(self) -> ProcessorBuilder {
        let mut builder = ProcessorBuilder::new();
        if let Some(tag) = self.editable_tag {
            builder = builder.editable_tag(tag);
        }
        if let Some(fill) = self.fill_empty_blocks {
            builder = builder.fill_empty_blocks(fill);
        }
        for pattern in self.protected_source {
            builder = builder.protected_source(pattern);
        }
        if let Some(mode) = self.enter_mode {
            builder = builder.enter_mode(mode);
        }
        if let Some(enabled) = self.auto_paragraph {
            builder = builder.auto_paragraph(enabled);
        }
        if let Some(caps) = self.capabilities {
            builder = builder.capabilities(caps);
        }
        if let Some(salt) = self.salt {
            builder = builder.salt(salt);
        }
        builder
    }
}
