// ABOUTME: Main library entry point for the htmldp HTML data processor.
// ABOUTME: Re-exports the public API: DataProcessor, ProcessorBuilder, options, ConfigError and the tree types.

//! htmldp - converts untrusted markup into editable markup and back.
//!
//! The inbound transform protects constructs a parse/serialize round trip
//! would lose (comments, scripts, URL attributes, structural tags), repairs
//! the markup through a [`MarkupBridge`], parses it into a [`Document`] and
//! filters it for editing. The outbound transform filters the edited tree
//! into storage markup and restores everything that was protected.
//!
//! # Example
//!
//! ```
//! use htmldp_processor::{ConfigError, DataProcessor, EditableOptions};
//!
//! fn main() -> Result<(), ConfigError> {
//!     let mut processor = DataProcessor::builder().build()?;
//!     let editable = processor.to_editable_form(
//!         "<p>Hi<!-- draft --></p>",
//!         &EditableOptions::default(),
//!     );
//!     let stored = processor.to_storage_form(&editable);
//!     assert_eq!(stored, "<p>Hi<!-- draft --></p>");
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod filter;
pub mod options;
pub mod processor;
pub mod protect;

pub use crate::dom::{Document, Element, Html5Bridge, Html5Parser, MarkupBridge, Node, TreeParser};
pub use crate::error::ConfigError;
pub use crate::filter::{Filter, RuleSet};
pub use crate::options::{
    Capabilities, Config, ConfigFile, Context, EditableOptions, EnterMode, FillEmptyBlocks,
    ProcessorBuilder,
};
pub use crate::processor::DataProcessor;
pub use crate::protect::DataStore;
