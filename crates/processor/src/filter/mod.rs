// ABOUTME: Declarative tree filtering: rule tables, the engine that interprets them, and the default tables.
// ABOUTME: Also hosts the bogus/filler normalizer, which plugs into the engine as block and line-break rules.

pub mod bogus;
pub mod defaults;
pub mod engine;
pub mod rules;

pub use bogus::{bogus_and_filler_rules, BlockFilter, FillerContext, LineBreakFilter};
pub use defaults::{data_filter_rules, html_filter_rules};
pub use engine::Filter;
pub use rules::{AttributeRule, ElementRule, NameRule, RuleSet, Verdict};
