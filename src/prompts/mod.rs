//! Analysis prompts.
//!
//! Structure:
//! - `templates`: per-tier instruction text
//! - `catalog`: tier -> template, response shape, token budget

pub mod catalog;
pub mod templates;

pub use catalog::{PromptCatalog, PromptSpec};
pub use templates::{USER_POSTAMBLE, USER_PREAMBLE};
