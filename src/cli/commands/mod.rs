//! CLI command implementations

pub mod completions;
pub mod generate;
pub mod parse;
pub mod prompt;
pub mod schema;
