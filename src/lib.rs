//! askfile: schema-driven interactive configuration capture
//!
//! A schema describes questions as a tree of fields. The traversal engine
//! seeds a default-valued answer tree from it, then walks it depth-first,
//! evaluating skip predicates, array lengths, option sources and
//! transforms against the answers committed so far. The result is a plain
//! nested value ready to be written as YAML or JSON.

pub mod answers;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod logging;
pub mod output;
pub mod postprocess;
pub mod prompt;
pub mod schema;
pub mod source;
