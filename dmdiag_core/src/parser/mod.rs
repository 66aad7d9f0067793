//! Parsers for semi-structured raw source text

pub mod join_text;

pub use join_text::JoinTextParser;
