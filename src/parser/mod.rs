//! Parser layer
//! - yaml.rs: YAML text to request value tree, via tree-sitter

pub mod yaml;

use thiserror::Error;

/// Failure while parsing YAML request text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Failed to set YAML language for tree-sitter: {0}")]
    TreeSitter(String),

    #[error("Failed to parse YAML: {0}")]
    ParseFailed(String),

    #[error("Unsupported YAML construct: {0}")]
    Unsupported(String),
}
