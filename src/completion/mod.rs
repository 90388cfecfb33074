//! Code-completion overlay on top of the tagged-value protocol.
//!
//! Nothing here changes the wire shape; completion payloads are ordinary
//! dictionaries and arrays. This module fixes the conventions: the closed
//! enumerations, the well-known dictionary keys, a typed item reader, and
//! the fuzzy-match scoring contract.

pub mod fuzzy;
pub mod item;
pub mod keys;
pub mod kinds;

pub use fuzzy::FuzzyMatchPattern;
pub use item::CompletionItemView;
pub use kinds::{
    CompletionItemDeclKind, CompletionItemKind, CompletionKind, DiagnosticSeverity, Flair,
    NotRecommendedReason, SemanticContext, TypeRelation,
};
