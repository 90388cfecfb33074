//! Well-known dictionary keys of the completion overlay.
//!
//! Keys are ordinary interned identifiers; the functions here just fix the
//! spelling in one place. Interning is idempotent, so repeated calls return
//! the identical [`Uid`].

use crate::uid::{Uid, uid};

macro_rules! keys {
    ($($(#[$meta:meta])* $name:ident => $spelling:literal;)+) => {
        $(
            $(#[$meta])*
            pub fn $name() -> Uid {
                uid($spelling)
            }
        )+
    };
}

keys! {
    /// Item kind, a [`CompletionItemKind`](super::CompletionItemKind)
    /// discriminant.
    kind => "key.kind";
    /// Filter text of the item.
    name => "key.name";
    /// Display string of the item.
    description => "key.description";
    /// Text to insert when the item is accepted.
    sourcetext => "key.sourcetext";
    /// Display string of the item's type.
    typename => "key.typename";
    /// Brief documentation, when available.
    doc_brief => "key.doc.brief";
    /// A [`SemanticContext`](super::SemanticContext) discriminant.
    semantic_context => "key.semantic_context";
    /// A [`Flair`](super::Flair) bitmask.
    flair => "key.flair";
    /// A [`TypeRelation`](super::TypeRelation) discriminant.
    type_relation => "key.typerelation";
    /// Present and true when the item should be demoted.
    not_recommended => "key.not_recommended";
    /// A [`NotRecommendedReason`](super::NotRecommendedReason)
    /// discriminant.
    not_recommended_reason => "key.not_recommended_reason";
    /// Name of the module the item is declared in.
    module_name => "key.modulename";
    /// Present and true for items from system modules.
    is_system => "key.is_system";
    /// Bytes before the request position to erase before inserting.
    num_bytes_to_erase => "key.num_bytes_to_erase";
    /// Array of completion item dictionaries in a completion response.
    results => "key.results";
    /// Result count before filtering was applied.
    unfiltered_result_count => "key.unfiltered_result_count";
}
