//! Typed reader over a completion item dictionary.

use crate::completion::keys;
use crate::completion::kinds::{
    CompletionItemKind, Flair, NotRecommendedReason, SemanticContext, TypeRelation,
};
use crate::protocol::Variant;

/// Read-only view of one completion item.
///
/// Items arrive as untyped dictionaries, possibly produced by a plugin the
/// host doesn't control. Every accessor tolerates missing or mistyped
/// fields the same way [`Variant`] does: strings default to empty, numbers
/// to zero, enumerations to `None` when the discriminant is unknown.
#[derive(Clone, Copy)]
pub struct CompletionItemView<'a> {
    dict: Variant<'a>,
}

impl<'a> CompletionItemView<'a> {
    pub fn new(dict: Variant<'a>) -> Self {
        Self { dict }
    }

    pub fn name(&self) -> &'a str {
        self.dict.dictionary_get_string(keys::name())
    }

    pub fn description(&self) -> &'a str {
        self.dict.dictionary_get_string(keys::description())
    }

    pub fn sourcetext(&self) -> &'a str {
        self.dict.dictionary_get_string(keys::sourcetext())
    }

    pub fn typename(&self) -> &'a str {
        self.dict.dictionary_get_string(keys::typename())
    }

    pub fn doc_brief(&self) -> &'a str {
        self.dict.dictionary_get_string(keys::doc_brief())
    }

    pub fn module_name(&self) -> &'a str {
        self.dict.dictionary_get_string(keys::module_name())
    }

    pub fn kind(&self) -> Option<CompletionItemKind> {
        CompletionItemKind::from_u32(self.discriminant(keys::kind())?)
    }

    pub fn semantic_context(&self) -> Option<SemanticContext> {
        SemanticContext::from_u32(self.discriminant(keys::semantic_context())?)
    }

    pub fn type_relation(&self) -> Option<TypeRelation> {
        TypeRelation::from_u32(self.discriminant(keys::type_relation())?)
    }

    pub fn flair(&self) -> Flair {
        let raw = self.dict.dictionary_get_int64(keys::flair());
        Flair::from_bits(u32::try_from(raw).unwrap_or(0))
    }

    pub fn is_not_recommended(&self) -> bool {
        self.dict.dictionary_get_bool(keys::not_recommended())
    }

    pub fn not_recommended_reason(&self) -> Option<NotRecommendedReason> {
        if !self.is_not_recommended() {
            return None;
        }
        NotRecommendedReason::from_u32(self.discriminant(keys::not_recommended_reason())?)
    }

    pub fn is_system(&self) -> bool {
        self.dict.dictionary_get_bool(keys::is_system())
    }

    pub fn num_bytes_to_erase(&self) -> i64 {
        self.dict.dictionary_get_int64(keys::num_bytes_to_erase())
    }

    fn discriminant(&self, key: crate::uid::Uid) -> Option<u32> {
        u32::try_from(self.dict.dictionary_get_int64(key)).ok()
    }
}
