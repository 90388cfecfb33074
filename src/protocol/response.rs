//! Immutable request outcomes.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::protocol::error::{BuildError, ErrorKind};
use crate::protocol::value::Value;
use crate::protocol::variant::{CustomBufferKind, Variant};
use crate::uid::Uid;

/// The outcome of a request: a value payload or a typed error.
///
/// A response is created exactly once and never mutated; clones share the
/// same payload, and any number of threads may read it concurrently. Every
/// [`Variant`] obtained through [`value`](Response::value) borrows the
/// response and dies with it.
#[derive(Debug, Clone)]
pub struct Response {
    inner: Arc<Inner>,
}

#[derive(Debug)]
enum Inner {
    Value(Value),
    Error { kind: ErrorKind, description: String },
}

impl Response {
    pub fn from_value(value: Value) -> Response {
        Response {
            inner: Arc::new(Inner::Value(value)),
        }
    }

    pub fn error(kind: ErrorKind, description: impl Into<String>) -> Response {
        Response {
            inner: Arc::new(Inner::Error {
                kind,
                description: description.into(),
            }),
        }
    }

    pub fn cancelled() -> Response {
        Response::error(ErrorKind::RequestCancelled, "request cancelled")
    }

    pub fn failed(description: impl Into<String>) -> Response {
        Response::error(ErrorKind::RequestFailed, description)
    }

    pub fn invalid(description: impl Into<String>) -> Response {
        Response::error(ErrorKind::RequestInvalid, description)
    }

    pub fn interrupted() -> Response {
        Response::error(ErrorKind::ConnectionInterrupted, "connection interrupted")
    }

    pub fn is_error(&self) -> bool {
        matches!(&*self.inner, Inner::Error { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &*self.inner {
            Inner::Error { kind, .. } => Some(*kind),
            Inner::Value(_) => None,
        }
    }

    pub fn error_description(&self) -> Option<&str> {
        match &*self.inner {
            Inner::Error { description, .. } => Some(description),
            Inner::Value(_) => None,
        }
    }

    /// View over the payload. Error responses have no meaningful payload and
    /// read as a null variant.
    pub fn value(&self) -> Variant<'_> {
        match &*self.inner {
            Inner::Value(value) => Variant::from_value(value),
            Inner::Error { .. } => Variant::null(),
        }
    }

    /// Human-readable dump, for diagnostics and logging.
    pub fn describe(&self) -> String {
        match &*self.inner {
            Inner::Value(value) => Variant::from_value(value).describe(),
            Inner::Error { kind, description } => format!("error: {kind}: {description}"),
        }
    }
}

/// Builds a success payload for a response, with the same shape operations
/// as a request plus doubles and plugin custom buffers.
///
/// ```
/// use idekitd::protocol::ResponseBuilder;
/// use idekitd::uid::uid;
///
/// let mut builder = ResponseBuilder::dictionary();
/// builder.dictionary_set(uid("key.name"), "init()").unwrap();
/// let response = builder.build();
/// assert!(!response.is_error());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    root: Value,
}

impl ResponseBuilder {
    pub fn dictionary() -> ResponseBuilder {
        ResponseBuilder {
            root: Value::Dictionary(IndexMap::new()),
        }
    }

    pub fn array() -> ResponseBuilder {
        ResponseBuilder {
            root: Value::Array(Vec::new()),
        }
    }

    pub fn from_value(root: Value) -> ResponseBuilder {
        ResponseBuilder { root }
    }

    pub fn dictionary_set(&mut self, key: Uid, value: impl Into<Value>) -> Result<(), BuildError> {
        self.root.set_entry(key, value.into())
    }

    /// Tags plugin-owned bytes with a registered buffer kind; readers of the
    /// resulting variant go through the kind's accessor table.
    pub fn dictionary_set_custom_buffer(
        &mut self,
        key: Uid,
        kind: CustomBufferKind,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<(), BuildError> {
        self.root.set_entry(
            key,
            Value::Custom {
                kind,
                bytes: bytes.into(),
            },
        )
    }

    pub fn array_set(&mut self, index: usize, value: impl Into<Value>) -> Result<(), BuildError> {
        self.root.set_element(index, value.into())
    }

    pub fn array_push(&mut self, value: impl Into<Value>) -> Result<(), BuildError> {
        self.root.push_element(value.into())
    }

    /// Freezes the payload into an immutable response.
    pub fn build(self) -> Response {
        Response::from_value(self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::variant::VariantType;
    use crate::uid::uid;

    #[test]
    fn value_response_reads_back_its_payload() {
        let mut builder = ResponseBuilder::dictionary();
        builder.dictionary_set(uid("key.offset"), 10i64).unwrap();
        builder.dictionary_set(uid("key.name"), "lib.rs").unwrap();
        let response = builder.build();

        assert!(!response.is_error());
        assert_eq!(response.error_kind(), None);
        assert_eq!(response.error_description(), None);

        let view = response.value();
        assert_eq!(view.dictionary_get_int64(uid("key.offset")), 10);
        assert_eq!(view.dictionary_get_string(uid("key.name")), "lib.rs");
    }

    #[test]
    fn error_response_has_no_payload() {
        let response = Response::failed("backend exploded");

        assert!(response.is_error());
        assert_eq!(response.error_kind(), Some(ErrorKind::RequestFailed));
        assert_eq!(response.error_description(), Some("backend exploded"));
        assert_eq!(response.value().variant_type(), VariantType::Null);
    }

    #[test]
    fn cancelled_constructor_carries_the_cancelled_kind() {
        let response = Response::cancelled();
        assert_eq!(response.error_kind(), Some(ErrorKind::RequestCancelled));
    }

    #[test]
    fn clones_share_the_same_payload() {
        let response = ResponseBuilder::array().build();
        let clone = response.clone();
        assert_eq!(clone.value().variant_type(), VariantType::Array);
    }

    #[test]
    fn builder_set_double_shape() {
        let mut builder = ResponseBuilder::dictionary();
        builder.dictionary_set(uid("key.score"), 0.5f64).unwrap();
        let response = builder.build();
        assert_eq!(response.value().dictionary_get(uid("key.score")).as_double(), 0.5);
    }

    #[test]
    fn describe_mentions_error_kind() {
        let response = Response::invalid("missing key.request");
        let text = response.describe();
        assert!(text.contains("request invalid"));
        assert!(text.contains("missing key.request"));
    }
}
