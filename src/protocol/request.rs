//! Mutable, buildable request trees.

use indexmap::IndexMap;

use crate::parser::yaml;
use crate::parser::ParseError;
use crate::protocol::error::BuildError;
use crate::protocol::value::Value;
use crate::protocol::variant::Variant;
use crate::uid::Uid;

/// A request under construction, mirroring the variant shape
/// (dictionary/array/scalar/string/uid).
///
/// Building is append-only: a dictionary key may be overwritten, but
/// container arity only grows (through [`array_push`]); [`array_set`] on an
/// index beyond the current length is an error and leaves the array
/// unchanged.
///
/// A request is exclusively owned by its builder until submission. The
/// dispatcher shares submitted requests behind an `Arc`, so the ownership
/// transfer at the submission boundary is scope-guarded rather than manually
/// counted.
///
/// [`array_push`]: Request::array_push
/// [`array_set`]: Request::array_set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Request {
    root: Value,
}

impl Request {
    pub fn dictionary<V: Into<Value>>(pairs: impl IntoIterator<Item = (Uid, V)>) -> Request {
        let entries: IndexMap<Uid, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key, value.into()))
            .collect();
        Request {
            root: Value::Dictionary(entries),
        }
    }

    pub fn empty_dictionary() -> Request {
        Request {
            root: Value::Dictionary(IndexMap::new()),
        }
    }

    pub fn array<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Request {
        Request {
            root: Value::Array(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn empty_array() -> Request {
        Request {
            root: Value::Array(Vec::new()),
        }
    }

    pub fn int64(value: i64) -> Request {
        Request {
            root: Value::Int64(value),
        }
    }

    pub fn boolean(value: bool) -> Request {
        Request {
            root: Value::Bool(value),
        }
    }

    pub fn string(value: impl Into<String>) -> Request {
        Request {
            root: Value::String(value.into()),
        }
    }

    pub fn uid_value(value: Uid) -> Request {
        Request {
            root: Value::Uid(value),
        }
    }

    /// Builds a request from YAML text, for diagnostic and scripting use.
    /// Malformed input fails with a [`ParseError`]; no partially-constructed
    /// tree is ever returned as success.
    pub fn from_yaml(text: &str) -> Result<Request, ParseError> {
        yaml::parse_value(text).map(|root| Request { root })
    }

    /// Sets `key`, overwriting any previous value for it.
    pub fn dictionary_set(&mut self, key: Uid, value: impl Into<Value>) -> Result<(), BuildError> {
        self.root.set_entry(key, value.into())
    }

    /// Replaces the element at `index`; out-of-range writes fail without
    /// changing the array.
    pub fn array_set(&mut self, index: usize, value: impl Into<Value>) -> Result<(), BuildError> {
        self.root.set_element(index, value.into())
    }

    /// Appends an element, growing the array.
    pub fn array_push(&mut self, value: impl Into<Value>) -> Result<(), BuildError> {
        self.root.push_element(value.into())
    }

    /// Read-only view over the request tree, valid while the request is
    /// alive. This is how a handler inspects a submitted request.
    pub fn view(&self) -> Variant<'_> {
        Variant::from_value(&self.root)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Human-readable dump, for diagnostics and logging.
    pub fn describe(&self) -> String {
        self.view().describe()
    }
}

impl From<Request> for Value {
    fn from(request: Request) -> Value {
        request.root
    }
}
