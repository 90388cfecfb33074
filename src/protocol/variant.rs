//! Read-only tagged value views.
//!
//! A [`Variant`] never owns its backing storage: it borrows from the
//! [`Response`](super::Response) or [`Request`](super::Request) it came
//! from, or from a plugin-owned buffer. Accessors inconsistent with the
//! actual tag return a well-defined zero/empty value instead of failing,
//! because variant data may originate from a plugin the reader does not
//! fully trust.
//!
//! Every operation on a custom-tagged value forwards through the accessor
//! table registered for its buffer kind, which is how plugins expose their
//! own data layouts through the common interface without a copy.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::protocol::value::Value;
use crate::uid::Uid;

/// Tag of a variant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariantType {
    Null,
    Dictionary,
    Array,
    Int64,
    String,
    Uid,
    Bool,
    /// Reserved: representable, produced only by response builders.
    Double,
    Data,
}

/// Identifies a plugin-registered accessor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomBufferKind(u64);

impl CustomBufferKind {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Borrowed bytes of a custom-tagged value, handed to accessor table
/// functions.
#[derive(Debug, Clone, Copy)]
pub struct CustomBuffer<'a> {
    pub kind: CustomBufferKind,
    pub bytes: &'a [u8],
}

/// Accessor table for one custom buffer kind.
///
/// Entries left `None` fall back to the default value for the accessor.
/// Built with struct-update syntax:
///
/// ```
/// use idekitd::protocol::{VariantFuncs, VariantType};
///
/// let funcs = VariantFuncs {
///     get_type: Some(|_| VariantType::Array),
///     array_get_count: Some(|buf| buf.bytes.len()),
///     ..VariantFuncs::default()
/// };
/// ```
#[derive(Default)]
pub struct VariantFuncs {
    pub get_type: Option<fn(CustomBuffer<'_>) -> VariantType>,
    pub bool_get_value: Option<fn(CustomBuffer<'_>) -> bool>,
    pub int64_get_value: Option<fn(CustomBuffer<'_>) -> i64>,
    pub double_get_value: Option<fn(CustomBuffer<'_>) -> f64>,
    pub uid_get_value: Option<fn(CustomBuffer<'_>) -> Option<Uid>>,
    pub string_get: Option<for<'a> fn(CustomBuffer<'a>) -> &'a str>,
    pub data_get: Option<for<'a> fn(CustomBuffer<'a>) -> &'a [u8]>,
    pub array_get_count: Option<fn(CustomBuffer<'_>) -> usize>,
    pub array_get_value: Option<for<'a> fn(CustomBuffer<'a>, usize) -> Variant<'a>>,
    pub array_apply:
        Option<for<'a> fn(CustomBuffer<'a>, &mut dyn FnMut(usize, Variant<'a>) -> bool) -> bool>,
    pub dictionary_get_value: Option<for<'a> fn(CustomBuffer<'a>, Uid) -> Variant<'a>>,
    pub dictionary_apply:
        Option<for<'a> fn(CustomBuffer<'a>, &mut dyn FnMut(Uid, Variant<'a>) -> bool) -> bool>,
}

// Process-global table mapping buffer kinds to accessor tables. Registered
// once at plugin initialization, looked up on every access to a
// custom-tagged value, torn down only at process exit.
static CUSTOM_TABLES: OnceLock<RwLock<HashMap<u64, &'static VariantFuncs>>> = OnceLock::new();

fn custom_tables() -> &'static RwLock<HashMap<u64, &'static VariantFuncs>> {
    CUSTOM_TABLES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Binds `kind` to an accessor table. Re-registering a kind replaces the
/// previous table and is logged, since it usually signals two plugins
/// assigned overlapping kinds.
pub(crate) fn register_custom_buffer_funcs(kind: CustomBufferKind, funcs: VariantFuncs) {
    let funcs: &'static VariantFuncs = Box::leak(Box::new(funcs));
    let previous = custom_tables().write().unwrap().insert(kind.raw(), funcs);
    if previous.is_some() {
        warn!(kind = kind.raw(), "custom buffer kind re-registered");
    }
}

fn funcs_for(kind: CustomBufferKind) -> Option<&'static VariantFuncs> {
    custom_tables().read().unwrap().get(&kind.raw()).copied()
}

/// Read-only tagged view over structured data.
#[derive(Debug, Clone, Copy)]
pub struct Variant<'a> {
    repr: Repr<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Repr<'a> {
    Null,
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(&'a str),
    Uid(Uid),
    Array(&'a [Value]),
    Dictionary(&'a IndexMap<Uid, Value>),
    Data(&'a [u8]),
    Custom(CustomBuffer<'a>),
}

impl<'a> Variant<'a> {
    pub const fn null() -> Variant<'static> {
        Variant { repr: Repr::Null }
    }

    /// Scalar constructors, mainly for accessor tables that compute values
    /// on the fly rather than borrowing them.
    pub const fn boolean(value: bool) -> Variant<'static> {
        Variant {
            repr: Repr::Bool(value),
        }
    }

    pub const fn int64(value: i64) -> Variant<'static> {
        Variant {
            repr: Repr::Int64(value),
        }
    }

    pub const fn double(value: f64) -> Variant<'static> {
        Variant {
            repr: Repr::Double(value),
        }
    }

    pub const fn uid_value(value: Uid) -> Variant<'static> {
        Variant {
            repr: Repr::Uid(value),
        }
    }

    pub const fn string(value: &str) -> Variant<'_> {
        Variant {
            repr: Repr::String(value),
        }
    }

    /// Views an owned value. The variant is valid as long as `value` is.
    pub fn from_value(value: &'a Value) -> Variant<'a> {
        let repr = match value {
            Value::Null => Repr::Null,
            Value::Bool(v) => Repr::Bool(*v),
            Value::Int64(v) => Repr::Int64(*v),
            Value::Double(v) => Repr::Double(*v),
            Value::String(v) => Repr::String(v),
            Value::Uid(v) => Repr::Uid(*v),
            Value::Array(items) => Repr::Array(items),
            Value::Dictionary(entries) => Repr::Dictionary(entries),
            Value::Data(bytes) => Repr::Data(bytes),
            Value::Custom { kind, bytes } => Repr::Custom(CustomBuffer {
                kind: *kind,
                bytes,
            }),
        };
        Variant { repr }
    }

    /// Views plugin-owned bytes tagged with `kind` without copying them.
    pub fn from_custom_buffer(kind: CustomBufferKind, bytes: &'a [u8]) -> Variant<'a> {
        Variant {
            repr: Repr::Custom(CustomBuffer { kind, bytes }),
        }
    }

    pub fn variant_type(&self) -> VariantType {
        match self.repr {
            Repr::Null => VariantType::Null,
            Repr::Bool(_) => VariantType::Bool,
            Repr::Int64(_) => VariantType::Int64,
            Repr::Double(_) => VariantType::Double,
            Repr::String(_) => VariantType::String,
            Repr::Uid(_) => VariantType::Uid,
            Repr::Array(_) => VariantType::Array,
            Repr::Dictionary(_) => VariantType::Dictionary,
            Repr::Data(_) => VariantType::Data,
            // Untagged custom buffers read as raw data.
            Repr::Custom(buf) => match funcs_for(buf.kind).and_then(|f| f.get_type) {
                Some(get_type) => get_type(buf),
                None => VariantType::Data,
            },
        }
    }

    pub fn as_bool(&self) -> bool {
        match self.repr {
            Repr::Bool(v) => v,
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.bool_get_value)
                .map(|get| get(buf))
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn as_int64(&self) -> i64 {
        match self.repr {
            Repr::Int64(v) => v,
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.int64_get_value)
                .map(|get| get(buf))
                .unwrap_or(0),
            _ => 0,
        }
    }

    pub fn as_double(&self) -> f64 {
        match self.repr {
            Repr::Double(v) => v,
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.double_get_value)
                .map(|get| get(buf))
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn as_str(&self) -> &'a str {
        match self.repr {
            Repr::String(v) => v,
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.string_get)
                .map(|get| get(buf))
                .unwrap_or(""),
            _ => "",
        }
    }

    pub fn as_uid(&self) -> Option<Uid> {
        match self.repr {
            Repr::Uid(v) => Some(v),
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.uid_get_value)
                .and_then(|get| get(buf)),
            _ => None,
        }
    }

    pub fn as_data(&self) -> &'a [u8] {
        match self.repr {
            Repr::Data(bytes) => bytes,
            Repr::Custom(buf) => match funcs_for(buf.kind).and_then(|f| f.data_get) {
                Some(get) => get(buf),
                None => buf.bytes,
            },
            _ => &[],
        }
    }

    /// Number of elements for arrays and dictionaries, zero for scalars.
    pub fn count(&self) -> usize {
        match self.repr {
            Repr::Array(items) => items.len(),
            Repr::Dictionary(entries) => entries.len(),
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.array_get_count)
                .map(|get| get(buf))
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// The value under `key`, or a null variant for missing keys and
    /// non-dictionaries.
    pub fn dictionary_get(&self, key: Uid) -> Variant<'a> {
        match self.repr {
            Repr::Dictionary(entries) => entries
                .get(&key)
                .map(Variant::from_value)
                .unwrap_or(Variant::null()),
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.dictionary_get_value)
                .map(|get| get(buf, key))
                .unwrap_or(Variant::null()),
            _ => Variant::null(),
        }
    }

    /// The element at `index`, or a null variant when out of range or not
    /// an array.
    pub fn array_get(&self, index: usize) -> Variant<'a> {
        match self.repr {
            Repr::Array(items) => items
                .get(index)
                .map(Variant::from_value)
                .unwrap_or(Variant::null()),
            Repr::Custom(buf) => funcs_for(buf.kind)
                .and_then(|f| f.array_get_value)
                .map(|get| get(buf, index))
                .unwrap_or(Variant::null()),
            _ => Variant::null(),
        }
    }

    /// Visits array elements in index order. The callback returns `false`
    /// to stop; the function returns `false` iff it stopped early. Every
    /// element is visited at most once.
    pub fn for_each_array_element(
        &self,
        mut visit: impl FnMut(usize, Variant<'a>) -> bool,
    ) -> bool {
        match self.repr {
            Repr::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if !visit(index, Variant::from_value(item)) {
                        return false;
                    }
                }
                true
            }
            Repr::Custom(buf) => {
                let Some(funcs) = funcs_for(buf.kind) else {
                    return true;
                };
                if let Some(apply) = funcs.array_apply {
                    return apply(buf, &mut visit);
                }
                let (Some(get_count), Some(get_value)) =
                    (funcs.array_get_count, funcs.array_get_value)
                else {
                    return true;
                };
                for index in 0..get_count(buf) {
                    if !visit(index, get_value(buf, index)) {
                        return false;
                    }
                }
                true
            }
            _ => true,
        }
    }

    /// Visits dictionary entries in the container's fixed order. Same
    /// early-termination contract as [`for_each_array_element`].
    ///
    /// [`for_each_array_element`]: Variant::for_each_array_element
    pub fn for_each_dictionary_entry(
        &self,
        mut visit: impl FnMut(Uid, Variant<'a>) -> bool,
    ) -> bool {
        match self.repr {
            Repr::Dictionary(entries) => {
                for (key, value) in entries {
                    if !visit(*key, Variant::from_value(value)) {
                        return false;
                    }
                }
                true
            }
            Repr::Custom(buf) => {
                let Some(apply) = funcs_for(buf.kind).and_then(|f| f.dictionary_apply) else {
                    return true;
                };
                apply(buf, &mut visit)
            }
            _ => true,
        }
    }

    pub fn dictionary_get_bool(&self, key: Uid) -> bool {
        self.dictionary_get(key).as_bool()
    }

    pub fn dictionary_get_int64(&self, key: Uid) -> i64 {
        self.dictionary_get(key).as_int64()
    }

    pub fn dictionary_get_string(&self, key: Uid) -> &'a str {
        self.dictionary_get(key).as_str()
    }

    pub fn dictionary_get_uid(&self, key: Uid) -> Option<Uid> {
        self.dictionary_get(key).as_uid()
    }

    pub fn array_get_bool(&self, index: usize) -> bool {
        self.array_get(index).as_bool()
    }

    pub fn array_get_int64(&self, index: usize) -> i64 {
        self.array_get(index).as_int64()
    }

    pub fn array_get_string(&self, index: usize) -> &'a str {
        self.array_get(index).as_str()
    }

    pub fn array_get_uid(&self, index: usize) -> Option<Uid> {
        self.array_get(index).as_uid()
    }

    /// JSON-shaped rendering of the value, for diagnostics and logging.
    /// Custom buffers render through their accessor tables.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        match self.variant_type() {
            VariantType::Null => serde_json::Value::Null,
            VariantType::Bool => json!(self.as_bool()),
            VariantType::Int64 => json!(self.as_int64()),
            VariantType::Double => json!(self.as_double()),
            VariantType::String => json!(self.as_str()),
            VariantType::Uid => json!(self.as_uid().map(|u| u.as_str())),
            VariantType::Array => {
                let mut items = Vec::with_capacity(self.count());
                self.for_each_array_element(|_, element| {
                    items.push(element.to_json());
                    true
                });
                serde_json::Value::Array(items)
            }
            VariantType::Dictionary => {
                let mut entries = serde_json::Map::new();
                self.for_each_dictionary_entry(|key, value| {
                    entries.insert(key.as_str().to_owned(), value.to_json());
                    true
                });
                serde_json::Value::Object(entries)
            }
            VariantType::Data => json!(format!("<data {} bytes>", self.as_data().len())),
        }
    }

    /// Human-readable dump, not meant for programmatic consumption.
    pub fn describe(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_else(|_| "<unprintable>".into())
    }
}
