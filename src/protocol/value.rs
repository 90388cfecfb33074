//! Owned value tree.
//!
//! `Value` is the storage both requests and response payloads are made of.
//! It is never handed out across the protocol boundary directly: readers get
//! a borrowed [`Variant`](super::Variant) view instead, so plugin-owned
//! buffers and core-owned trees read identically.

use indexmap::IndexMap;

use crate::protocol::error::BuildError;
use crate::protocol::variant::CustomBufferKind;
use crate::uid::Uid;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(String),
    Uid(Uid),
    Array(Vec<Value>),
    /// Insertion order is fixed, so repeated traversals visit entries in the
    /// same order.
    Dictionary(IndexMap<Uid, Value>),
    Data(Vec<u8>),
    /// Opaque bytes tagged with a plugin-registered buffer kind. Accessor
    /// calls on the corresponding variant route through the kind's table.
    Custom {
        kind: CustomBufferKind,
        bytes: Vec<u8>,
    },
}

impl Value {
    /// Sets `key` in a dictionary, overwriting any previous value.
    pub fn set_entry(&mut self, key: Uid, value: Value) -> Result<(), BuildError> {
        match self {
            Value::Dictionary(entries) => {
                entries.insert(key, value);
                Ok(())
            }
            _ => Err(BuildError::NotADictionary),
        }
    }

    /// Replaces the element at `index`. Containers do not grow on
    /// out-of-range writes; the array is left unchanged.
    pub fn set_element(&mut self, index: usize, value: Value) -> Result<(), BuildError> {
        match self {
            Value::Array(items) => {
                let len = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or(BuildError::IndexOutOfRange { index, len })?;
                *slot = value;
                Ok(())
            }
            _ => Err(BuildError::NotAnArray),
        }
    }

    /// Appends to an array. This is the only way container arity grows.
    pub fn push_element(&mut self, value: Value) -> Result<(), BuildError> {
        match self {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(BuildError::NotAnArray),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Uid> for Value {
    fn from(v: Uid) -> Self {
        Value::Uid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uid::uid;

    #[test]
    fn set_entry_overwrites_existing_key() {
        let mut dict = Value::Dictionary(IndexMap::new());
        dict.set_entry(uid("key.name"), Value::from("first")).unwrap();
        dict.set_entry(uid("key.name"), Value::from("second")).unwrap();

        let Value::Dictionary(entries) = &dict else {
            panic!("expected dictionary");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[&uid("key.name")], Value::from("second"));
    }

    #[test]
    fn set_entry_on_scalar_fails() {
        let mut value = Value::Int64(1);
        assert_eq!(
            value.set_entry(uid("key.name"), Value::Null),
            Err(BuildError::NotADictionary)
        );
    }

    #[test]
    fn set_element_rejects_out_of_range_index_and_leaves_array_unchanged() {
        let mut array = Value::Array(vec![Value::Int64(1), Value::Int64(2)]);

        let err = array.set_element(2, Value::Int64(99)).unwrap_err();
        assert_eq!(err, BuildError::IndexOutOfRange { index: 2, len: 2 });
        assert_eq!(array, Value::Array(vec![Value::Int64(1), Value::Int64(2)]));
    }

    #[test]
    fn push_element_grows_array() {
        let mut array = Value::Array(vec![]);
        array.push_element(Value::Int64(7)).unwrap();
        array.set_element(0, Value::Int64(8)).unwrap();
        assert_eq!(array, Value::Array(vec![Value::Int64(8)]));
    }
}
