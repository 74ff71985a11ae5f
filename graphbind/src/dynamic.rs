//! Untyped records.

use indexmap::IndexMap;
use serde::Serialize;

use crate::copy::BindTarget;
use crate::error::{BindResult, ConversionError};
use crate::naming::TargetRecord;
use crate::value::{AsNode, FromValue, Node, ToValue, Value};

/// A record without a declared shape: any field name can be written, and
/// traversal treats it like an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    fields: IndexMap<String, Value>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field, keeping its original position when it already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.fields
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DynamicRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<IndexMap<String, Value>> for DynamicRecord {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl AsNode for DynamicRecord {
    fn as_node(&self) -> Node<'_> {
        Node::Map(&self.fields)
    }
}

impl BindTarget for DynamicRecord {
    fn bind_target(&mut self) -> BindResult<TargetRecord<'_>> {
        Ok(TargetRecord::Untyped(&mut self.fields))
    }
}

impl ToValue for DynamicRecord {
    fn to_value(&self) -> Value {
        Value::Map(self.fields.clone())
    }
}

impl FromValue for DynamicRecord {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Map(fields) => Ok(Self { fields }),
            other => Err(ConversionError::mismatch("mapping", other.kind())),
        }
    }
}
