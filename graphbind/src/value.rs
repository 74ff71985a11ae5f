//! Dynamic input model for object graphs.
//!
//! A [`Value`] is what the normalizer walks: scalars, ordered sequences,
//! associative maps and shared [`Record`] handles. Field readers produce
//! values through [`ToValue`]; field writers consume them through
//! [`FromValue`].

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Number;

use crate::error::ConversionError;
use crate::introspect::Introspectable;

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::String(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Text form of the scalar: `true` is `"1"`, `false` and null are empty.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null | Scalar::Bool(false) => String::new(),
            Scalar::Bool(true) => "1".to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn from_f64(value: f64) -> Self {
        Number::from_f64(value)
            .map(Scalar::Number)
            .unwrap_or(Scalar::Null)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Shared handle to an introspectable record.
///
/// Cloning the handle keeps the identity of the underlying record, which is
/// what lets a depth-limited traversal hand back the original reference.
#[derive(Clone)]
pub struct Record(Arc<dyn Introspectable>);

impl Record {
    pub fn new<T: Introspectable>(record: T) -> Self {
        Self(Arc::new(record))
    }

    pub fn from_arc<T: Introspectable>(record: Arc<T>) -> Self {
        Self(record)
    }

    /// Whether both handles point at the same record instance.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// `TypeId` of the concrete record type.
    pub fn record_type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn downcast_ref<T: Introspectable>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Introspectable>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).into_any_arc().downcast::<T>().ok()
    }

    pub fn as_introspectable(&self) -> &dyn Introspectable {
        &*self.0
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Record").field(&self.type_name()).finish()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A node of a dynamic object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Seq(Vec<Value>),
    Map(IndexMap<String, Value>),
    Record(Record),
}

impl Default for Value {
    fn default() -> Self {
        Value::NULL
    }
}

impl Value {
    pub const NULL: Value = Value::Scalar(Scalar::Null);

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(s) => s.kind(),
            Value::Seq(_) => "sequence",
            Value::Map(_) => "mapping",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(Scalar::Null))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::as_i64)
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Build a map value from `(key, value)` pairs, keeping their order.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => f.write_str(&s.to_text()),
            other => {
                let encoded = serde_json::to_string(other).map_err(|_| fmt::Error)?;
                f.write_str(&encoded)
            }
        }
    }
}

/// Records are normalized with the process-wide cache. Serialize through
/// [`Normalizer::expanded`](crate::Normalizer::expanded) to use another one.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(s) => s.serialize(serializer),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Record(record) => crate::normalizer::Normalizer::default()
                .canonicalize(record)
                .serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::NULL,
            serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => Value::Scalar(Scalar::Number(n)),
            serde_json::Value::String(s) => Value::Scalar(Scalar::String(s)),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => {
                Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Seq(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::String(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Scalar(Scalar::Number(value.into()))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Scalar::Number(value.into()))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Scalar(Scalar::Number(value.into()))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::from_f64(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::NULL, Into::into)
    }
}

// =============================================================================
// Traversal roots
// =============================================================================

/// Borrowed root of a traversal.
#[derive(Clone, Copy)]
pub enum Node<'a> {
    Value(&'a Value),
    Record(&'a dyn Introspectable),
    Map(&'a IndexMap<String, Value>),
    Seq(&'a [Value]),
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Node::Record(r) => f.debug_tuple("Record").field(&r.type_name()).finish(),
            Node::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Node::Seq(s) => f.debug_tuple("Seq").field(s).finish(),
        }
    }
}

impl<'a> Node<'a> {
    /// The record behind this node, if it is one.
    pub fn as_record(&self) -> Option<&'a dyn Introspectable> {
        match *self {
            Node::Record(r) => Some(r),
            Node::Value(Value::Record(r)) => Some(r.as_introspectable()),
            _ => None,
        }
    }

    /// Read a top-level entry of a map-shaped node by key.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        match *self {
            Node::Map(m) | Node::Value(Value::Map(m)) => m.get(key),
            _ => None,
        }
    }
}

/// Anything the normalizer can start a traversal from.
pub trait AsNode {
    fn as_node(&self) -> Node<'_>;
}

impl AsNode for Value {
    fn as_node(&self) -> Node<'_> {
        Node::Value(self)
    }
}

impl AsNode for Record {
    fn as_node(&self) -> Node<'_> {
        Node::Record(self.as_introspectable())
    }
}

impl AsNode for IndexMap<String, Value> {
    fn as_node(&self) -> Node<'_> {
        Node::Map(self)
    }
}

impl AsNode for Vec<Value> {
    fn as_node(&self) -> Node<'_> {
        Node::Seq(self)
    }
}

impl AsNode for [Value] {
    fn as_node(&self) -> Node<'_> {
        Node::Seq(self)
    }
}

impl AsNode for dyn Introspectable {
    fn as_node(&self) -> Node<'_> {
        Node::Record(self)
    }
}

// =============================================================================
// Conversions into values
// =============================================================================

/// Produce a dynamic [`Value`] from a Rust value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Build a Rust value from a dynamic [`Value`].
///
/// Conversions are lenient in the way a dynamically-typed host would be:
/// numeric strings parse into numbers and any scalar becomes a string.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl ToValue for Scalar {
    fn to_value(&self) -> Value {
        Value::Scalar(self.clone())
    }
}

impl FromValue for Scalar {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Scalar(s) => Ok(s),
            other => Err(ConversionError::mismatch("scalar", other.kind())),
        }
    }
}

impl ToValue for Record {
    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }
}

impl FromValue for Record {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Record(r) => Ok(r),
            other => Err(ConversionError::mismatch("record", other.kind())),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::Bool(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Scalar(Scalar::Bool(b)) => Ok(b),
            Value::Scalar(Scalar::Null) => Ok(false),
            Value::Scalar(Scalar::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::Scalar(Scalar::String(s)) => match s.trim() {
                "" | "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                _ => Err(ConversionError::Unparsable {
                    value: s,
                    target: "bool",
                }),
            },
            other => Err(ConversionError::mismatch("boolean", other.kind())),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::String(self.to_string()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::String(self.clone()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Scalar(Scalar::String(s)) => Ok(s),
            Value::Scalar(s) => Ok(s.to_text()),
            other => Err(ConversionError::mismatch("string", other.kind())),
        }
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::String(self.to_string()))
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let text = String::from_value(value)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::Unparsable {
                value: text,
                target: "char",
            }),
        }
    }
}

fn integral(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < 1e38)
        .map(|f| f as i128)
}

macro_rules! impl_value_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Scalar(Scalar::Number(Number::from(*self)))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    let target = stringify!($ty);
                    match value {
                        Value::Scalar(Scalar::Number(n)) => integral(&n)
                            .and_then(|i| <$ty>::try_from(i).ok())
                            .ok_or_else(|| ConversionError::OutOfRange {
                                value: n.to_string(),
                                target,
                            }),
                        Value::Scalar(Scalar::String(s)) => {
                            s.trim().parse::<$ty>().map_err(|_| ConversionError::Unparsable {
                                value: s,
                                target,
                            })
                        }
                        Value::Scalar(Scalar::Bool(b)) => Ok(<$ty>::from(b)),
                        other => Err(ConversionError::mismatch(target, other.kind())),
                    }
                }
            }
        )*
    };
}

impl_value_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_value_for_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Scalar(Scalar::from_f64(f64::from(*self)))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    let target = stringify!($ty);
                    match value {
                        Value::Scalar(Scalar::Number(n)) => n
                            .as_f64()
                            .map(|f| f as $ty)
                            .ok_or_else(|| ConversionError::OutOfRange {
                                value: n.to_string(),
                                target,
                            }),
                        Value::Scalar(Scalar::String(s)) => {
                            s.trim().parse::<$ty>().map_err(|_| ConversionError::Unparsable {
                                value: s,
                                target,
                            })
                        }
                        Value::Scalar(Scalar::Bool(b)) => Ok(if b { 1.0 } else { 0.0 }),
                        other => Err(ConversionError::mismatch(target, other.kind())),
                    }
                }
            }
        )*
    };
}

impl_value_for_float!(f32, f64);

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::NULL, ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            Value::Map(entries) => entries.into_values().map(T::from_value).collect(),
            other => Err(ConversionError::mismatch("sequence", other.kind())),
        }
    }
}

fn entries_from_value<T: FromValue>(
    value: Value,
) -> Result<Vec<(String, T)>, ConversionError> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
            .collect(),
        other => Err(ConversionError::mismatch("mapping", other.kind())),
    }
}

impl<T: ToValue> ToValue for IndexMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(entries_from_value(value)?.into_iter().collect())
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(entries_from_value(value)?.into_iter().collect())
    }
}

impl<T: ToValue, S> ToValue for HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<T: FromValue, S: std::hash::BuildHasher + Default> FromValue for HashMap<String, T, S> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(entries_from_value(value)?.into_iter().collect())
    }
}

impl<T: Introspectable> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        Value::Record(Record::from_arc(Arc::clone(self)))
    }
}

impl<T: Introspectable> FromValue for Arc<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Record(r) => r
                .downcast_arc::<T>()
                .ok_or_else(|| ConversionError::downcast(std::any::type_name::<T>())),
            other => Err(ConversionError::mismatch("record", other.kind())),
        }
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

#[cfg(feature = "chrono")]
mod chrono_support {
    use super::*;

    impl<Tz: chrono::TimeZone> ToValue for chrono::DateTime<Tz>
    where
        Tz::Offset: fmt::Display,
    {
        fn to_value(&self) -> Value {
            Value::Scalar(Scalar::String(self.to_rfc3339()))
        }
    }

    impl FromValue for chrono::DateTime<chrono::Utc> {
        fn from_value(value: Value) -> Result<Self, ConversionError> {
            let text = String::from_value(value)?;
            chrono::DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|_| ConversionError::Unparsable {
                    value: text,
                    target: "DateTime<Utc>",
                })
        }
    }

    impl ToValue for chrono::NaiveDate {
        fn to_value(&self) -> Value {
            Value::Scalar(Scalar::String(self.format("%Y-%m-%d").to_string()))
        }
    }

    impl FromValue for chrono::NaiveDate {
        fn from_value(value: Value) -> Result<Self, ConversionError> {
            let text = String::from_value(value)?;
            chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
                ConversionError::Unparsable {
                    value: text,
                    target: "NaiveDate",
                }
            })
        }
    }
}

#[cfg(feature = "uuid")]
mod uuid_support {
    use super::*;

    impl ToValue for uuid::Uuid {
        fn to_value(&self) -> Value {
            Value::Scalar(Scalar::String(self.to_string()))
        }
    }

    impl FromValue for uuid::Uuid {
        fn from_value(value: Value) -> Result<Self, ConversionError> {
            let text = String::from_value(value)?;
            uuid::Uuid::parse_str(&text).map_err(|_| ConversionError::Unparsable {
                value: text,
                target: "Uuid",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text() {
        assert_eq!(Scalar::Bool(true).to_text(), "1");
        assert_eq!(Scalar::Bool(false).to_text(), "");
        assert_eq!(Scalar::Null.to_text(), "");
        assert_eq!(Scalar::Number(0.into()).to_text(), "0");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_lenient_integer_conversion() {
        assert_eq!(i32::from_value(Value::from("42")), Ok(42));
        assert_eq!(u8::from_value(Value::from(true)), Ok(1));
        assert_eq!(i64::from_value(Value::from(3.0)), Ok(3));
        assert!(matches!(
            u8::from_value(Value::from(300)),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            i32::from_value(Value::from("abc")),
            Err(ConversionError::Unparsable { .. })
        ));
        assert!(matches!(
            i32::from_value(Value::Seq(vec![])),
            Err(ConversionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_string_accepts_any_scalar() {
        assert_eq!(String::from_value(Value::from(10)), Ok("10".to_string()));
        assert_eq!(String::from_value(Value::NULL), Ok(String::new()));
        assert!(String::from_value(Value::Seq(vec![])).is_err());
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<i32>::from_value(Value::NULL), Ok(None));
        assert_eq!(Option::<i32>::from_value(Value::from(5)), Ok(Some(5)));
        assert_eq!(None::<i32>.to_value(), Value::NULL);
    }

    #[test]
    fn test_collections_to_value() {
        let list = vec![1, 2].to_value();
        assert_eq!(list, Value::Seq(vec![Value::from(1), Value::from(2)]));

        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);
        let keys: Vec<_> = map
            .to_value()
            .as_map()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_from_json_preserves_shape() {
        let json = serde_json::json!({"id": 1, "tags": ["a", null]});
        let value = Value::from(json);
        let map = value.as_map().expect("mapping");
        assert_eq!(map.get("id"), Some(&Value::from(1)));
        assert_eq!(
            map.get("tags"),
            Some(&Value::Seq(vec![Value::from("a"), Value::NULL]))
        );
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert!(Value::from(f64::NAN).is_null());
    }
}
