//! Canonical output of a traversal.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::value::{Scalar, Value};

/// Ordered string-keyed map; insertion order is significant.
pub type Mapping = IndexMap<String, Normalized>;

/// A normalized object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Scalar(Scalar),
    Sequence(Vec<Normalized>),
    Mapping(Mapping),
    /// A value left untouched because of a depth limit or an opaque type.
    Opaque(Value),
}

impl Default for Normalized {
    fn default() -> Self {
        Normalized::NULL
    }
}

impl Normalized {
    pub const NULL: Normalized = Normalized::Scalar(Scalar::Null);

    pub fn is_null(&self) -> bool {
        matches!(self, Normalized::Scalar(Scalar::Null))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Normalized::Sequence(_) | Normalized::Mapping(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Normalized::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Normalized::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Normalized]> {
        match self {
            Normalized::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Value> {
        match self {
            Normalized::Opaque(v) => Some(v),
            _ => None,
        }
    }

    /// Entry of a mapping by key.
    pub fn get(&self, key: &str) -> Option<&Normalized> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Keys of a mapping in order; empty for anything else.
    pub fn keys(&self) -> Vec<&str> {
        self.as_mapping()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// `(name, value)` pairs of a mapping, or index-keyed pairs of a
    /// sequence. Scalars and opaque values have no entries.
    pub fn into_entries(self) -> Vec<(String, Normalized)> {
        match self {
            Normalized::Mapping(m) => m.into_iter().collect(),
            Normalized::Sequence(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Normalized::Scalar(_) | Normalized::Opaque(_) => Vec::new(),
        }
    }
}

impl From<Normalized> for Value {
    fn from(value: Normalized) -> Self {
        match value {
            Normalized::Scalar(s) => Value::Scalar(s),
            Normalized::Sequence(items) => Value::Seq(items.into_iter().map(Value::from).collect()),
            Normalized::Mapping(entries) => {
                Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            Normalized::Opaque(v) => v,
        }
    }
}

impl From<Scalar> for Normalized {
    fn from(value: Scalar) -> Self {
        Normalized::Scalar(value)
    }
}

impl From<&str> for Normalized {
    fn from(value: &str) -> Self {
        Normalized::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Normalized {
    fn from(value: String) -> Self {
        Normalized::Scalar(Scalar::String(value))
    }
}

impl From<i64> for Normalized {
    fn from(value: i64) -> Self {
        Normalized::Scalar(Scalar::Number(value.into()))
    }
}

impl From<i32> for Normalized {
    fn from(value: i32) -> Self {
        Normalized::Scalar(Scalar::Number(value.into()))
    }
}

impl From<bool> for Normalized {
    fn from(value: bool) -> Self {
        Normalized::Scalar(Scalar::Bool(value))
    }
}

impl From<Mapping> for Normalized {
    fn from(value: Mapping) -> Self {
        Normalized::Mapping(value)
    }
}

impl From<Vec<Normalized>> for Normalized {
    fn from(value: Vec<Normalized>) -> Self {
        Normalized::Sequence(value)
    }
}

impl Serialize for Normalized {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Normalized::Scalar(s) => s.serialize(serializer),
            Normalized::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Normalized::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Normalized::Opaque(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Normalized {
        let mut inner = Mapping::new();
        inner.insert("b".to_string(), Normalized::from(2));
        inner.insert("a".to_string(), Normalized::NULL);

        let mut outer = Mapping::new();
        outer.insert("z".to_string(), Normalized::from("last"));
        outer.insert("inner".to_string(), Normalized::Mapping(inner));
        outer.insert(
            "list".to_string(),
            Normalized::Sequence(vec![Normalized::from(true)]),
        );
        Normalized::Mapping(outer)
    }

    #[test]
    fn test_serialize_preserves_order() {
        let json = serde_json::to_string(&sample()).expect("serializable");
        assert_eq!(json, r#"{"z":"last","inner":{"b":2,"a":null},"list":[true]}"#);
    }

    #[test]
    fn test_into_value_keeps_structure() {
        let value = Value::from(sample());
        let map = value.as_map().expect("mapping");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "inner", "list"]);
        assert_eq!(map.get("z"), Some(&Value::from("last")));
    }

    #[test]
    fn test_into_entries() {
        let entries = Normalized::Sequence(vec![Normalized::from("a"), Normalized::from("b")])
            .into_entries();
        assert_eq!(entries[1], ("1".to_string(), Normalized::from("b")));
        assert!(Normalized::from(5).into_entries().is_empty());
    }

    #[test]
    fn test_accessors() {
        let n = sample();
        assert_eq!(n.keys(), vec!["z", "inner", "list"]);
        assert_eq!(n.get("z").and_then(Normalized::as_str), Some("last"));
        assert!(n.get("inner").is_some_and(Normalized::is_container));
        assert!(n.get("missing").is_none());
    }
}
