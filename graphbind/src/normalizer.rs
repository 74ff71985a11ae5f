//! Recursive canonicalization of object graphs.
//!
//! Depth travels down the call stack, so one [`Normalizer`] can serve any
//! number of concurrent traversals. Cyclic graphs are not detected and will
//! recurse until the stack is exhausted.

use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::cache::IntrospectionCache;
use crate::config::TraversalConfig;
use crate::introspect::Introspectable;
use crate::normalized::{Mapping, Normalized};
use crate::value::{AsNode, Node, Scalar, Value};

/// Turns values, records and containers into [`Normalized`] trees.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: TraversalConfig,
    cache: Arc<IntrospectionCache>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(TraversalConfig::default())
    }
}

impl Normalizer {
    /// Normalizer backed by the process-wide cache.
    pub fn new(config: TraversalConfig) -> Self {
        Self::with_cache(config, IntrospectionCache::global())
    }

    pub fn with_cache(config: TraversalConfig, cache: Arc<IntrospectionCache>) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<IntrospectionCache> {
        &self.cache
    }

    pub fn canonicalize<N: AsNode + ?Sized>(&self, source: &N) -> Normalized {
        self.canonicalize_node(source.as_node())
    }

    /// Serializable view of `value` whose opaque parts are normalized with
    /// this normalizer, and so with its cache.
    pub fn expanded<'a>(&'a self, value: &'a Normalized) -> Expanded<'a> {
        Expanded {
            value,
            normalizer: self,
        }
    }

    pub fn canonicalize_node(&self, node: Node<'_>) -> Normalized {
        match node {
            Node::Value(value) => self.walk(value, 1),
            Node::Record(record) => self.walk_record(record, 1),
            Node::Map(entries) => self.walk_map(entries.iter(), 1),
            Node::Seq(items) => self.walk_seq(items, 1),
        }
    }

    fn walk(&self, value: &Value, depth: usize) -> Normalized {
        if self.config.stops_at(depth) {
            return match value {
                Value::Scalar(scalar) => Normalized::Scalar(scalar.clone()),
                other => {
                    debug!(depth, "depth limit reached, kept as-is");
                    Normalized::Opaque(other.clone())
                }
            };
        }

        match value {
            Value::Scalar(scalar) => self.scalar(scalar),
            Value::Seq(items) => self.walk_seq(items, depth),
            Value::Map(entries) => self.walk_map(entries.iter(), depth),
            Value::Record(record) => {
                if self.config.is_opaque(record.record_type_id()) {
                    debug!(record = record.type_name(), "opaque type, not descending");
                    return Normalized::Opaque(value.clone());
                }
                self.walk_record(record.as_introspectable(), depth)
            }
        }
    }

    fn scalar(&self, scalar: &Scalar) -> Normalized {
        if self.config.stringify_scalars() {
            Normalized::Scalar(Scalar::String(scalar.to_text()))
        } else {
            Normalized::Scalar(scalar.clone())
        }
    }

    fn keeps(&self, value: &Normalized) -> bool {
        !(self.config.drop_nulls() && value.is_null())
    }

    fn walk_seq(&self, items: &[Value], depth: usize) -> Normalized {
        Normalized::Sequence(
            items
                .iter()
                .map(|item| self.walk(item, depth + 1))
                .filter(|item| self.keeps(item))
                .collect(),
        )
    }

    fn walk_map<'v>(
        &self,
        entries: impl ExactSizeIterator<Item = (&'v String, &'v Value)>,
        depth: usize,
    ) -> Normalized {
        let mut out = Mapping::with_capacity(entries.len());
        for (key, value) in entries {
            if self.config.is_excluded(key) {
                continue;
            }
            let normalized = self.walk(value, depth + 1);
            if self.keeps(&normalized) {
                out.insert(key.clone(), normalized);
            }
        }
        Normalized::Mapping(out)
    }

    fn walk_record(&self, record: &dyn Introspectable, depth: usize) -> Normalized {
        let fields = self.cache.describe(
            record,
            self.config.naming_pattern(),
            self.config.accessor_prefix(),
        );

        let mut out = Mapping::with_capacity(fields.len());
        for field in fields.iter() {
            if self.config.is_excluded(field.public_name()) {
                continue;
            }
            let Some(raw) = field.read(record) else {
                trace!(record = record.type_name(), field = field.raw_key(), "field unreadable, skipped");
                continue;
            };

            let mut normalized = self.walk(&raw, depth + 1);
            if let Some(hook) = self.config.field_hook() {
                normalized = hook.apply(field, normalized);
            }
            if self.keeps(&normalized) {
                out.insert(field.public_name().to_string(), normalized);
            }
        }
        Normalized::Mapping(out)
    }
}

/// See [`Normalizer::expanded`].
#[derive(Debug, Clone, Copy)]
pub struct Expanded<'a> {
    value: &'a Normalized,
    normalizer: &'a Normalizer,
}

impl Serialize for Expanded<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Normalized::Scalar(scalar) => scalar.serialize(serializer),
            Normalized::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.normalizer.expanded(item))?;
                }
                seq.end()
            }
            Normalized::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, &self.normalizer.expanded(value))?;
                }
                map.end()
            }
            Normalized::Opaque(inner) => match self.normalizer.canonicalize(inner) {
                Normalized::Opaque(value) => value.serialize(serializer),
                expanded => self.normalizer.expanded(&expanded).serialize(serializer),
            },
        }
    }
}
