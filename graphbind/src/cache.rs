//! Per-type introspection cache.
//!
//! Field descriptors are computed once per `(type, naming pattern, accessor
//! prefix)` and shared afterwards. Entries are only ever appended: a new
//! naming configuration opens a new partition for the type instead of
//! touching existing ones.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::introspect::{
    AttributeSet, FieldDef, Introspectable, MethodDef, ReadFn, RecordShape, ShapeTable, Writer,
};
use crate::naming::{fold_name, NamingPattern};
use crate::value::Value;

/// Everything the normalizer needs to read one field of a record type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    raw_key: &'static str,
    public_name: String,
    accessor: Option<MethodDef>,
    reader: Option<ReadFn>,
    attributes: AttributeSet,
}

impl FieldDescriptor {
    pub fn raw_key(&self) -> &'static str {
        self.raw_key
    }

    pub fn public_name(&self) -> &str {
        &self.public_name
    }

    pub fn accessor_name(&self) -> Option<&'static str> {
        self.accessor.map(|m| m.name())
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Read the field through its accessor if it has one, directly otherwise.
    pub fn read(&self, record: &dyn Introspectable) -> Option<Value> {
        let any = record.as_any();
        match (&self.accessor, self.reader) {
            (Some(accessor), _) => accessor.get(any),
            (None, Some(read)) => read(any),
            (None, None) => None,
        }
    }
}

/// Write-side view of a record type.
#[derive(Debug, Default)]
pub struct WriteTable {
    setters: HashMap<String, MethodDef>,
    fields: IndexMap<&'static str, Writer>,
    lowercase: HashMap<String, Vec<&'static str>>,
}

impl WriteTable {
    fn build(shape: &ShapeTable) -> Self {
        let mut table = WriteTable::default();
        for setter in shape.setters() {
            table
                .setters
                .entry(fold_name(setter.name()))
                .or_insert(*setter);
        }
        for field in &shape.fields {
            if let Some(write) = field.writer() {
                table.fields.insert(field.name(), write);
                table
                    .lowercase
                    .entry(field.name().to_lowercase())
                    .or_default()
                    .push(field.name());
            }
        }
        table
    }

    /// Setter registered as `set` + `name`, compared loosely.
    pub fn setter(&self, name: &str) -> Option<(&'static str, Writer)> {
        let setter = self.setters.get(&fold_name(&format!("set{name}")))?;
        setter.writer().map(|writer| (setter.name(), writer))
    }

    /// Writer of the public field named exactly `name`.
    pub fn field(&self, name: &str) -> Option<Writer> {
        self.fields.get(name).copied()
    }

    /// Writer of the only public field whose lowercased name matches.
    pub fn case_insensitive(&self, name: &str) -> Option<(&'static str, Writer)> {
        match self.lowercase.get(&name.to_lowercase()).map(Vec::as_slice) {
            Some([actual]) => self.fields.get(actual).map(|write| (*actual, *write)),
            _ => None,
        }
    }
}

struct Partition {
    naming: Arc<str>,
    prefix: Box<str>,
    fields: Arc<[FieldDescriptor]>,
}

impl Partition {
    fn matches(&self, naming: &str, prefix: &str) -> bool {
        &*self.naming == naming && &*self.prefix == prefix
    }
}

/// Memoized field descriptors keyed by record type and naming configuration.
///
/// Safe to share between threads; concurrent first traversals of the same
/// type may both compute descriptors, but only the first insert is kept.
#[derive(Default)]
pub struct IntrospectionCache {
    shapes: DashMap<TypeId, Vec<Partition>>,
    writes: DashMap<TypeId, Arc<WriteTable>>,
}

impl std::fmt::Debug for IntrospectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrospectionCache")
            .field("partitions", &self.len())
            .field("write_tables", &self.writes.len())
            .finish()
    }
}

impl IntrospectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by the convenience constructors.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<IntrospectionCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(IntrospectionCache::new())))
    }

    /// Field descriptors of `record`'s type under the given naming rule.
    pub fn describe(
        &self,
        record: &dyn Introspectable,
        naming: &NamingPattern,
        accessor_prefix: &str,
    ) -> Arc<[FieldDescriptor]> {
        let type_id = record.as_any().type_id();

        if let Some(partitions) = self.shapes.get(&type_id) {
            if let Some(hit) = partitions
                .iter()
                .find(|p| p.matches(naming.key(), accessor_prefix))
            {
                trace!(record = record.type_name(), naming = naming.key(), "introspection cache hit");
                return Arc::clone(&hit.fields);
            }
        }

        trace!(record = record.type_name(), naming = naming.key(), "introspection cache miss");
        let built: Arc<[FieldDescriptor]> =
            describe_shape(record.type_name(), record.record_shape(), naming, accessor_prefix)
                .into();

        let mut partitions = self.shapes.entry(type_id).or_default();
        if let Some(existing) = partitions
            .iter()
            .find(|p| p.matches(naming.key(), accessor_prefix))
        {
            return Arc::clone(&existing.fields);
        }
        partitions.push(Partition {
            naming: Arc::from(naming.key()),
            prefix: accessor_prefix.into(),
            fields: Arc::clone(&built),
        });
        built
    }

    /// Setter and field writers of `record`'s type.
    pub fn write_table(&self, record: &dyn Introspectable) -> Arc<WriteTable> {
        let type_id = record.as_any().type_id();
        if let Some(hit) = self.writes.get(&type_id) {
            return Arc::clone(&hit);
        }

        trace!(record = record.type_name(), "building write table");
        let built = Arc::new(WriteTable::build(record.record_shape().table()));
        Arc::clone(&self.writes.entry(type_id).or_insert(built))
    }

    /// Number of `(type, naming)` partitions currently cached.
    pub fn len(&self) -> usize {
        self.shapes.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.shapes.clear();
        self.writes.clear();
    }
}

#[tracing::instrument(level = "debug", skip(shape, naming), fields(naming = naming.key()))]
fn describe_shape(
    type_name: &'static str,
    shape: RecordShape,
    naming: &NamingPattern,
    accessor_prefix: &str,
) -> Vec<FieldDescriptor> {
    match shape {
        RecordShape::Static(table) => describe_static(type_name, &table, naming, accessor_prefix),
        RecordShape::Dynamic(table) => describe_dynamic(type_name, &table, accessor_prefix),
    }
}

fn describe_static(
    type_name: &'static str,
    table: &ShapeTable,
    naming: &NamingPattern,
    accessor_prefix: &str,
) -> Vec<FieldDescriptor> {
    let mut getters: HashMap<String, MethodDef> = HashMap::new();
    for getter in table.getters() {
        getters.entry(fold_name(getter.name())).or_insert(*getter);
    }

    let mut descriptors = Vec::with_capacity(table.fields.len());
    for field in &table.fields {
        let public_name = if field.is_public() {
            field.name().to_string()
        } else {
            naming.apply(field.name())
        };
        if public_name.is_empty() {
            trace!(record = type_name, field = field.name(), "field name cleaned to nothing, skipped");
            continue;
        }

        let accessor = getters
            .get(&fold_name(&format!("{accessor_prefix}{public_name}")))
            .copied();
        if !field.is_public() && accessor.is_none() {
            trace!(record = type_name, field = field.name(), "restricted field without accessor, skipped");
            continue;
        }

        descriptors.push(FieldDescriptor {
            raw_key: field.name(),
            public_name,
            accessor,
            reader: Some(field.reader()),
            attributes: collect_attributes(type_name, field),
        });
    }
    descriptors
}

fn describe_dynamic(
    type_name: &'static str,
    table: &ShapeTable,
    accessor_prefix: &str,
) -> Vec<FieldDescriptor> {
    let mut seen = HashSet::new();
    let mut descriptors = Vec::new();

    for getter in table.getters() {
        let Some(public_name) = accessor_public_name(getter.name(), accessor_prefix) else {
            continue;
        };
        if !seen.insert(public_name.clone()) {
            continue;
        }
        descriptors.push(FieldDescriptor {
            raw_key: getter.name(),
            public_name,
            accessor: Some(*getter),
            reader: None,
            attributes: AttributeSet::new(),
        });
    }

    for field in table.fields.iter().filter(|f| f.is_public()) {
        if seen.contains(field.name()) {
            continue;
        }
        seen.insert(field.name().to_string());
        descriptors.push(FieldDescriptor {
            raw_key: field.name(),
            public_name: field.name().to_string(),
            accessor: None,
            reader: Some(field.reader()),
            attributes: collect_attributes(type_name, field),
        });
    }
    descriptors
}

/// `get_name` with prefix `get` becomes `name`; `getFullName` becomes
/// `fullName`. Methods not starting with the prefix yield `None`.
fn accessor_public_name(method: &str, prefix: &str) -> Option<String> {
    let head = method.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = method[prefix.len()..].trim_start_matches('_');
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

fn collect_attributes(type_name: &'static str, field: &FieldDef) -> AttributeSet {
    let mut set = AttributeSet::new();
    for factory in field.attribute_factories() {
        match factory() {
            Ok(attribute) => set.insert(attribute),
            Err(err) => {
                warn!(record = type_name, field = field.name(), error = %err, "field metadata unavailable");
                return AttributeSet::new();
            }
        }
    }
    set
}
