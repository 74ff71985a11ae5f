//! The `Introspectable` capability and the static tables it exposes.
//!
//! `#[derive(Introspectable)]` generates a [`ShapeTable`] describing every
//! named field of a struct: its raw identifier, visibility, a reader, an
//! optional writer and the metadata attached to it. Accessor methods are
//! registered separately through `#[accessors]` on an impl block, which
//! implements [`AccessorTable`].
//!
//! Types that cannot use the derive can implement the trait by hand; the
//! cache and normalizer only ever talk to this interface.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ConversionError, IntrospectionError};
use crate::value::{FromValue, Value};

/// Reads a field (or calls a getter) on a type-erased record.
pub type ReadFn = fn(&dyn Any) -> Option<Value>;

/// A value already converted to the exact type a field or setter takes.
pub type Staged = Box<dyn Any + Send>;

/// Converts an incoming value for one field or setter.
pub type StageFn = fn(Value) -> Result<Staged, ConversionError>;

/// Stores a staged value on a type-erased record.
pub type ApplyFn = fn(&mut dyn Any, Staged) -> Result<(), ConversionError>;

/// Writes a field (or calls a setter) in two steps: conversion, which
/// never touches the record, then the store itself.
#[derive(Debug, Clone, Copy)]
pub struct Writer {
    stage: StageFn,
    apply: ApplyFn,
}

impl Writer {
    pub fn new(stage: StageFn, apply: ApplyFn) -> Self {
        Self { stage, apply }
    }

    pub fn stage(&self, value: Value) -> Result<Staged, ConversionError> {
        (self.stage)(value)
    }

    pub fn apply(&self, record: &mut dyn Any, staged: Staged) -> Result<(), ConversionError> {
        (self.apply)(record, staged)
    }

    /// Convert and store in one go.
    pub fn write(&self, record: &mut dyn Any, value: Value) -> Result<(), ConversionError> {
        let staged = self.stage(value)?;
        self.apply(record, staged)
    }
}

/// [`StageFn`] for any [`FromValue`] type.
pub fn stage_as<T: FromValue + Send + 'static>(value: Value) -> Result<Staged, ConversionError> {
    let staged: Staged = Box::new(T::from_value(value)?);
    Ok(staged)
}

/// Take back a value staged by [`stage_as::<T>`](stage_as).
pub fn unstage<T: Any>(staged: Staged) -> Result<T, ConversionError> {
    staged
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| ConversionError::downcast(std::any::type_name::<T>()))
}

/// Produces one metadata instance for a field.
pub type AttributeFactory = fn() -> Result<Attribute, IntrospectionError>;

/// A record type whose fields can be enumerated at runtime.
pub trait Introspectable: Any + Send + Sync {
    /// Describe the fields and accessors of this record type.
    ///
    /// The result depends only on the type, never on the instance; the
    /// introspection cache calls this once per type and configuration.
    fn record_shape(&self) -> RecordShape;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Accessor methods registered by `#[accessors]`.
pub trait AccessorTable {
    fn accessor_table() -> Vec<MethodDef>;
}

/// How a record type exposes its fields.
#[derive(Debug, Clone)]
pub enum RecordShape {
    /// Fields come from the declared struct fields, read directly or
    /// through a matching accessor.
    Static(ShapeTable),
    /// Fields come from enumerated accessor methods first, then from the
    /// public fields no accessor already covers.
    Dynamic(ShapeTable),
}

impl RecordShape {
    pub fn table(&self) -> &ShapeTable {
        match self {
            RecordShape::Static(table) | RecordShape::Dynamic(table) => table,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, RecordShape::Dynamic(_))
    }
}

/// Declared fields and registered methods of one record type.
#[derive(Debug, Clone, Default)]
pub struct ShapeTable {
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

impl ShapeTable {
    pub fn new(fields: Vec<FieldDef>, methods: Vec<MethodDef>) -> Self {
        Self { fields, methods }
    }

    pub fn getters(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| m.is_getter())
    }

    pub fn setters(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| m.is_setter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldVisibility {
    /// Declared `pub`: readable and writable from outside the type.
    Public,
    /// Anything narrower than `pub`: readable only through an accessor.
    Restricted,
}

/// One declared field of a record type.
#[derive(Clone)]
pub struct FieldDef {
    name: &'static str,
    visibility: FieldVisibility,
    read: ReadFn,
    write: Option<Writer>,
    attributes: Vec<AttributeFactory>,
}

impl FieldDef {
    pub fn new(name: &'static str, visibility: FieldVisibility, read: ReadFn) -> Self {
        Self {
            name,
            visibility,
            read,
            write: None,
            attributes: Vec::new(),
        }
    }

    #[must_use = "This method returns a new FieldDef and does not modify self"]
    pub fn with_writer(mut self, write: Writer) -> Self {
        self.write = Some(write);
        self
    }

    #[must_use = "This method returns a new FieldDef and does not modify self"]
    pub fn with_attribute(mut self, factory: AttributeFactory) -> Self {
        self.attributes.push(factory);
        self
    }

    /// The raw field identifier.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn visibility(&self) -> FieldVisibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == FieldVisibility::Public
    }

    pub fn reader(&self) -> ReadFn {
        self.read
    }

    pub fn writer(&self) -> Option<Writer> {
        self.write
    }

    pub fn attribute_factories(&self) -> &[AttributeFactory] {
        &self.attributes
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("writable", &self.write.is_some())
            .field("attributes", &self.attributes.len())
            .finish()
    }
}

#[derive(Clone, Copy)]
pub enum MethodKind {
    Getter(ReadFn),
    Setter(Writer),
}

/// A registered accessor method.
#[derive(Clone, Copy)]
pub struct MethodDef {
    name: &'static str,
    kind: MethodKind,
}

impl MethodDef {
    pub fn getter(name: &'static str, call: ReadFn) -> Self {
        Self {
            name,
            kind: MethodKind::Getter(call),
        }
    }

    pub fn setter(name: &'static str, call: Writer) -> Self {
        Self {
            name,
            kind: MethodKind::Setter(call),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn is_getter(&self) -> bool {
        matches!(self.kind, MethodKind::Getter(_))
    }

    pub fn is_setter(&self) -> bool {
        matches!(self.kind, MethodKind::Setter(_))
    }

    /// Call the getter. Returns `None` for setters or a foreign record.
    pub fn get(&self, record: &dyn Any) -> Option<Value> {
        match self.kind {
            MethodKind::Getter(call) => call(record),
            MethodKind::Setter(_) => None,
        }
    }

    /// The setter's writer. `None` for getters.
    pub fn writer(&self) -> Option<Writer> {
        match self.kind {
            MethodKind::Setter(call) => Some(call),
            MethodKind::Getter(_) => None,
        }
    }

    /// Call the setter. Returns `None` for getters.
    pub fn set(&self, record: &mut dyn Any, value: Value) -> Option<Result<(), ConversionError>> {
        self.writer().map(|writer| writer.write(record, value))
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_getter() { "getter" } else { "setter" };
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// A metadata instance attached to a field, such as a marker struct given
/// through `#[introspect(meta = ...)]`.
#[derive(Clone)]
pub struct Attribute {
    kind: TypeId,
    type_name: &'static str,
    instance: Arc<dyn Any + Send + Sync>,
}

impl Attribute {
    pub fn new<A: Any + Send + Sync>(instance: A) -> Self {
        Self {
            kind: TypeId::of::<A>(),
            type_name: std::any::type_name::<A>(),
            instance: Arc::new(instance),
        }
    }

    pub fn kind(&self) -> TypeId {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<A: Any>(&self) -> bool {
        self.kind == TypeId::of::<A>()
    }

    pub fn downcast_ref<A: Any>(&self) -> Option<&A> {
        self.instance.downcast_ref::<A>()
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attribute").field(&self.type_name).finish()
    }
}

/// Field metadata indexed by kind.
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    by_kind: IndexMap<TypeId, Vec<Attribute>>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, attribute: Attribute) {
        self.by_kind
            .entry(attribute.kind())
            .or_default()
            .push(attribute);
    }

    /// Every instance of metadata kind `A`, in declaration order.
    pub fn of<A: Any>(&self) -> impl Iterator<Item = &A> {
        self.by_kind
            .get(&TypeId::of::<A>())
            .into_iter()
            .flatten()
            .filter_map(Attribute::downcast_ref::<A>)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.by_kind.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToValue;

    #[derive(Debug, Clone, PartialEq)]
    struct Label(&'static str);

    #[derive(Debug, Clone, PartialEq)]
    struct Hidden;

    #[derive(Clone)]
    struct Manual {
        pub code: String,
        secret: i64,
    }

    impl Introspectable for Manual {
        fn record_shape(&self) -> RecordShape {
            RecordShape::Static(ShapeTable::new(
                vec![
                    FieldDef::new("code", FieldVisibility::Public, |r| {
                        r.downcast_ref::<Manual>().map(|m| m.code.to_value())
                    })
                    .with_writer(Writer::new(stage_as::<String>, |r, staged| {
                        let this = r
                            .downcast_mut::<Manual>()
                            .ok_or(ConversionError::downcast("Manual"))?;
                        this.code = unstage(staged)?;
                        Ok(())
                    }))
                    .with_attribute(|| Ok(Attribute::new(Label("code")))),
                    FieldDef::new("secret", FieldVisibility::Restricted, |r| {
                        r.downcast_ref::<Manual>().map(|m| m.secret.to_value())
                    }),
                ],
                vec![MethodDef::getter("get_secret", |r| {
                    r.downcast_ref::<Manual>().map(|m| (m.secret * 2).to_value())
                })],
            ))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn test_manual_shape_reads_and_writes() {
        let mut record = Manual {
            code: "A1".to_string(),
            secret: 21,
        };
        let shape = record.record_shape();
        assert!(!shape.is_dynamic());

        let table = shape.table();
        assert_eq!(table.fields.len(), 2);
        assert!(table.fields[0].is_public());
        assert_eq!(table.fields[1].visibility(), FieldVisibility::Restricted);

        let read = table.fields[0].reader();
        assert_eq!(read(record.as_any()), Some(Value::from("A1")));

        let writer = table.fields[0].writer().expect("public field is writable");
        writer.write(record.as_any_mut(), Value::from("B2")).expect("string converts");
        assert_eq!(record.code, "B2");

        let getter = table.getters().next().expect("getter registered");
        assert_eq!(getter.get(record.as_any()), Some(Value::from(42)));
        assert!(getter.set(record.as_any_mut(), Value::NULL).is_none());
    }

    #[test]
    fn test_staging_leaves_record_untouched() {
        let mut record = Manual {
            code: "A1".to_string(),
            secret: 0,
        };
        let writer = record.record_shape().table().fields[0]
            .writer()
            .expect("public field is writable");

        let staged = writer.stage(Value::from(7)).expect("number converts to string");
        assert_eq!(record.code, "A1");

        writer.apply(record.as_any_mut(), staged).expect("staged for this field");
        assert_eq!(record.code, "7");
    }

    #[test]
    fn test_unstage_rejects_other_type() {
        let staged = stage_as::<i64>(Value::from(3)).expect("integer");
        assert_eq!(
            unstage::<String>(staged),
            Err(ConversionError::downcast(std::any::type_name::<String>()))
        );
    }

    #[test]
    fn test_reader_rejects_foreign_record() {
        let record = Manual {
            code: String::new(),
            secret: 0,
        };
        let read = record.record_shape().table().fields[0].reader();
        assert_eq!(read(&5_u8), None);
    }

    #[test]
    fn test_attribute_set_indexes_by_kind() {
        let mut set = AttributeSet::new();
        assert!(set.is_empty());

        set.insert(Attribute::new(Label("a")));
        set.insert(Attribute::new(Hidden));
        set.insert(Attribute::new(Label("b")));

        let labels: Vec<_> = set.of::<Label>().cloned().collect();
        assert_eq!(labels, vec![Label("a"), Label("b")]);
        assert_eq!(set.of::<Hidden>().count(), 1);
        assert_eq!(set.of::<String>().count(), 0);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_attribute_downcast() {
        let attr = Attribute::new(Label("x"));
        assert!(attr.is::<Label>());
        assert!(!attr.is::<Hidden>());
        assert_eq!(attr.downcast_ref::<Label>(), Some(&Label("x")));
        assert!(attr.type_name().ends_with("Label"));
    }
}
