//! # graphbind
//!
//! Normalize arbitrary Rust object graphs into ordered, JSON-like trees and
//! copy fields between records with pluggable renaming.
//!
//! Records describe themselves through the [`Introspectable`] capability,
//! usually generated with `#[derive(Introspectable)]`. The [`Normalizer`]
//! walks records, maps and sequences and produces a [`Normalized`] tree
//! whose mapping keys keep declaration order. [`ObjectCopy`] uses the same
//! machinery one level deep to copy fields into another record, resolving
//! each name against the target's setters and fields.
//!
//! ## Quick Start
//!
//! ```rust
//! use graphbind::{accessors, Introspectable, Serializer};
//!
//! #[derive(Debug, Clone, Default, Introspectable)]
//! #[introspect(accessors)]
//! struct Customer {
//!     #[allow(non_snake_case)]
//!     pub Id: i64,
//!     _name: String,
//! }
//!
//! #[accessors]
//! impl Customer {
//!     fn get_name(&self) -> String {
//!         self._name.clone()
//!     }
//!
//!     fn set_name(&mut self, name: String) {
//!         self._name = name;
//!     }
//! }
//!
//! let customer = Customer { Id: 10, _name: "Joao".into() };
//! let json = Serializer::new(&customer).to_json().unwrap();
//! assert_eq!(json, r#"{"Id":10,"name":"Joao"}"#);
//! ```
//!
//! ## Features
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `derive` | `#[derive(Introspectable)]` and `#[accessors]` | ✅ |
//! | `chrono` | Conversions for `chrono` date types | ❌ |
//! | `uuid` | Conversions for `uuid::Uuid` | ❌ |
//!
//! ## Container Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[introspect(accessors)]` | Read and write through methods registered with `#[accessors]` |
//! | `#[introspect(dynamic)]` | Publish accessors first, then public fields (implies `accessors`) |
//!
//! ## Field Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[introspect(skip)]` | Leave the field out entirely |
//! | `#[introspect(readonly)]` | Publish the field but never write it during a copy |
//! | `#[introspect(meta = EXPR)]` | Attach a metadata instance (repeatable) |
//! | `#[introspect(try_meta = EXPR)]` | Attach fallible metadata; errors mean "no metadata" |
//!
//! ## Naming
//!
//! Public fields keep their identifier. Non-`pub` fields are published under
//! the cleaned name (by default with every non-alphanumeric character
//! removed) and only when a getter `get` + name exists. Getter and setter
//! names are compared ignoring case and underscores.
//!
//! ## Limitations
//!
//! Cyclic graphs are not detected; normalizing one recurses until the stack
//! overflows.

extern crate self as graphbind;

pub mod cache;
pub mod config;
pub mod copy;
pub mod dynamic;
pub mod error;
pub mod format;
pub mod handler;
pub mod introspect;
pub mod naming;
pub mod normalized;
pub mod normalizer;
pub mod serializer;
pub mod value;

pub use cache::{FieldDescriptor, IntrospectionCache, WriteTable};
pub use config::{FieldContext, FieldHook, TraversalConfig, DEFAULT_ACCESSOR_PREFIX};
pub use copy::{copy, BindTarget, ObjectCopy, ObjectCopyExt};
pub use dynamic::DynamicRecord;
pub use error::{
    BindError, BindResult, ConversionError, FormatError, FormatResult, IntrospectionError,
    SerializeError,
};
pub use format::{
    CsvFormatter, Formatter, JsonFormatter, PlainTextFormatter, XmlFormatter, YamlFormatter,
};
pub use handler::{
    camel_to_snake, snake_to_camel, CamelToSnakeCase, DirectTransform, FnHandler, HandlerChain,
    PropertyHandler, PropertyNameMapper, RegexRename, SnakeToCamelCase, ValueHandler,
};
pub use introspect::{
    stage_as, unstage, AccessorTable, ApplyFn, Attribute, AttributeFactory, AttributeSet, FieldDef,
    FieldVisibility, Introspectable, MethodDef, MethodKind, ReadFn, RecordShape, ShapeTable,
    StageFn, Staged, Writer,
};
pub use naming::{
    fold_name, NameResolver, NamingPattern, PendingWrite, TargetRecord, WriteOutcome,
};
pub use normalized::{Mapping, Normalized};
pub use normalizer::Normalizer;
pub use serializer::Serializer;
pub use value::{AsNode, FromValue, Node, Record, Scalar, ToValue, Value};

// Re-export the macros when available
#[cfg(feature = "derive")]
pub use graphbind_macros::{accessors, Introspectable};
