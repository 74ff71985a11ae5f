//! Intermediate representation shared by the parsers and the code generators.

use syn::{Expr, Generics, Ident, Type};

/// A struct deriving `Introspectable`.
#[derive(Debug, Clone)]
pub struct RecordIR {
    pub ident: Ident,
    pub generics: Generics,
    pub kind: ShapeKind,
    /// Whether the shape lists the methods of the type's `AccessorTable`.
    pub accessors: bool,
    pub fields: Vec<FieldIR>,
}

impl RecordIR {
    pub fn new(ident: Ident, generics: Generics) -> Self {
        Self {
            ident,
            generics,
            kind: ShapeKind::Static,
            accessors: false,
            fields: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_accessors(mut self, accessors: bool) -> Self {
        self.accessors = accessors;
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldIR>) -> Self {
        self.fields = fields;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldVisibility {
    Public,
    Restricted,
}

/// One published field.
#[derive(Debug, Clone)]
pub struct FieldIR {
    pub ident: Ident,
    /// Identifier without the `r#` prefix.
    pub name: String,
    pub ty: Type,
    pub visibility: FieldVisibility,
    pub writable: bool,
    pub metadata: Vec<MetaIR>,
}

impl FieldIR {
    pub fn is_public(&self) -> bool {
        self.visibility == FieldVisibility::Public
    }
}

#[derive(Debug, Clone)]
pub enum MetaIR {
    Infallible(Expr),
    Fallible(Expr),
}

/// An `#[accessors]` impl block.
#[derive(Debug, Clone)]
pub struct AccessorBlockIR {
    pub self_ty: Type,
    pub generics: Generics,
    pub accessors: Vec<AccessorIR>,
}

#[derive(Debug, Clone)]
pub struct AccessorIR {
    pub ident: Ident,
    pub name: String,
    pub kind: AccessorKind,
    /// Argument type of a setter.
    pub argument: Option<Type>,
    /// The setter returns a `Result` whose error must be propagated.
    pub fallible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Getter,
    Setter,
}
