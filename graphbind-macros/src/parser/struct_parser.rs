//! Struct parsing logic.
//!
//! Only structs with named fields can be introspected; anything else is
//! rejected with a hint about what to use instead.

use darling::{FromDeriveInput, FromField};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Visibility};

use crate::error::ParseError;
use crate::ir::{FieldIR, FieldVisibility, MetaIR, RecordIR, ShapeKind};
use crate::parser::attributes::{ContainerAttrs, FieldAttrs};

/// Error type for struct parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StructParseError {
    #[error("Failed to parse container attributes: {0}")]
    ContainerAttrs(String),

    #[error("Failed to parse field attributes: {0}")]
    FieldAttrs(String),

    #[error("{0}")]
    Unsupported(ParseError),

    #[error("Field at index {0} has no identifier")]
    MissingFieldIdent(usize),
}

/// Parses struct definitions into [`RecordIR`].
pub struct StructParser;

impl StructParser {
    pub fn parse(input: &DeriveInput) -> Result<RecordIR, StructParseError> {
        Self::check_shape(input)?;

        let container_attrs = ContainerAttrs::from_derive_input(input)
            .map_err(|e| StructParseError::ContainerAttrs(e.to_string()))?;

        let fields = match &input.data {
            Data::Struct(data) => Self::parse_fields(&data.fields)?,
            _ => Vec::new(),
        };

        let kind = if container_attrs.dynamic {
            ShapeKind::Dynamic
        } else {
            ShapeKind::Static
        };

        Ok(
            RecordIR::new(container_attrs.ident.clone(), container_attrs.generics.clone())
                .with_kind(kind)
                .with_accessors(container_attrs.uses_accessors())
                .with_fields(fields),
        )
    }

    fn check_shape(input: &DeriveInput) -> Result<(), StructParseError> {
        let span = input.ident.span();
        let error = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(_) => return Ok(()),
                Fields::Unnamed(_) => ParseError::new(
                    "Introspectable cannot be derived for tuple structs",
                )
                .with_suggestion("give the fields names so they can be published"),
                Fields::Unit => {
                    ParseError::new("Introspectable cannot be derived for unit structs")
                        .with_suggestion("add named fields or use a plain value instead")
                }
            },
            Data::Enum(_) => ParseError::new("Introspectable cannot be derived for enums")
                .with_suggestion("wrap the enum in a struct field and implement ToValue for it"),
            Data::Union(_) => ParseError::new("Introspectable cannot be derived for unions"),
        };
        Err(StructParseError::Unsupported(error.with_span(span)))
    }

    fn parse_fields(fields: &Fields) -> Result<Vec<FieldIR>, StructParseError> {
        let mut parsed = Vec::new();

        for (index, field) in fields.iter().enumerate() {
            let attrs = FieldAttrs::from_field(field)
                .map_err(|e| StructParseError::FieldAttrs(e.to_string()))?;
            if attrs.skip {
                continue;
            }

            let ident = attrs
                .ident
                .clone()
                .ok_or(StructParseError::MissingFieldIdent(index))?;

            let visibility = match attrs.vis {
                Visibility::Public(_) => FieldVisibility::Public,
                _ => FieldVisibility::Restricted,
            };

            let metadata = attrs
                .meta
                .iter()
                .cloned()
                .map(MetaIR::Infallible)
                .chain(attrs.try_meta.iter().cloned().map(MetaIR::Fallible))
                .collect();

            parsed.push(FieldIR {
                name: ident.unraw().to_string(),
                ident,
                ty: attrs.ty,
                visibility,
                writable: visibility == FieldVisibility::Public && !attrs.readonly,
                metadata,
            });
        }

        Ok(parsed)
    }
}
