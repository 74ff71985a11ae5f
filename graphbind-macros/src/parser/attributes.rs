//! Attribute parsing using darling.
//!
//! `#[introspect(...)]` is accepted on the struct and on its fields;
//! `#[accessor(...)]` on methods inside an `#[accessors]` impl block.

use darling::{FromAttributes, FromDeriveInput, FromField};
use syn::{Expr, Generics, Ident, Type, Visibility};

/// Container-level attributes parsed from `#[introspect(...)]` on the struct.
#[derive(Debug, Clone, FromDeriveInput)]
#[darling(attributes(introspect), supports(struct_named))]
pub struct ContainerAttrs {
    /// The identifier of the type
    pub ident: Ident,

    /// Generic parameters of the type
    pub generics: Generics,

    /// Pull accessor methods from the type's `AccessorTable` impl
    #[darling(default)]
    pub accessors: bool,

    /// Publish accessors first, then uncovered public fields
    #[darling(default)]
    pub dynamic: bool,
}

impl ContainerAttrs {
    /// Whether the generated shape should reference `AccessorTable`.
    pub fn uses_accessors(&self) -> bool {
        self.accessors || self.dynamic
    }
}

/// Field-level attributes parsed from `#[introspect(...)]` on struct fields.
#[derive(Debug, Clone, FromField)]
#[darling(attributes(introspect))]
pub struct FieldAttrs {
    /// The field identifier (None for tuple fields)
    pub ident: Option<Ident>,

    /// The field type
    pub ty: Type,

    /// The field visibility
    pub vis: Visibility,

    /// Leave the field out of the shape
    #[darling(default)]
    pub skip: bool,

    /// Publish the field without a writer
    #[darling(default)]
    pub readonly: bool,

    /// Metadata instances, evaluated lazily
    #[darling(multiple)]
    pub meta: Vec<Expr>,

    /// Metadata expressions returning `Result<A, E>`
    #[darling(multiple)]
    pub try_meta: Vec<Expr>,
}

/// Method-level attributes parsed from `#[accessor(...)]`.
#[derive(Debug, Clone, Default, FromAttributes)]
#[darling(attributes(accessor))]
pub struct MethodAttrs {
    /// Keep the method out of the accessor table
    #[darling(default)]
    pub skip: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput};

    #[test]
    fn test_container_flags() {
        let input: DeriveInput = parse_quote! {
            #[introspect(dynamic)]
            struct Person {
                pub name: String,
            }
        };
        let attrs = ContainerAttrs::from_derive_input(&input).unwrap();
        assert!(!attrs.accessors);
        assert!(attrs.dynamic);
        assert!(attrs.uses_accessors());
    }

    #[test]
    fn test_container_defaults() {
        let input: DeriveInput = parse_quote! {
            struct Person {
                pub name: String,
            }
        };
        let attrs = ContainerAttrs::from_derive_input(&input).unwrap();
        assert!(!attrs.uses_accessors());
    }

    #[test]
    fn test_container_rejects_enum() {
        let input: DeriveInput = parse_quote! {
            enum Shape {
                Circle,
            }
        };
        assert!(ContainerAttrs::from_derive_input(&input).is_err());
    }

    #[test]
    fn test_field_attrs_collect_repeated_meta() {
        let field: syn::Field = parse_quote! {
            #[introspect(meta = Label("id"), meta = Hidden, try_meta = Label::parse("x"))]
            pub id: i64
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.meta.len(), 2);
        assert_eq!(attrs.try_meta.len(), 1);
        assert!(!attrs.skip);
        assert!(!attrs.readonly);
    }

    #[test]
    fn test_field_flags() {
        let field: syn::Field = parse_quote! {
            #[introspect(skip, readonly)]
            cache: Vec<u8>
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.skip);
        assert!(attrs.readonly);
        assert!(matches!(attrs.vis, Visibility::Inherited));
    }

    #[test]
    fn test_method_attrs() {
        let method: syn::ImplItemFn = parse_quote! {
            #[accessor(skip)]
            fn get_internal(&self) -> u8 { 0 }
        };
        let attrs = MethodAttrs::from_attributes(&method.attrs).unwrap();
        assert!(attrs.skip);
    }
}
