//! Impl block generation for `#[derive(Introspectable)]`.
//!
//! Besides `Introspectable` itself, the derive emits the glue that lets the
//! record travel through the runtime: `ToValue`, `FromValue`, `AsNode` and
//! `BindTarget`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Generics};

use crate::ir::{FieldIR, FieldVisibility, MetaIR, RecordIR, ShapeKind};

/// Generates the impl blocks for one record.
pub struct ImplBlockGenerator;

impl Default for ImplBlockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ImplBlockGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate every impl block for a record.
    pub fn generate(&self, record: &RecordIR) -> TokenStream {
        let name = &record.ident;
        let generics = self.generate_generics(&record.generics);
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        let shape = self.generate_shape(record);

        quote! {
            impl #impl_generics ::graphbind::Introspectable for #name #ty_generics #where_clause {
                fn record_shape(&self) -> ::graphbind::RecordShape {
                    #shape
                }

                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                    self
                }

                fn into_any_arc(
                    self: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync> {
                    self
                }
            }

            impl #impl_generics ::graphbind::ToValue for #name #ty_generics #where_clause {
                fn to_value(&self) -> ::graphbind::Value {
                    ::graphbind::Value::Record(::graphbind::Record::new(::std::clone::Clone::clone(self)))
                }
            }

            impl #impl_generics ::graphbind::FromValue for #name #ty_generics #where_clause {
                fn from_value(
                    value: ::graphbind::Value,
                ) -> ::std::result::Result<Self, ::graphbind::ConversionError> {
                    let found = value.kind();
                    value
                        .as_record()
                        .and_then(|record| record.downcast_ref::<Self>())
                        .cloned()
                        .ok_or(::graphbind::ConversionError::mismatch(
                            ::std::any::type_name::<Self>(),
                            found,
                        ))
                }
            }

            impl #impl_generics ::graphbind::AsNode for #name #ty_generics #where_clause {
                fn as_node(&self) -> ::graphbind::Node<'_> {
                    ::graphbind::Node::Record(self)
                }
            }

            impl #impl_generics ::graphbind::BindTarget for #name #ty_generics #where_clause {
                fn bind_target(&mut self) -> ::graphbind::BindResult<::graphbind::TargetRecord<'_>> {
                    ::std::result::Result::Ok(::graphbind::TargetRecord::Typed(self))
                }
            }
        }
    }

    /// Build the `record_shape()` body.
    fn generate_shape(&self, record: &RecordIR) -> TokenStream {
        let fields: Vec<_> = record
            .fields
            .iter()
            .map(|field| self.generate_field(field))
            .collect();

        let methods = if record.accessors {
            quote! { <Self as ::graphbind::AccessorTable>::accessor_table() }
        } else {
            quote! { ::std::vec::Vec::new() }
        };

        let variant = match record.kind {
            ShapeKind::Static => quote! { Static },
            ShapeKind::Dynamic => quote! { Dynamic },
        };

        quote! {
            ::graphbind::RecordShape::#variant(::graphbind::ShapeTable::new(
                ::std::vec![#(#fields),*],
                #methods,
            ))
        }
    }

    /// Build one `FieldDef` expression.
    fn generate_field(&self, field: &FieldIR) -> TokenStream {
        let ident = &field.ident;
        let ty = &field.ty;
        let name = &field.name;
        let visibility = match field.visibility {
            FieldVisibility::Public => quote! { ::graphbind::FieldVisibility::Public },
            FieldVisibility::Restricted => quote! { ::graphbind::FieldVisibility::Restricted },
        };

        let writer = if field.writable {
            quote! {
                .with_writer(::graphbind::Writer::new(
                    ::graphbind::stage_as::<#ty>,
                    |record, staged| {
                        let this = record.downcast_mut::<Self>().ok_or(
                            ::graphbind::ConversionError::downcast(::std::any::type_name::<Self>()),
                        )?;
                        this.#ident = ::graphbind::unstage::<#ty>(staged)?;
                        ::std::result::Result::Ok(())
                    },
                ))
            }
        } else {
            quote! {}
        };

        let attributes: Vec<_> = field
            .metadata
            .iter()
            .map(|meta| self.generate_attribute(name, meta))
            .collect();

        quote! {
            ::graphbind::FieldDef::new(#name, #visibility, |record| {
                record
                    .downcast_ref::<Self>()
                    .map(|this| <#ty as ::graphbind::ToValue>::to_value(&this.#ident))
            })
            #writer
            #(#attributes)*
        }
    }

    fn generate_attribute(&self, field_name: &str, meta: &MetaIR) -> TokenStream {
        match meta {
            MetaIR::Infallible(expr) => quote! {
                .with_attribute(|| ::std::result::Result::Ok(::graphbind::Attribute::new(#expr)))
            },
            MetaIR::Fallible(expr) => quote! {
                .with_attribute(|| match #expr {
                    ::std::result::Result::Ok(instance) => {
                        ::std::result::Result::Ok(::graphbind::Attribute::new(instance))
                    }
                    ::std::result::Result::Err(error) => ::std::result::Result::Err(
                        ::graphbind::IntrospectionError::attribute(#field_name, error),
                    ),
                })
            },
        }
    }

    /// Bound every type parameter so the record can be shared and converted.
    fn generate_generics(&self, generics: &Generics) -> Generics {
        let mut generics = generics.clone();
        let params: Vec<_> = generics.type_params().map(|p| p.ident.clone()).collect();
        if params.is_empty() {
            return generics;
        }

        let where_clause = generics.make_where_clause();
        for param in params {
            where_clause.predicates.push(parse_quote! {
                #param: ::std::clone::Clone
                    + ::std::marker::Send
                    + ::std::marker::Sync
                    + 'static
                    + ::graphbind::ToValue
                    + ::graphbind::FromValue
            });
        }
        generics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::struct_parser::StructParser;
    use syn::DeriveInput;

    /// Generated code with all whitespace removed.
    fn generate(input: DeriveInput) -> String {
        let record = StructParser::parse(&input).unwrap();
        let tokens = ImplBlockGenerator::new().generate(&record);
        syn::parse2::<syn::File>(tokens.clone()).expect("generated code parses");
        tokens.to_string().split_whitespace().collect()
    }

    #[test]
    fn test_generates_all_impls() {
        let output = generate(parse_quote! {
            struct Customer {
                pub id: i64,
                name: String,
            }
        });

        for expected in [
            "::graphbind::IntrospectableforCustomer",
            "::graphbind::ToValueforCustomer",
            "::graphbind::FromValueforCustomer",
            "::graphbind::AsNodeforCustomer",
            "::graphbind::BindTargetforCustomer",
        ] {
            assert!(output.contains(expected), "missing {expected}");
        }
        assert!(output.contains("RecordShape::Static"));
        assert!(output.contains("\"id\""));
        assert!(output.contains("FieldVisibility::Restricted"));
        assert!(output.contains("::std::vec::Vec::new()"));
    }

    #[test]
    fn test_writer_only_for_public_mutable_fields() {
        let output = generate(parse_quote! {
            struct Customer {
                pub id: i64,
                #[introspect(readonly)]
                pub code: String,
                name: String,
            }
        });

        assert_eq!(output.matches("with_writer").count(), 1);
        assert!(output.contains("::graphbind::stage_as::<i64>"));
        assert!(output.contains("this.id=::graphbind::unstage::<i64>(staged)?"));
    }

    #[test]
    fn test_dynamic_shape_uses_accessor_table() {
        let output = generate(parse_quote! {
            #[introspect(dynamic)]
            struct Bag {
                pub a: i64,
            }
        });

        assert!(output.contains("RecordShape::Dynamic"));
        assert!(output.contains("<Selfas::graphbind::AccessorTable>::accessor_table()"));
    }

    #[test]
    fn test_metadata_closures() {
        let output = generate(parse_quote! {
            struct Tagged {
                #[introspect(meta = Label("id"), try_meta = Label::parse("x"))]
                pub id: i64,
            }
        });

        assert_eq!(output.matches("with_attribute").count(), 2);
        assert!(output.contains("IntrospectionError::attribute(\"id\",error)"));
    }

    #[test]
    fn test_generic_bounds() {
        let output = generate(parse_quote! {
            struct Wrapper<T> {
                pub inner: T,
            }
        });

        assert!(output.contains("impl<T>::graphbind::IntrospectableforWrapper<T>"));
        assert!(output.contains("T:::std::clone::Clone"));
        assert!(output.contains("::graphbind::FromValue"));
    }
}
