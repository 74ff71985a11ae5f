//! `AccessorTable` generation for `#[accessors]` impl blocks.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemImpl;

use crate::ir::{AccessorBlockIR, AccessorIR, AccessorKind};

pub struct AccessorTableGenerator;

impl AccessorTableGenerator {
    /// Emit the (already stripped) impl block followed by its
    /// `AccessorTable` impl.
    pub fn generate(item: &ItemImpl, block: &AccessorBlockIR) -> TokenStream {
        let self_ty = &block.self_ty;
        let (impl_generics, _, where_clause) = block.generics.split_for_impl();
        let entries: Vec<_> = block.accessors.iter().filter_map(Self::generate_entry).collect();

        quote! {
            #item

            impl #impl_generics ::graphbind::AccessorTable for #self_ty #where_clause {
                fn accessor_table() -> ::std::vec::Vec<::graphbind::MethodDef> {
                    ::std::vec![#(#entries),*]
                }
            }
        }
    }

    fn generate_entry(accessor: &AccessorIR) -> Option<TokenStream> {
        let ident = &accessor.ident;
        let name = &accessor.name;

        match accessor.kind {
            AccessorKind::Getter => Some(quote! {
                ::graphbind::MethodDef::getter(#name, |record| {
                    record
                        .downcast_ref::<Self>()
                        .map(|this| ::graphbind::ToValue::to_value(&this.#ident()))
                })
            }),
            AccessorKind::Setter => {
                let argument = accessor.argument.as_ref()?;
                let call = if accessor.fallible {
                    quote! {
                        this.#ident(::graphbind::unstage::<#argument>(staged)?).map_err(|error| {
                            ::graphbind::ConversionError::rejected(#name, error)
                        })?;
                    }
                } else {
                    quote! {
                        this.#ident(::graphbind::unstage::<#argument>(staged)?);
                    }
                };

                Some(quote! {
                    ::graphbind::MethodDef::setter(#name, ::graphbind::Writer::new(
                        ::graphbind::stage_as::<#argument>,
                        |record, staged| {
                            let this = record.downcast_mut::<Self>().ok_or(
                                ::graphbind::ConversionError::downcast(::std::any::type_name::<Self>()),
                            )?;
                            #call
                            ::std::result::Result::Ok(())
                        },
                    ))
                })
            }
        }
    }
}
