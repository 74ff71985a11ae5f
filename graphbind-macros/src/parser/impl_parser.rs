//! Parsing of `#[accessors]` impl blocks.
//!
//! A method registers as a getter when it takes `&self` only and returns
//! something, and as a setter when it takes `&mut self` plus one owned
//! argument. Generic, `async` and `unsafe` methods are never registered.
//! A setter returning `Result` is fallible: its error aborts the copy.

use darling::FromAttributes;
use syn::spanned::Spanned;
use syn::punctuated::Punctuated;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, Token, Type};

use crate::error::ParseError;
use crate::ir::{AccessorBlockIR, AccessorIR, AccessorKind};
use crate::parser::attributes::MethodAttrs;

pub struct ImplParser;

impl ImplParser {
    /// Collect the accessors of `item` and strip the `#[accessor]`
    /// attributes from its methods.
    pub fn parse(item: &mut ItemImpl) -> Result<AccessorBlockIR, ParseError> {
        if let Some((_, path, _)) = &item.trait_ {
            return Err(ParseError::new("#[accessors] only applies to inherent impl blocks")
                .with_span(path.span())
                .with_suggestion("move the accessor methods into an `impl Type { ... }` block"));
        }

        let mut accessors = Vec::new();
        for impl_item in &mut item.items {
            let ImplItem::Fn(method) = impl_item else {
                continue;
            };

            let attrs = MethodAttrs::from_attributes(&method.attrs)?;
            method.attrs.retain(|attr| !attr.path().is_ident("accessor"));
            if attrs.skip {
                continue;
            }

            if let Some(kind) = Self::classify(method) {
                let (argument, fallible) = match kind {
                    AccessorKind::Getter => (None, false),
                    AccessorKind::Setter => (
                        setter_argument(&method.sig.inputs),
                        returns_result(&method.sig.output),
                    ),
                };
                accessors.push(AccessorIR {
                    ident: method.sig.ident.clone(),
                    name: method.sig.ident.to_string(),
                    kind,
                    argument,
                    fallible,
                });
            }
        }

        Ok(AccessorBlockIR {
            self_ty: (*item.self_ty).clone(),
            generics: item.generics.clone(),
            accessors,
        })
    }

    fn classify(method: &ImplItemFn) -> Option<AccessorKind> {
        let sig = &method.sig;
        if !sig.generics.params.is_empty() || sig.asyncness.is_some() || sig.unsafety.is_some() {
            return None;
        }

        let mut inputs = sig.inputs.iter();
        let receiver = match inputs.next()? {
            FnArg::Receiver(receiver) if receiver.reference.is_some() => receiver,
            _ => return None,
        };
        let rest: Vec<&FnArg> = inputs.collect();

        match (receiver.mutability.is_some(), rest.as_slice()) {
            (false, []) if returns_value(&sig.output) => Some(AccessorKind::Getter),
            (true, [FnArg::Typed(arg)])
                if !matches!(*arg.ty, Type::Reference(_) | Type::ImplTrait(_)) =>
            {
                Some(AccessorKind::Setter)
            }
            _ => None,
        }
    }
}

fn setter_argument(inputs: &Punctuated<FnArg, Token![,]>) -> Option<Type> {
    inputs.iter().find_map(|input| match input {
        FnArg::Typed(arg) => Some((*arg.ty).clone()),
        FnArg::Receiver(_) => None,
    })
}

/// `Result<..>`, `io::Result<..>` and other paths ending in `Result`.
fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match &**ty {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

fn returns_value(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => !matches!(&**ty, Type::Tuple(tuple) if tuple.elems.is_empty()),
    }
}
