//! # graphbind-macros
//!
//! Procedural macros generating the introspection tables used by
//! `graphbind`. Use them through the re-exports in the `graphbind` crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graphbind::{accessors, Introspectable};
//!
//! #[derive(Clone, Introspectable)]
//! #[introspect(accessors)]
//! struct User {
//!     pub id: i64,
//!     #[introspect(meta = Label("display"))]
//!     name: String,
//! }
//!
//! #[accessors]
//! impl User {
//!     fn get_name(&self) -> String {
//!         self.name.clone()
//!     }
//! }
//! ```
//!
//! ## Attributes
//!
//! ### Container Attributes (on the struct)
//!
//! - `#[introspect(accessors)]` - List the methods registered by `#[accessors]`
//! - `#[introspect(dynamic)]` - Publish accessors first, then uncovered public fields
//!
//! ### Field Attributes
//!
//! - `#[introspect(skip)]` - Leave the field out
//! - `#[introspect(readonly)]` - Never generate a writer
//! - `#[introspect(meta = EXPR)]` - Attach a metadata instance
//! - `#[introspect(try_meta = EXPR)]` - Attach metadata from a `Result`
//!
//! ### Method Attributes (inside `#[accessors]`)
//!
//! - `#[accessor(skip)]` - Do not register the method

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl};

mod codegen;
mod error;
mod ir;
mod parser;

use codegen::{AccessorTableGenerator, ImplBlockGenerator};
use parser::impl_parser::ImplParser;
use parser::struct_parser::{StructParseError, StructParser};

/// Derive macro implementing `Introspectable` for a struct with named fields.
///
/// The struct must be `Clone + Send + Sync + 'static`; every published
/// field must implement `ToValue`, and every writable one `FromValue`.
#[proc_macro_derive(Introspectable, attributes(introspect))]
pub fn derive_introspectable(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match derive_introspectable_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn derive_introspectable_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let record = StructParser::parse(input).map_err(|e| convert_parse_error(e, input))?;

    let generator = ImplBlockGenerator::new();
    Ok(generator.generate(&record))
}

/// Register the getters and setters of an inherent impl block.
///
/// Implements `AccessorTable` for the impl's self type. Getters take
/// `&self` and return a value; setters take `&mut self` and one owned
/// argument. A setter returning `Result<_, E>` with `E: Display` fails the
/// copy when it returns `Err`.
#[proc_macro_attribute]
pub fn accessors(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        let args = proc_macro2::TokenStream::from(args);
        return syn::Error::new_spanned(args, "#[accessors] takes no arguments")
            .into_compile_error()
            .into();
    }

    let mut item = syn::parse_macro_input!(input as ItemImpl);

    match ImplParser::parse(&mut item) {
        Ok(block) => AccessorTableGenerator::generate(&item, &block).into(),
        Err(err) => err.into_syn_error().into_compile_error().into(),
    }
}

/// Convert a StructParseError to a syn::Error with proper span information.
fn convert_parse_error(error: StructParseError, input: &DeriveInput) -> syn::Error {
    match error {
        StructParseError::ContainerAttrs(msg) => syn::Error::new_spanned(
            &input.ident,
            format!("Invalid container attributes: {}", msg),
        ),
        StructParseError::FieldAttrs(msg) => {
            syn::Error::new_spanned(&input.ident, format!("Invalid field attributes: {}", msg))
        }
        StructParseError::Unsupported(parse_error) => parse_error.into_syn_error(),
        StructParseError::MissingFieldIdent(index) => syn::Error::new_spanned(
            &input.ident,
            format!("Field at index {} has no identifier", index),
        ),
    }
}
