//! Parsers turning macro input into IR.
//!
//! - Struct definitions for `#[derive(Introspectable)]`
//! - Inherent impl blocks for `#[accessors]`
//! - `#[introspect]` and `#[accessor]` attributes

pub mod attributes;
pub mod impl_parser;
pub mod struct_parser;
