//! Rust code generation module.
//!
//! This module turns IR into the impl blocks emitted by the macros.

pub mod accessor_table;
pub mod impl_block;

pub use accessor_table::AccessorTableGenerator;
pub use impl_block::ImplBlockGenerator;
