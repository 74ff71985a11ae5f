//! Text encodings of normalized graphs.
//!
//! Formatters are pure: they read a [`Normalized`] tree and return a
//! string. A tree may still hold opaque values left by a depth limit; those
//! are expanded before encoding with the [`Normalizer`] handed to
//! [`Formatter::format_expanded`], or a default one.

mod csv;
mod json;
mod plain_text;
mod xml;
mod yaml;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::plain_text::PlainTextFormatter;
pub use self::xml::XmlFormatter;
pub use self::yaml::YamlFormatter;

use std::borrow::Cow;

use crate::error::FormatResult;
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;
use crate::value::AsNode;

/// Encodes a normalized graph as text.
pub trait Formatter {
    /// Encode `value`, expanding opaque values with `normalizer`.
    fn format_expanded(&self, value: &Normalized, normalizer: &Normalizer)
        -> FormatResult<String>;

    fn format(&self, value: &Normalized) -> FormatResult<String> {
        self.format_expanded(value, &Normalizer::default())
    }

    /// Normalize `source` with default settings, then format it.
    fn format_source<S: AsNode + ?Sized>(&self, source: &S) -> FormatResult<String>
    where
        Self: Sized,
    {
        let normalizer = Normalizer::default();
        self.format_expanded(&normalizer.canonicalize(source), &normalizer)
    }
}

/// Replace an opaque value with its normalized form.
pub(crate) fn expand<'a>(value: &'a Normalized, normalizer: &Normalizer) -> Cow<'a, Normalized> {
    match value {
        Normalized::Opaque(inner) => Cow::Owned(normalizer.canonicalize(inner)),
        other => Cow::Borrowed(other),
    }
}

/// Text of a leaf, following the scalar text rule.
pub(crate) fn leaf_text(value: &Normalized) -> Option<String> {
    match value {
        Normalized::Scalar(scalar) => Some(scalar.to_text()),
        _ => None,
    }
}
