//! Error type shared by the parsers of this crate.

use proc_macro2::Span;
use std::fmt;

/// Error that occurred while parsing macro input.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Source span for error reporting.
    pub span: Option<Span>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Convert to a syn::Error for proc-macro error reporting.
    pub fn into_syn_error(self) -> syn::Error {
        let span = self.span.unwrap_or_else(Span::call_site);
        let mut error = syn::Error::new(span, &self.message);

        for suggestion in self.suggestions {
            error.combine(syn::Error::new(span, format!("suggestion: {}", suggestion)));
        }

        error
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<darling::Error> for ParseError {
    fn from(error: darling::Error) -> Self {
        ParseError::new(error.to_string()).with_span(error.span())
    }
}
