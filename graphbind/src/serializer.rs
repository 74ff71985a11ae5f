//! One-stop facade: pick a source, tune the traversal, pick an output.
//!
//! ```
//! use graphbind::{Serializer, Value};
//!
//! let source = Value::map([("Id", Value::from(10)), ("gone", Value::NULL)]);
//! let json = Serializer::new(&source).with_drop_nulls(true).to_json().unwrap();
//! assert_eq!(json, r#"{"Id":10}"#);
//! ```

use std::any::Any;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::IntrospectionCache;
use crate::config::{FieldContext, FieldHook, TraversalConfig};
use crate::error::{FormatResult, SerializeError};
use crate::format::{
    CsvFormatter, Formatter, JsonFormatter, PlainTextFormatter, XmlFormatter, YamlFormatter,
};
use crate::naming::NamingPattern;
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;
use crate::value::{AsNode, Node, Value};

#[derive(Debug, Clone)]
enum Source<'a> {
    Borrowed(Node<'a>),
    Owned(Value),
}

/// Builder around a [`Normalizer`] run on a single source.
#[derive(Debug, Clone)]
pub struct Serializer<'a> {
    source: Source<'a>,
    config: TraversalConfig,
    cache: Arc<IntrospectionCache>,
}

impl<'a> Serializer<'a> {
    fn with_source(source: Source<'a>) -> Self {
        Self {
            source,
            config: TraversalConfig::default(),
            cache: IntrospectionCache::global(),
        }
    }

    /// Serialize a borrowed record, map, sequence or value.
    pub fn new<S: AsNode + ?Sized>(source: &'a S) -> Self {
        Self::with_source(Source::Borrowed(source.as_node()))
    }

    pub fn from_value(value: Value) -> Self {
        Self::with_source(Source::Owned(value))
    }

    pub fn from_json(content: &str) -> Result<Self, SerializeError> {
        let parsed: serde_json::Value = serde_json::from_str(content)?;
        Ok(Self::from_value(parsed.into()))
    }

    pub fn from_yaml(content: &str) -> Result<Self, SerializeError> {
        let parsed: serde_json::Value = serde_yaml::from_str(content)?;
        Ok(Self::from_value(parsed.into()))
    }

    /// Start from any `serde` serializable value.
    pub fn from_serde<T: Serialize + ?Sized>(source: &T) -> Result<Self, SerializeError> {
        Ok(Self::from_value(serde_json::to_value(source)?.into()))
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_config(mut self, config: TraversalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_cache(mut self, cache: Arc<IntrospectionCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config = self.config.with_max_depth(depth);
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_stop_at_first_level(mut self) -> Self {
        self.config = self.config.with_stop_at_first_level();
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_only_string(mut self, enabled: bool) -> Self {
        self.config = self.config.with_only_string(enabled);
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_drop_nulls(mut self, enabled: bool) -> Self {
        self.config = self.config.with_drop_nulls(enabled);
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_excluded_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.with_excluded_fields(names);
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn without_excluded_fields(mut self) -> Self {
        self.config = self.config.without_excluded_fields();
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_opaque_type<T: Any>(mut self) -> Self {
        self.config = self.config.with_opaque_type::<T>();
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_naming_pattern(mut self, pattern: NamingPattern) -> Self {
        self.config = self.config.with_naming_pattern(pattern);
        self
    }

    #[must_use = "This method returns a new Serializer and does not modify self"]
    pub fn with_accessor_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config = self.config.with_accessor_prefix(prefix);
        self
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    fn normalize_with(&self, config: TraversalConfig) -> Normalized {
        let normalizer = Normalizer::with_cache(config, Arc::clone(&self.cache));
        match &self.source {
            Source::Borrowed(node) => normalizer.canonicalize_node(*node),
            Source::Owned(value) => normalizer.canonicalize(value),
        }
    }

    pub fn to_normalized(&self) -> Normalized {
        self.normalize_with(self.config.clone())
    }

    /// Normalize with a hook that sees each field's metadata of kind `A`.
    pub fn parse_attributes<A, F>(&self, hook: F) -> Normalized
    where
        A: Any + Send + Sync,
        F: Fn(Option<&A>, Normalized, &FieldContext<'_>) -> Normalized + Send + Sync + 'static,
    {
        let config = self
            .config
            .clone()
            .with_field_hook(FieldHook::for_attribute::<A, F>(hook));
        self.normalize_with(config)
    }

    /// Expands opaque values left in the output, through this serializer's
    /// cache.
    fn expander(&self) -> Normalizer {
        Normalizer::with_cache(TraversalConfig::default(), Arc::clone(&self.cache))
    }

    /// Normalize, then rebuild the output as a `serde` type.
    pub fn to_serde<T: DeserializeOwned>(&self) -> Result<T, SerializeError> {
        let normalized = self.to_normalized();
        let encoded = serde_json::to_value(self.expander().expanded(&normalized))?;
        Ok(serde_json::from_value(encoded)?)
    }

    pub fn format_with<F: Formatter + ?Sized>(&self, formatter: &F) -> FormatResult<String> {
        formatter.format_expanded(&self.to_normalized(), &self.expander())
    }

    pub fn to_json(&self) -> FormatResult<String> {
        self.format_with(&JsonFormatter::new())
    }

    pub fn to_yaml(&self) -> FormatResult<String> {
        self.format_with(&YamlFormatter::new())
    }

    pub fn to_xml(&self) -> FormatResult<String> {
        self.format_with(&XmlFormatter::new())
    }

    pub fn to_csv(&self) -> FormatResult<String> {
        self.format_with(&CsvFormatter::new())
    }

    pub fn to_plain_text(&self) -> FormatResult<String> {
        self.format_with(&PlainTextFormatter::new())
    }
}
