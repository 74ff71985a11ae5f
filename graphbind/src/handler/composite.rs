use std::fmt;
use std::sync::Arc;

use regex::Captures;

use crate::handler::{DirectTransform, PropertyHandler};
use crate::naming::NamingPattern;
use crate::value::{Node, Value};

type NameFn = dyn Fn(&str) -> String + Send + Sync;

/// A handler built from closures.
#[derive(Clone)]
pub struct FnHandler {
    map_name: Arc<NameFn>,
    inner: DirectTransform,
}

impl FnHandler {
    pub fn new<F>(map_name: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            map_name: Arc::new(map_name),
            inner: DirectTransform::new(),
        }
    }

    #[must_use = "This method returns a new FnHandler and does not modify self"]
    pub fn with_value_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &str, Value, Option<Node<'_>>) -> Value + Send + Sync + 'static,
    {
        self.inner = DirectTransform::with_value_handler(handler);
        self
    }
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl PropertyHandler for FnHandler {
    fn map_name(&self, property: &str) -> String {
        (self.map_name)(property)
    }

    fn transform_value(
        &self,
        property: &str,
        target: &str,
        value: Value,
        source: Option<Node<'_>>,
    ) -> Value {
        self.inner.transform_value(property, target, value, source)
    }
}

/// Renames fields with a regular-expression find/replace rule.
///
/// ```
/// use graphbind::{PropertyHandler, RegexRename};
///
/// let rename = RegexRename::new(r"^m_(\w+)$", "$1").unwrap();
/// assert_eq!(rename.map_name("m_total"), "total");
/// assert_eq!(rename.map_name("other"), "other");
/// ```
#[derive(Debug, Clone)]
pub struct RegexRename {
    pattern: NamingPattern,
}

impl RegexRename {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: NamingPattern::new(pattern, replacement)?,
        })
    }

    /// Replace every match with the output of `callback`.
    pub fn with_callback<F>(pattern: &str, callback: F) -> Result<Self, regex::Error>
    where
        F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    {
        Ok(Self {
            pattern: NamingPattern::with_callback(pattern, callback)?,
        })
    }
}

impl From<NamingPattern> for RegexRename {
    fn from(pattern: NamingPattern) -> Self {
        Self { pattern }
    }
}

impl PropertyHandler for RegexRename {
    fn map_name(&self, property: &str) -> String {
        self.pattern.apply(property)
    }

    fn transform_value(
        &self,
        _property: &str,
        _target: &str,
        value: Value,
        _source: Option<Node<'_>>,
    ) -> Value {
        value
    }
}

/// Runs several handlers in sequence.
///
/// Each handler renames the output of the previous one. Values pass
/// through every transform in the same order, each call seeing the name
/// before and after that handler's rename.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn PropertyHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "This method returns a new HandlerChain and does not modify self"]
    pub fn then<H: PropertyHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl PropertyHandler for HandlerChain {
    fn map_name(&self, property: &str) -> String {
        self.handlers
            .iter()
            .fold(property.to_string(), |name, handler| handler.map_name(&name))
    }

    fn transform_value(
        &self,
        property: &str,
        _target: &str,
        value: Value,
        source: Option<Node<'_>>,
    ) -> Value {
        let mut name = property.to_string();
        let mut value = value;
        for handler in &self.handlers {
            let next = handler.map_name(&name);
            value = handler.transform_value(&name, &next, value, source);
            name = next;
        }
        value
    }
}
