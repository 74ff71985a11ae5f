//! Property handlers: rename and transform values while copying.
//!
//! A handler maps a source field name to a target field name and may
//! rewrite the value on the way. Handlers hold no mutable state and are
//! shared freely between copies and threads.

mod case;
mod composite;
mod name_mapper;

pub use case::{camel_to_snake, snake_to_camel, CamelToSnakeCase, SnakeToCamelCase};
pub use composite::{FnHandler, HandlerChain, RegexRename};
pub use name_mapper::PropertyNameMapper;

use std::fmt;
use std::sync::Arc;

use crate::value::{Node, Value};

/// Value transform injected into a handler:
/// `(source_name, target_name, value, source) -> value`.
pub type ValueHandler = Arc<dyn Fn(&str, &str, Value, Option<Node<'_>>) -> Value + Send + Sync>;

/// Renaming and value-transformation policy for copies.
pub trait PropertyHandler: Send + Sync {
    fn map_name(&self, property: &str) -> String;

    fn transform_value(
        &self,
        property: &str,
        target: &str,
        value: Value,
        source: Option<Node<'_>>,
    ) -> Value;
}

impl<H: PropertyHandler + ?Sized> PropertyHandler for Arc<H> {
    fn map_name(&self, property: &str) -> String {
        (**self).map_name(property)
    }

    fn transform_value(
        &self,
        property: &str,
        target: &str,
        value: Value,
        source: Option<Node<'_>>,
    ) -> Value {
        (**self).transform_value(property, target, value, source)
    }
}

impl<H: PropertyHandler + ?Sized> PropertyHandler for Box<H> {
    fn map_name(&self, property: &str) -> String {
        (**self).map_name(property)
    }

    fn transform_value(
        &self,
        property: &str,
        target: &str,
        value: Value,
        source: Option<Node<'_>>,
    ) -> Value {
        (**self).transform_value(property, target, value, source)
    }
}

/// Keeps names as they are; optionally rewrites values.
#[derive(Clone, Default)]
pub struct DirectTransform {
    value_handler: Option<ValueHandler>,
}

impl DirectTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, Value, Option<Node<'_>>) -> Value + Send + Sync + 'static,
    {
        Self {
            value_handler: Some(Arc::new(handler)),
        }
    }

    pub(crate) fn from_handler(value_handler: Option<ValueHandler>) -> Self {
        Self { value_handler }
    }

    pub fn has_value_handler(&self) -> bool {
        self.value_handler.is_some()
    }
}

impl fmt::Debug for DirectTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectTransform")
            .field("value_handler", &self.value_handler.is_some())
            .finish()
    }
}

impl PropertyHandler for DirectTransform {
    fn map_name(&self, property: &str) -> String {
        property.to_string()
    }

    fn transform_value(
        &self,
        property: &str,
        target: &str,
        value: Value,
        source: Option<Node<'_>>,
    ) -> Value {
        match &self.value_handler {
            Some(handler) => handler(property, target, value, source),
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_transform_identity() {
        let handler = DirectTransform::new();
        assert!(!handler.has_value_handler());
        assert_eq!(handler.map_name("Name"), "Name");
        assert_eq!(
            handler.transform_value("Name", "Name", Value::from("Joao"), None),
            Value::from("Joao")
        );
    }

    #[test]
    fn test_direct_transform_with_value_handler() {
        let handler = DirectTransform::with_value_handler(|property, target, value, _| {
            Value::from(format!("{property}-{target}-{value}"))
        });
        assert_eq!(
            handler.transform_value("Id", "Id", Value::from(10), None),
            Value::from("Id-Id-10")
        );
    }

    #[test]
    fn test_value_handler_sees_source() {
        let source = Value::map([("first", "Joao"), ("last", "Gilberto")]);
        let handler = DirectTransform::with_value_handler(|property, _, value, source| {
            match (property, source.and_then(|s| s.get("last"))) {
                ("first", Some(last)) => Value::from(format!("{value} {last}")),
                _ => value,
            }
        });
        let out = handler.transform_value(
            "first",
            "first",
            Value::from("Joao"),
            Some(Node::Value(&source)),
        );
        assert_eq!(out, Value::from("Joao Gilberto"));
    }

    #[test]
    fn test_shared_handlers_delegate() {
        let shared: Arc<dyn PropertyHandler> = Arc::new(SnakeToCamelCase::new());
        assert_eq!(shared.map_name("client_name"), "clientName");
        let boxed: Box<dyn PropertyHandler> = Box::new(CamelToSnakeCase::new());
        assert_eq!(boxed.map_name("clientName"), "client_name");
    }
}
