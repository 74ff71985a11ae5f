use std::collections::HashMap;

use crate::handler::{DirectTransform, PropertyHandler};
use crate::value::{Node, Value};

/// Renames fields through a fixed dictionary; names not in it pass through.
#[derive(Debug, Clone, Default)]
pub struct PropertyNameMapper {
    names: HashMap<String, String>,
    inner: DirectTransform,
}

impl PropertyNameMapper {
    pub fn new<I, K, V>(names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            inner: DirectTransform::new(),
        }
    }

    #[must_use = "This method returns a new PropertyNameMapper and does not modify self"]
    pub fn with_value_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &str, Value, Option<Node<'_>>) -> Value + Send + Sync + 'static,
    {
        self.inner = DirectTransform::with_value_handler(handler);
        self
    }

    pub fn target_of(&self, property: &str) -> Option<&str> {
        self.names.get(property).map(String::as_str)
    }
}

impl PropertyHandler for PropertyNameMapper {
    fn map_name(&self, property: &str) -> String {
        self.target_of(property).unwrap_or(property).to_string()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_and_unmapped_names() {
        let mapper = PropertyNameMapper::new([("id_model", "Id"), ("client_name", "Name")]);
        assert_eq!(mapper.map_name("id_model"), "Id");
        assert_eq!(mapper.map_name("client_name"), "Name");
        assert_eq!(mapper.map_name("age"), "age");
        assert_eq!(mapper.target_of("age"), None);
    }

    #[test]
    fn test_value_handler_receives_both_names() {
        let mapper = PropertyNameMapper::new([("a", "b")])
            .with_value_handler(|from, to, _, _| Value::from(format!("{from}->{to}")));
        let target = mapper.map_name("a");
        assert_eq!(
            mapper.transform_value("a", &target, Value::NULL, None),
            Value::from("a->b")
        );
    }
}
