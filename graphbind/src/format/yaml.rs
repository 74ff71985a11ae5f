use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::format::Formatter;
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;

/// Block-style YAML output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YamlFormatter;

impl YamlFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for YamlFormatter {
    fn format_expanded(
        &self,
        value: &Normalized,
        normalizer: &Normalizer,
    ) -> FormatResult<String> {
        let value = normalizer.expanded(value);
        Ok(serde_yaml::to_string(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_yaml_mapping() {
        let value = Value::map([
            ("Id", Value::from(10)),
            ("Name", Value::from("Joao")),
            ("Tags", Value::Seq(vec![Value::from("a"), Value::from("b")])),
        ]);
        let out = YamlFormatter::new().format_source(&value).expect("yaml");
        assert_eq!(out, "Id: 10\nName: Joao\nTags:\n- a\n- b\n");
    }

    #[test]
    fn test_yaml_null() {
        let value = Value::map([("gone", Value::NULL)]);
        let out = YamlFormatter::new().format_source(&value).expect("yaml");
        assert_eq!(out, "gone: null\n");
    }
}
