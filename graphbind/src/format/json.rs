use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::format::Formatter;
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;

/// JSON output with keys in their normalized order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Formatter for JsonFormatter {
    fn format_expanded(
        &self,
        value: &Normalized,
        normalizer: &Normalizer,
    ) -> FormatResult<String> {
        let value = normalizer.expanded(value);
        let encoded = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_compact_json() {
        let value = Value::map([("Id", Value::from(10)), ("Name", Value::from("Joao"))]);
        let out = JsonFormatter::new().format_source(&value).expect("json");
        insta::assert_snapshot!(out, @r#"{"Id":10,"Name":"Joao"}"#);
    }

    #[test]
    fn test_pretty_json() {
        let value = Value::map([("a", Value::Seq(vec![Value::from(1)]))]);
        let out = JsonFormatter::pretty().format_source(&value).expect("json");
        assert_eq!(out, "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn test_opaque_values_are_expanded() {
        let value = Normalized::Opaque(Value::map([("x", Value::NULL)]));
        let out = JsonFormatter::new().format(&value).expect("json");
        insta::assert_snapshot!(out, @r#"{"x":null}"#);
    }
}
