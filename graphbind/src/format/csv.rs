use std::borrow::Cow;

use csv::{Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::format::{expand, leaf_text, Formatter};
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;

/// CSV output: a header line with the keys of the first row, then one line
/// per row.
///
/// A flat mapping is a single row. A mapping or sequence holding containers
/// is a table whose rows are those containers; mapping rows are aligned on
/// the header keys. Nested values inside a cell are written as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvFormatter {
    pub delimiter: u8,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "This method returns a new CsvFormatter and does not modify self"]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn cell(value: &Normalized, normalizer: &Normalizer) -> FormatResult<String> {
        match leaf_text(value) {
            Some(text) => Ok(text),
            None => Ok(serde_json::to_string(&normalizer.expanded(value))?),
        }
    }

    fn rows<'a>(table: &'a Normalized, normalizer: &Normalizer) -> Vec<Cow<'a, Normalized>> {
        let values: Vec<&Normalized> = match table {
            Normalized::Mapping(entries) => entries.values().collect(),
            Normalized::Sequence(items) => items.iter().collect(),
            _ => Vec::new(),
        };
        let expanded: Vec<Cow<'a, Normalized>> = values
            .into_iter()
            .map(|value| expand(value, normalizer))
            .collect();
        if expanded.iter().any(|v| v.is_container()) {
            expanded
        } else {
            vec![Cow::Borrowed(table)]
        }
    }
}

fn header(row: &Normalized) -> Vec<String> {
    match row {
        Normalized::Mapping(entries) => entries.keys().cloned().collect(),
        Normalized::Sequence(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => vec!["0".to_string()],
    }
}

impl Formatter for CsvFormatter {
    fn format_expanded(
        &self,
        value: &Normalized,
        normalizer: &Normalizer,
    ) -> FormatResult<String> {
        let value = expand(value, normalizer);
        let is_empty = match value.as_ref() {
            Normalized::Mapping(entries) => entries.is_empty(),
            Normalized::Sequence(items) => items.is_empty(),
            other => other.is_null(),
        };
        if is_empty {
            return Ok(String::new());
        }

        let rows = Self::rows(&value, normalizer);
        let columns = rows.first().map(|row| header(row)).unwrap_or_default();

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&columns)?;

        for row in &rows {
            let cells = match row.as_ref() {
                Normalized::Mapping(entries) if !entries.is_empty() => columns
                    .iter()
                    .map(|key| {
                        entries
                            .get(key)
                            .map_or_else(|| Ok(String::new()), |v| Self::cell(v, normalizer))
                    })
                    .collect::<FormatResult<Vec<_>>>()?,
                Normalized::Sequence(items) => items
                    .iter()
                    .map(|v| Self::cell(v, normalizer))
                    .collect::<FormatResult<Vec<_>>>()?,
                other => vec![Self::cell(other, normalizer)?],
            };
            writer.write_record(&cells)?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn person(id: i64, name: &str) -> Value {
        Value::map([("Id", Value::from(id)), ("Name", Value::from(name))])
    }

    #[test]
    fn test_single_mapping_is_one_row() {
        let out = CsvFormatter::new().format_source(&person(10, "Joao")).expect("csv");
        assert_eq!(out, "Id,Name\n10,Joao\n");
    }

    #[test]
    fn test_sequence_of_mappings() {
        let rows = vec![person(10, "Joao"), person(20, "JG")];
        let out = CsvFormatter::new().format_source(&rows).expect("csv");
        assert_eq!(out, "Id,Name\n10,Joao\n20,JG\n");
    }

    #[test]
    fn test_rows_follow_header_order() {
        let rows = vec![
            person(1, "a"),
            Value::map([("Name", Value::from("b")), ("Id", Value::from(2))]),
        ];
        let out = CsvFormatter::new().format_source(&rows).expect("csv");
        assert_eq!(out, "Id,Name\n1,a\n2,b\n");
    }

    #[test]
    fn test_quoting_and_delimiter() {
        let value = Value::map([("text", "a;b \"c\""), ("plain", "x")]);
        let out = CsvFormatter::new()
            .with_delimiter(b';')
            .format_source(&value)
            .expect("csv");
        assert_eq!(out, "text;plain\n\"a;b \"\"c\"\"\";x\n");
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<Value> = Vec::new();
        assert_eq!(CsvFormatter::new().format_source(&empty).expect("csv"), "");
        assert_eq!(CsvFormatter::new().format(&Normalized::NULL).expect("csv"), "");
    }

    #[test]
    fn test_nested_cells_are_json() {
        let rows = vec![Value::map([
            ("id", Value::from(1)),
            ("tags", Value::Seq(vec![Value::from("a")])),
        ])];
        let out = CsvFormatter::new().format_source(&rows).expect("csv");
        assert_eq!(out, "id,tags\n1,\"[\"\"a\"\"]\"\n");
    }
}
