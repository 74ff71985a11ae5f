use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::format::{expand, leaf_text, Formatter};
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;

/// Line-oriented text: one leaf per line, containers flattened in order.
///
/// Each entry is written as `start_of_line`, then either the nested entries
/// or the leaf text (with `key=` in front unless property names are
/// ignored), then `break_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTextFormatter {
    pub break_line: String,
    pub start_of_line: String,
    pub ignore_property_name: bool,
}

impl Default for PlainTextFormatter {
    fn default() -> Self {
        Self {
            break_line: "\n".to_string(),
            start_of_line: String::new(),
            ignore_property_name: true,
        }
    }
}

impl PlainTextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "This method returns a new PlainTextFormatter and does not modify self"]
    pub fn with_break_line(mut self, break_line: impl Into<String>) -> Self {
        self.break_line = break_line.into();
        self
    }

    #[must_use = "This method returns a new PlainTextFormatter and does not modify self"]
    pub fn with_start_of_line(mut self, start_of_line: impl Into<String>) -> Self {
        self.start_of_line = start_of_line.into();
        self
    }

    #[must_use = "This method returns a new PlainTextFormatter and does not modify self"]
    pub fn with_ignore_property_name(mut self, ignore: bool) -> Self {
        self.ignore_property_name = ignore;
        self
    }

    fn write_entries(
        &self,
        out: &mut String,
        value: &Normalized,
        normalizer: &Normalizer,
    ) -> FormatResult<()> {
        let value = expand(value, normalizer);
        let entries: Vec<(String, &Normalized)> = match value.as_ref() {
            Normalized::Mapping(entries) => entries.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Normalized::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };

        for (key, child) in entries {
            out.push_str(&self.start_of_line);
            let child = expand(child, normalizer);
            match leaf_text(&child) {
                Some(text) if self.ignore_property_name => out.push_str(&text),
                Some(text) => write!(out, "{key}={text}")?,
                None => self.write_entries(out, &child, normalizer)?,
            }
            out.push_str(&self.break_line);
        }
        Ok(())
    }
}

impl Formatter for PlainTextFormatter {
    fn format_expanded(
        &self,
        value: &Normalized,
        normalizer: &Normalizer,
    ) -> FormatResult<String> {
        let mut out = String::new();
        match leaf_text(value) {
            Some(text) => out.push_str(&text),
            None => self.write_entries(&mut out, value, normalizer)?,
        }
        Ok(out)
    }
}
