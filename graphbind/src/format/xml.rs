use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, FormatResult};
use crate::format::{expand, leaf_text, Formatter};
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;

const DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

/// XML output. Mapping keys become element names; sequence items and
/// numeric keys use the list element, optionally suffixed with the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlFormatter {
    pub root_element: String,
    pub list_element: String,
    pub index_suffix: bool,
}

impl Default for XmlFormatter {
    fn default() -> Self {
        Self {
            root_element: "root".to_string(),
            list_element: "item".to_string(),
            index_suffix: false,
        }
    }
}

fn xml_error(error: impl std::fmt::Display) -> FormatError {
    FormatError::Xml(error.to_string())
}

fn is_numeric(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn check_name(name: &str) -> FormatResult<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid_start && valid_rest {
        Ok(name)
    } else {
        Err(FormatError::XmlName(name.to_string()))
    }
}

impl XmlFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "This method returns a new XmlFormatter and does not modify self"]
    pub fn with_root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = name.into();
        self
    }

    #[must_use = "This method returns a new XmlFormatter and does not modify self"]
    pub fn with_list_element(mut self, name: impl Into<String>) -> Self {
        self.list_element = name.into();
        self
    }

    /// Append the index to list element names (`item0`, `item1`, ...).
    #[must_use = "This method returns a new XmlFormatter and does not modify self"]
    pub fn with_index_suffix(mut self) -> Self {
        self.index_suffix = true;
        self
    }

    fn element_name(&self, key: &str) -> String {
        if !is_numeric(key) {
            key.to_string()
        } else if self.index_suffix {
            format!("{}{}", self.list_element, key)
        } else {
            self.list_element.clone()
        }
    }

    fn write_children(
        &self,
        writer: &mut Writer<Vec<u8>>,
        value: &Normalized,
        normalizer: &Normalizer,
    ) -> FormatResult<()> {
        let entries: Vec<(String, &Normalized)> = match value {
            Normalized::Mapping(entries) => entries.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Normalized::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };

        for (key, child) in entries {
            let name = self.element_name(&key);
            let child = expand(child, normalizer);
            self.write_element(writer, check_name(&name)?, &child, normalizer)?;
        }
        Ok(())
    }

    fn write_element(
        &self,
        writer: &mut Writer<Vec<u8>>,
        name: &str,
        value: &Normalized,
        normalizer: &Normalizer,
    ) -> FormatResult<()> {
        let text = leaf_text(value);
        let is_empty = match (&text, value) {
            (Some(text), _) => text.is_empty(),
            (None, Normalized::Mapping(entries)) => entries.is_empty(),
            (None, Normalized::Sequence(items)) => items.is_empty(),
            (None, _) => true,
        };
        if is_empty {
            return writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(xml_error);
        }

        writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_error)?;
        match text {
            Some(text) => writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(xml_error)?,
            None => self.write_children(writer, value, normalizer)?,
        }
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }
}

impl Formatter for XmlFormatter {
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

        let root = check_name(&self.root_element)?;
        let mut writer = Writer::new(DECLARATION.as_bytes().to_vec());
        self.write_element(&mut writer, root, &value, normalizer)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }
}
