use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::handler::{DirectTransform, PropertyHandler, ValueHandler};
use crate::value::{Node, Value};

/// A run of capitals at the start of the name or after a lowercase letter,
/// followed by a capitalized word. Ungreedy, so the run gives up its last
/// capital to the word.
static ACRONYM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?U)(^|[a-z])([A-Z]+)([A-Z][a-z])").expect("acronym pattern is valid")
});

static LOWER_UPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("lower/upper pattern is valid"));

/// An underscore followed by an ASCII letter.
static UNDERSCORE_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)_([a-z])").expect("underscore pattern is valid"));

/// Convert a camelCase or PascalCase name to snake_case.
///
/// Acronym runs are kept together: `XMLHttpRequest` becomes
/// `xml_http_request`. Only ASCII letters take part in case changes.
pub fn camel_to_snake(name: &str) -> String {
    let split = ACRONYM_RE.replace_all(name, |caps: &Captures<'_>| {
        format!("{}{}_{}", &caps[1], &caps[2], caps[3].to_ascii_lowercase())
    });
    let split = LOWER_UPPER_RE.replace_all(&split, |caps: &Captures<'_>| {
        format!("{}_{}", &caps[1], caps[2].to_ascii_lowercase())
    });
    split.to_ascii_lowercase()
}

/// Convert a snake_case name to camelCase.
///
/// The name is lowercased first, then every `_` followed by a letter is
/// replaced by that letter in upper case.
pub fn snake_to_camel(name: &str) -> String {
    UNDERSCORE_LETTER_RE
        .replace_all(&name.to_ascii_lowercase(), |caps: &Captures<'_>| {
            caps[1].to_ascii_uppercase()
        })
        .into_owned()
}

/// Renames camelCase source fields to snake_case targets.
#[derive(Debug, Clone, Default)]
pub struct CamelToSnakeCase {
    inner: DirectTransform,
}

impl CamelToSnakeCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, Value, Option<Node<'_>>) -> Value + Send + Sync + 'static,
    {
        Self {
            inner: DirectTransform::with_value_handler(handler),
        }
    }

    pub fn from_value_handler(handler: ValueHandler) -> Self {
        Self {
            inner: DirectTransform::from_handler(Some(handler)),
        }
    }
}

impl PropertyHandler for CamelToSnakeCase {
    fn map_name(&self, property: &str) -> String {
        camel_to_snake(property)
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

/// Renames snake_case source fields to camelCase targets.
#[derive(Debug, Clone, Default)]
pub struct SnakeToCamelCase {
    inner: DirectTransform,
}

impl SnakeToCamelCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, Value, Option<Node<'_>>) -> Value + Send + Sync + 'static,
    {
        Self {
            inner: DirectTransform::with_value_handler(handler),
        }
    }

    pub fn from_value_handler(handler: ValueHandler) -> Self {
        Self {
            inner: DirectTransform::from_handler(Some(handler)),
        }
    }
}

impl PropertyHandler for SnakeToCamelCase {
    fn map_name(&self, property: &str) -> String {
        snake_to_camel(property)
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
