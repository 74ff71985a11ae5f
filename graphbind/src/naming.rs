//! Field-name cleanup and write-target resolution.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use tracing::debug;

use crate::cache::IntrospectionCache;
use crate::error::{BindError, BindResult};
use crate::introspect::{Introspectable, Staged, Writer};
use crate::value::Value;

type Callback = Arc<dyn Fn(&Captures<'_>) -> String + Send + Sync>;

static CALLBACK_IDS: AtomicU64 = AtomicU64::new(0);

#[derive(Clone)]
enum Rule {
    StripNonAlphanumeric,
    Replace { matcher: Regex, replacement: String },
    Callback { matcher: Regex, callback: Callback },
}

/// A single find/replace rule turning raw field identifiers into public names.
///
/// The default strips every character that is not ASCII alphanumeric, so a
/// restricted field `_name` is published as `name`.
#[derive(Clone)]
pub struct NamingPattern {
    rule: Rule,
    key: Arc<str>,
}

impl Default for NamingPattern {
    fn default() -> Self {
        Self {
            rule: Rule::StripNonAlphanumeric,
            key: Arc::from("[^A-Za-z0-9]=>"),
        }
    }
}

impl NamingPattern {
    /// Replace every match of `pattern` with `replacement` (`$1` style
    /// group references are expanded).
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?, replacement))
    }

    pub fn from_regex(matcher: Regex, replacement: impl Into<String>) -> Self {
        let replacement = replacement.into();
        let key = Arc::from(format!("{}=>{}", matcher.as_str(), replacement));
        Self {
            rule: Rule::Replace {
                matcher,
                replacement,
            },
            key,
        }
    }

    /// Replace every match of `pattern` with the callback's output.
    pub fn with_callback<F>(pattern: &str, callback: F) -> Result<Self, regex::Error>
    where
        F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    {
        let matcher = Regex::new(pattern)?;
        let id = CALLBACK_IDS.fetch_add(1, Ordering::Relaxed);
        let key = Arc::from(format!("{}=>fn#{}", matcher.as_str(), id));
        Ok(Self {
            rule: Rule::Callback {
                matcher,
                callback: Arc::new(callback),
            },
            key,
        })
    }

    /// Identity of this rule within the introspection cache.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn apply(&self, raw_key: &str) -> String {
        match &self.rule {
            Rule::StripNonAlphanumeric => raw_key
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect(),
            Rule::Replace {
                matcher,
                replacement,
            } => matcher
                .replace_all(raw_key, replacement.as_str())
                .into_owned(),
            Rule::Callback { matcher, callback } => matcher
                .replace_all(raw_key, |caps: &Captures<'_>| callback(caps))
                .into_owned(),
        }
    }
}

impl fmt::Debug for NamingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamingPattern").field(&self.key).finish()
    }
}

/// Fold a method or field name for loose matching: ASCII lowercase with
/// `_` separators removed, so `getName` and `get_name` compare equal.
pub fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Where a copied value landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Setter(&'static str),
    Field,
    CaseInsensitiveField(&'static str),
    Dropped,
}

/// A record that can receive named values.
pub enum TargetRecord<'a> {
    /// A typed record: writes resolve against its setters and public fields.
    Typed(&'a mut dyn Introspectable),
    /// An untyped record that accepts any name.
    Untyped(&'a mut IndexMap<String, Value>),
}

impl fmt::Debug for TargetRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRecord::Typed(r) => f.debug_tuple("Typed").field(&r.type_name()).finish(),
            TargetRecord::Untyped(m) => f.debug_tuple("Untyped").field(&m.len()).finish(),
        }
    }
}

/// Cleans raw keys and resolves names against write targets.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'c> {
    cache: &'c IntrospectionCache,
}

impl<'c> NameResolver<'c> {
    pub fn new(cache: &'c IntrospectionCache) -> Self {
        Self { cache }
    }

    pub fn clean(raw_key: &str, pattern: &NamingPattern) -> String {
        pattern.apply(raw_key)
    }

    /// Resolve `name` on `target` and convert `value` for it, without
    /// writing anything.
    ///
    /// Resolution order: a setter named `set` + `name`, then a field named
    /// exactly `name`, then the single field whose lowercased name equals
    /// `lower(name)`. Anything else resolves to a dropped write.
    pub fn prepare(
        &self,
        target: &TargetRecord<'_>,
        name: &str,
        value: Value,
    ) -> BindResult<PendingWrite> {
        let record = match target {
            TargetRecord::Untyped(_) => {
                return Ok(PendingWrite {
                    field: name.to_string(),
                    outcome: WriteOutcome::Field,
                    action: Action::Insert(value),
                })
            }
            TargetRecord::Typed(record) => &**record,
        };

        let table = self.cache.write_table(record);
        let (outcome, field, writer) = if let Some((setter, writer)) = table.setter(name) {
            (WriteOutcome::Setter(setter), name, writer)
        } else if let Some(writer) = table.field(name) {
            (WriteOutcome::Field, name, writer)
        } else if let Some((actual, writer)) = table.case_insensitive(name) {
            (WriteOutcome::CaseInsensitiveField(actual), actual, writer)
        } else {
            debug!(record = record.type_name(), field = name, "no target for value, dropped");
            return Ok(PendingWrite {
                field: name.to_string(),
                outcome: WriteOutcome::Dropped,
                action: Action::Skip,
            });
        };

        let staged = writer
            .stage(value)
            .map_err(|e| BindError::conversion(field, e))?;
        Ok(PendingWrite {
            field: field.to_string(),
            outcome,
            action: Action::Store { writer, staged },
        })
    }

    /// Store a prepared value. Only a setter that rejects its argument can
    /// fail here.
    pub fn apply(
        &self,
        target: &mut TargetRecord<'_>,
        pending: PendingWrite,
    ) -> BindResult<WriteOutcome> {
        let PendingWrite {
            field,
            outcome,
            action,
        } = pending;

        match (action, target) {
            (Action::Skip, _) => {}
            (Action::Insert(value), TargetRecord::Untyped(fields)) => {
                fields.insert(field, value);
            }
            (Action::Store { writer, staged }, TargetRecord::Typed(record)) => {
                writer
                    .apply(record.as_any_mut(), staged)
                    .map_err(|e| BindError::conversion(field, e))?;
            }
            _ => {
                return Err(BindError::invalid_argument(format!(
                    "write for '{field}' was prepared for another target"
                )))
            }
        }
        Ok(outcome)
    }

    /// Write `value` into `target` under `name`, see [`prepare`](Self::prepare).
    pub fn write(
        &self,
        target: &mut TargetRecord<'_>,
        name: &str,
        value: Value,
    ) -> BindResult<WriteOutcome> {
        let pending = self.prepare(target, name, value)?;
        self.apply(target, pending)
    }
}

/// A resolved and converted value that has not been written yet.
#[derive(Debug)]
pub struct PendingWrite {
    field: String,
    outcome: WriteOutcome,
    action: Action,
}

impl PendingWrite {
    /// Name of the field or setter argument the value resolved to.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn outcome(&self) -> &WriteOutcome {
        &self.outcome
    }
}

#[derive(Debug)]
enum Action {
    Store { writer: Writer, staged: Staged },
    Insert(Value),
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_strips_non_alphanumeric() {
        let pattern = NamingPattern::default();
        assert_eq!(pattern.apply("_Name"), "Name");
        assert_eq!(pattern.apply("_Id_Model"), "IdModel");
        assert_eq!(pattern.apply("birth-date!"), "birthdate");
        assert_eq!(pattern.apply("ção1"), "o1");
    }

    #[test]
    fn test_custom_pattern_with_groups() {
        let pattern = NamingPattern::new(r"^_+", "").expect("valid pattern");
        assert_eq!(pattern.apply("__id_model"), "id_model");

        let pattern = NamingPattern::new(r"^m_(\w+)$", "$1").expect("valid pattern");
        assert_eq!(NameResolver::clean("m_total", &pattern), "total");
    }

    #[test]
    fn test_callback_pattern() {
        let pattern = NamingPattern::with_callback(r"_([a-z])", |caps| caps[1].to_uppercase())
            .expect("valid pattern");
        assert_eq!(pattern.apply("client_name"), "clientName");
    }

    #[test]
    fn test_pattern_keys_identify_rules() {
        let a = NamingPattern::new("x", "").expect("valid pattern");
        let b = NamingPattern::new("x", "").expect("valid pattern");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), NamingPattern::default().key());

        let f1 = NamingPattern::with_callback("x", |_| String::new()).expect("valid pattern");
        let f2 = NamingPattern::with_callback("x", |_| String::new()).expect("valid pattern");
        assert_ne!(f1.key(), f2.key());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(NamingPattern::new("(", "").is_err());
    }

    #[test]
    fn test_fold_name() {
        assert_eq!(fold_name("getName"), "getname");
        assert_eq!(fold_name("get_name"), "getname");
        assert_eq!(fold_name("set_Id_Model"), "setidmodel");
    }

    #[test]
    fn test_untyped_target_accepts_any_name() {
        let cache = IntrospectionCache::new();
        let resolver = NameResolver::new(&cache);
        let mut fields = IndexMap::new();
        let mut target = TargetRecord::Untyped(&mut fields);

        let outcome = resolver
            .write(&mut target, "clientName", Value::from("Joao"))
            .expect("untyped write");
        assert_eq!(outcome, WriteOutcome::Field);
        assert_eq!(fields.get("clientName"), Some(&Value::from("Joao")));
    }

    #[test]
    fn test_prepare_does_not_write() {
        let cache = IntrospectionCache::new();
        let resolver = NameResolver::new(&cache);
        let mut fields = IndexMap::new();
        let mut target = TargetRecord::Untyped(&mut fields);

        let pending = resolver
            .prepare(&target, "age", Value::from(49))
            .expect("untyped prepare");
        assert_eq!(pending.field(), "age");
        assert_eq!(pending.outcome(), &WriteOutcome::Field);

        resolver.apply(&mut target, pending).expect("untyped apply");
        assert_eq!(fields.get("age"), Some(&Value::from(49)));
    }
}
