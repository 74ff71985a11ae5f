//! Traversal configuration.

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::cache::FieldDescriptor;
use crate::introspect::AttributeSet;
use crate::naming::NamingPattern;
use crate::normalized::Normalized;

/// Default accessor prefix: a field `Name` is read through `get_name`.
pub const DEFAULT_ACCESSOR_PREFIX: &str = "get";

/// Identity of the field a hook is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldContext<'a> {
    pub raw_key: &'a str,
    pub public_name: &'a str,
    pub accessor_name: Option<&'a str>,
}

type HookFn = dyn Fn(&AttributeSet, Normalized, &FieldContext<'_>) -> Normalized + Send + Sync;

/// Per-field hook run on every record field after its value is normalized.
///
/// The returned value replaces the field's value; returning null lets the
/// null filter drop the field.
#[derive(Clone)]
pub struct FieldHook {
    apply: Arc<HookFn>,
}

impl FieldHook {
    /// A hook that sees every piece of metadata on the field.
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&AttributeSet, Normalized, &FieldContext<'_>) -> Normalized + Send + Sync + 'static,
    {
        Self {
            apply: Arc::new(hook),
        }
    }

    /// A hook interested in metadata of kind `A` only.
    ///
    /// Runs once with `None` for fields without an `A`, otherwise once per
    /// `A` instance in declaration order, feeding each call the previous
    /// result.
    pub fn for_attribute<A, F>(hook: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(Option<&A>, Normalized, &FieldContext<'_>) -> Normalized + Send + Sync + 'static,
    {
        Self::new(move |attributes, value, context| {
            let mut found = attributes.of::<A>().peekable();
            if found.peek().is_none() {
                return hook(None, value, context);
            }
            found.fold(value, |value, attribute| hook(Some(attribute), value, context))
        })
    }

    pub fn apply(&self, field: &FieldDescriptor, value: Normalized) -> Normalized {
        let context = FieldContext {
            raw_key: field.raw_key(),
            public_name: field.public_name(),
            accessor_name: field.accessor_name(),
        };
        (self.apply)(field.attributes(), value, &context)
    }
}

impl fmt::Debug for FieldHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldHook")
    }
}

/// Options for one traversal. Immutable once handed to a normalizer;
/// every `with_*` method returns an updated copy.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    max_depth: Option<usize>,
    naming_pattern: NamingPattern,
    accessor_prefix: String,
    stringify_scalars: bool,
    drop_nulls: bool,
    excluded_fields: HashSet<String>,
    opaque_types: HashSet<TypeId>,
    field_hook: Option<FieldHook>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            naming_pattern: NamingPattern::default(),
            accessor_prefix: DEFAULT_ACCESSOR_PREFIX.to_string(),
            stringify_scalars: false,
            drop_nulls: false,
            excluded_fields: HashSet::new(),
            opaque_types: HashSet::new(),
            field_hook: None,
        }
    }
}

impl TraversalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop descending below `depth` levels; deeper values stay opaque.
    /// A depth of zero is treated as one.
    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth.max(1));
        self
    }

    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_unbounded_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Only normalize the immediate fields of the root.
    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_stop_at_first_level(self) -> Self {
        self.with_max_depth(1)
    }

    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_naming_pattern(mut self, pattern: NamingPattern) -> Self {
        self.naming_pattern = pattern;
        self
    }

    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_accessor_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.accessor_prefix = prefix.into();
        self
    }

    /// Coerce every scalar leaf to a string.
    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_only_string(mut self, enabled: bool) -> Self {
        self.stringify_scalars = enabled;
        self
    }

    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_drop_nulls(mut self, enabled: bool) -> Self {
        self.drop_nulls = enabled;
        self
    }

    /// Add public names (and map keys) to skip.
    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_excluded_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields
            .extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn without_excluded_fields(mut self) -> Self {
        self.excluded_fields.clear();
        self
    }

    /// Keep nested records of type `T` as they are.
    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_opaque_type<T: Any>(mut self) -> Self {
        self.opaque_types.insert(TypeId::of::<T>());
        self
    }

    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn with_field_hook(mut self, hook: FieldHook) -> Self {
        self.field_hook = Some(hook);
        self
    }

    #[must_use = "This method returns a new TraversalConfig and does not modify self"]
    pub fn without_field_hook(mut self) -> Self {
        self.field_hook = None;
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Whether a value met at `depth` must be left opaque.
    pub fn stops_at(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }

    pub fn naming_pattern(&self) -> &NamingPattern {
        &self.naming_pattern
    }

    pub fn accessor_prefix(&self) -> &str {
        &self.accessor_prefix
    }

    pub fn stringify_scalars(&self) -> bool {
        self.stringify_scalars
    }

    pub fn drop_nulls(&self) -> bool {
        self.drop_nulls
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_fields.contains(name)
    }

    pub fn is_opaque(&self, type_id: TypeId) -> bool {
        self.opaque_types.contains(&type_id)
    }

    pub fn field_hook(&self) -> Option<&FieldHook> {
        self.field_hook.as_ref()
    }
}
