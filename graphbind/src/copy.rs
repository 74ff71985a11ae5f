//! Copying fields from one object graph into a record.
//!
//! The source is normalized one level deep, so nested records arrive at the
//! target as the same shared handles instead of flattened mappings. Every
//! `(name, value)` pair then goes through the optional [`PropertyHandler`]
//! and is written with [`NameResolver::write`].

use std::sync::Arc;

use tracing::debug;

use crate::cache::IntrospectionCache;
use crate::config::TraversalConfig;
use crate::error::{BindError, BindResult};
use crate::handler::PropertyHandler;
use crate::naming::{NameResolver, NamingPattern, TargetRecord, WriteOutcome};
use crate::normalized::Normalized;
use crate::normalizer::Normalizer;
use crate::value::{AsNode, Value};

/// Something a copy can write into.
pub trait BindTarget {
    /// Borrow the writable view, or fail if this is not a record.
    fn bind_target(&mut self) -> BindResult<TargetRecord<'_>>;
}

impl<T> BindTarget for Vec<T> {
    fn bind_target(&mut self) -> BindResult<TargetRecord<'_>> {
        Err(BindError::invalid_argument(
            "target must be a record, found a list",
        ))
    }
}

impl<T> BindTarget for [T] {
    fn bind_target(&mut self) -> BindResult<TargetRecord<'_>> {
        Err(BindError::invalid_argument(
            "target must be a record, found a list",
        ))
    }
}

impl<T: BindTarget + ?Sized> BindTarget for &mut T {
    fn bind_target(&mut self) -> BindResult<TargetRecord<'_>> {
        (**self).bind_target()
    }
}

impl<T: BindTarget + ?Sized> BindTarget for Box<T> {
    fn bind_target(&mut self) -> BindResult<TargetRecord<'_>> {
        (**self).bind_target()
    }
}

/// Copy engine. Cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct ObjectCopy {
    normalizer: Normalizer,
}

impl Default for ObjectCopy {
    fn default() -> Self {
        Self::with_cache(IntrospectionCache::global())
    }
}

impl ObjectCopy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: Arc<IntrospectionCache>) -> Self {
        Self {
            normalizer: Normalizer::with_cache(
                TraversalConfig::default().with_stop_at_first_level(),
                cache,
            ),
        }
    }

    /// Use another rule for publishing restricted source fields.
    #[must_use = "This method returns a new ObjectCopy and does not modify self"]
    pub fn with_naming_pattern(self, pattern: NamingPattern) -> Self {
        let config = self.normalizer.config().clone().with_naming_pattern(pattern);
        Self {
            normalizer: Normalizer::with_cache(config, Arc::clone(self.normalizer.cache())),
        }
    }

    #[must_use = "This method returns a new ObjectCopy and does not modify self"]
    pub fn with_accessor_prefix(self, prefix: impl Into<String>) -> Self {
        let config = self.normalizer.config().clone().with_accessor_prefix(prefix);
        Self {
            normalizer: Normalizer::with_cache(config, Arc::clone(self.normalizer.cache())),
        }
    }

    /// Copy every field of `source` into `target`.
    ///
    /// Fails with [`BindError::InvalidArgument`] before touching anything
    /// when `target` is not a record. Values that find no field or setter on
    /// the target are dropped. Every value is converted before the first
    /// write, so a conversion failure leaves `target` unchanged; a setter
    /// that rejects its value stops the copy at that field.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn copy<S, T>(
        &self,
        source: &S,
        target: &mut T,
        handler: Option<&dyn PropertyHandler>,
    ) -> BindResult<()>
    where
        S: AsNode + ?Sized,
        T: BindTarget + ?Sized,
    {
        let mut target = target.bind_target()?;
        let resolver = NameResolver::new(self.normalizer.cache());
        let node = source.as_node();

        let entries = match self.normalizer.canonicalize_node(node) {
            Normalized::Opaque(_) | Normalized::Scalar(_) => {
                debug!("source has no fields, nothing copied");
                return Ok(());
            }
            fields => fields.into_entries(),
        };

        let pending = entries
            .into_iter()
            .map(|(name, value)| {
                let value = Value::from(value);
                let (target_name, value) = match handler {
                    Some(handler) => {
                        let target_name = handler.map_name(&name);
                        let value = handler.transform_value(&name, &target_name, value, Some(node));
                        (target_name, value)
                    }
                    None => (name, value),
                };
                resolver.prepare(&target, &target_name, value)
            })
            .collect::<BindResult<Vec<_>>>()?;

        for write in pending {
            let field = write.field().to_string();
            if resolver.apply(&mut target, write)? == WriteOutcome::Dropped {
                debug!(%field, "value dropped");
            }
        }
        Ok(())
    }
}

/// Copy `source` into `target` with the process-wide cache.
pub fn copy<S, T>(source: &S, target: &mut T, handler: Option<&dyn PropertyHandler>) -> BindResult<()>
where
    S: AsNode + ?Sized,
    T: BindTarget + ?Sized,
{
    ObjectCopy::default().copy(source, target, handler)
}

/// Directional copy helpers for every traversable record.
pub trait ObjectCopyExt: AsNode + BindTarget {
    /// Copy the fields of `source` into `self`.
    fn copy_from<S: AsNode + ?Sized>(
        &mut self,
        source: &S,
        handler: Option<&dyn PropertyHandler>,
    ) -> BindResult<()> {
        copy(source, self, handler)
    }

    /// Copy the fields of `self` into `target`.
    fn copy_to<T: BindTarget + ?Sized>(
        &self,
        target: &mut T,
        handler: Option<&dyn PropertyHandler>,
    ) -> BindResult<()> {
        copy(self, target, handler)
    }

    /// [`copy_from`](Self::copy_from) without a handler.
    fn bind_from<S: AsNode + ?Sized>(&mut self, source: &S) -> BindResult<()> {
        self.copy_from(source, None)
    }

    /// [`copy_to`](Self::copy_to) without a handler.
    fn bind_to<T: BindTarget + ?Sized>(&self, target: &mut T) -> BindResult<()> {
        self.copy_to(target, None)
    }

    /// Normalize `self` with default settings.
    fn to_normalized(&self) -> Normalized {
        Normalizer::default().canonicalize(self)
    }

    /// Build a default instance and bind `source` into it.
    fn create_from<S: AsNode + ?Sized>(
        source: &S,
        handler: Option<&dyn PropertyHandler>,
    ) -> BindResult<Self>
    where
        Self: Default + Sized,
    {
        let mut created = Self::default();
        created.copy_from(source, handler)?;
        Ok(created)
    }
}

impl<T: AsNode + BindTarget + ?Sized> ObjectCopyExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicRecord;
    use crate::handler::{DirectTransform, SnakeToCamelCase};

    fn source() -> Value {
        Value::map([
            ("id_model", Value::from(1)),
            ("client_name", Value::from("Joao")),
            ("age", Value::from(49)),
        ])
    }

    #[test]
    fn test_copy_into_dynamic_record_with_handler() {
        let mut target = DynamicRecord::new();
        copy(&source(), &mut target, Some(&SnakeToCamelCase::new())).expect("copy");
        assert_eq!(
            target.names().collect::<Vec<_>>(),
            vec!["idModel", "clientName", "age"]
        );
        assert_eq!(target.get("clientName"), Some(&Value::from("Joao")));
    }

    #[test]
    fn test_list_target_is_rejected() {
        let mut target: Vec<Value> = Vec::new();
        let err = copy(&source(), &mut target, None).expect_err("list target");
        assert!(matches!(err, BindError::InvalidArgument(_)));
        assert!(target.is_empty());
    }

    #[test]
    fn test_direct_transform_matches_no_handler() {
        let mut with_handler = DynamicRecord::new();
        let mut without = DynamicRecord::new();
        copy(&source(), &mut with_handler, Some(&DirectTransform::new())).expect("copy");
        copy(&source(), &mut without, None).expect("copy");
        assert_eq!(with_handler, without);
    }

    #[test]
    fn test_nested_values_pass_through_unflattened() {
        let nested = Value::map([("inner", Value::map([("x", 1)]))]);
        let mut target = DynamicRecord::new();
        target.bind_from(&nested).expect("copy");
        assert_eq!(target.get("inner"), nested.as_map().and_then(|m| m.get("inner")));
    }

    #[test]
    fn test_sequence_source_uses_index_names() {
        let items = vec![Value::from("a"), Value::from("b")];
        let target = DynamicRecord::create_from(&items, None).expect("copy");
        assert_eq!(target.names().collect::<Vec<_>>(), vec!["0", "1"]);
    }

    #[test]
    fn test_scalar_source_copies_nothing() {
        let mut target = DynamicRecord::new();
        target.bind_from(&Value::from(5)).expect("copy");
        assert!(target.is_empty());
    }
}
