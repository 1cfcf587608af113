use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use super::record::{FieldDescriptor, GridRecord};
use crate::errors::GridError;

static RESOLVERS: LazyLock<RwLock<HashMap<TypeId, &'static FieldResolver>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Case-insensitive lookup from external field name to [`FieldDescriptor`].
///
/// One table exists per record type. It is built on first use, leaked into a
/// `'static` reference and never mutated afterwards, so lookups after the
/// first only take a shared read lock on the registry.
#[derive(Debug)]
pub struct FieldResolver {
    record: &'static str,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
}

impl FieldResolver {
    /// Shared resolver for `R`, built at most once per process.
    pub fn of<R: GridRecord + 'static>() -> &'static Self {
        let key = TypeId::of::<R>();

        if let Some(resolver) = RESOLVERS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
        {
            return resolver;
        }

        let mut registry = RESOLVERS.write().unwrap_or_else(PoisonError::into_inner);
        *registry.entry(key).or_insert_with(|| {
            let resolver = Self::build(type_name::<R>(), R::field_descriptors());
            tracing::debug!(
                record = resolver.record,
                fields = resolver.fields.len(),
                "Built field resolver"
            );
            Box::leak(Box::new(resolver))
        })
    }

    fn build(record: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        let mut by_name = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            let key = field.name().to_lowercase();
            if by_name.contains_key(&key) {
                tracing::warn!(
                    record,
                    field = field.name(),
                    "Field name differs from an earlier field only by case; keeping the first"
                );
                continue;
            }
            by_name.insert(key, position);
        }
        Self {
            record,
            fields,
            by_name,
        }
    }

    /// Look up a field, failing with [`GridError::FieldNotFound`].
    ///
    /// # Errors
    ///
    /// Returns `FieldNotFound` when no field matches `name` case-insensitively.
    pub fn resolve(&self, name: &str) -> Result<&FieldDescriptor, GridError> {
        self.find(name).ok_or_else(|| GridError::FieldNotFound {
            record: self.record,
            field: name.to_string(),
        })
    }

    /// Look up a field, returning `None` when it does not exist.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&position| &self.fields[position])
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Type name of the record this table describes
    #[must_use]
    pub const fn record(&self) -> &'static str {
        self.record
    }
}
