use sea_orm::Condition;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::record::{FieldDescriptor, GridRecord};
use crate::models::SortDirection;

type TestFn<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Composable boolean test over a record.
///
/// Every predicate can be evaluated in memory. Predicates produced by the
/// compilers also carry an equivalent sea-orm [`Condition`] so that a database
/// source can run them as part of the query instead of loading rows first.
/// Predicates built from a bare closure have no condition and can only be
/// used with in-memory sources.
pub struct Predicate<R> {
    test: TestFn<R>,
    pushdown: Option<Condition>,
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
            pushdown: self.pushdown.clone(),
        }
    }
}

impl<R> fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("pushdown", &self.pushdown)
            .finish_non_exhaustive()
    }
}

impl<R: 'static> Predicate<R> {
    /// Predicate with both an in-memory test and its query condition.
    /// The two must select the same records.
    pub fn new<F>(test: F, pushdown: Condition) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(test),
            pushdown: Some(pushdown),
        }
    }

    /// In-memory only predicate
    pub fn from_fn<F>(test: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(test),
            pushdown: None,
        }
    }

    /// Predicate that accepts every record
    #[must_use]
    pub fn always() -> Self {
        Self::new(|_| true, Condition::all())
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let pushdown = match (self.pushdown, other.pushdown) {
            (Some(a), Some(b)) => Some(Condition::all().add(a).add(b)),
            _ => None,
        };
        let (a, b) = (self.test, other.test);
        Self {
            test: Arc::new(move |record: &R| a(record) && b(record)),
            pushdown,
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let pushdown = match (self.pushdown, other.pushdown) {
            (Some(a), Some(b)) => Some(Condition::any().add(a).add(b)),
            _ => None,
        };
        let (a, b) = (self.test, other.test);
        Self {
            test: Arc::new(move |record: &R| a(record) || b(record)),
            pushdown,
        }
    }

    /// OR of every predicate; an empty list yields `None`
    pub fn any_of<I>(predicates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        predicates.into_iter().reduce(Self::or)
    }
}

impl<R> Predicate<R> {
    /// Evaluate against a record in memory
    pub fn matches(&self, record: &R) -> bool {
        (self.test)(record)
    }

    /// Query condition equivalent to this predicate, when one exists
    #[must_use]
    pub const fn pushdown(&self) -> Option<&Condition> {
        self.pushdown.as_ref()
    }
}

/// One key of a multi-key ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: FieldDescriptor,
    pub direction: SortDirection,
}

/// Stable multi-key ordering over a record type.
///
/// The first key is the primary sort; later keys only break ties.
pub struct RecordOrder<R> {
    keys: Vec<SortKey>,
    _record: PhantomData<fn(&R)>,
}

impl<R> Clone for RecordOrder<R> {
    fn clone(&self) -> Self {
        Self::from_keys(self.keys.clone())
    }
}

impl<R> fmt::Debug for RecordOrder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordOrder").field("keys", &self.keys).finish()
    }
}

impl<R> RecordOrder<R> {
    #[must_use]
    pub const fn from_keys(keys: Vec<SortKey>) -> Self {
        Self {
            keys,
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<R: GridRecord> RecordOrder<R> {
    /// Compare two records key by key
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        for key in &self.keys {
            let ordering = key.field.read(a).sort_cmp(&key.field.read(b));
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
