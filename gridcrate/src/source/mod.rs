//! Stores a grid request can run against.
//!
//! A source is consumed stage by stage: filtered, ordered, paged, then counted
//! or materialized. [`InMemorySource`] evaluates predicates as closures;
//! [`SeaOrmSource`] translates them into SQL and therefore only accepts
//! predicates that carry a query condition.

use async_trait::async_trait;

use crate::core::{Predicate, RecordOrder};
use crate::errors::GridError;

pub mod memory;
pub mod sea;

pub use memory::InMemorySource;
pub use sea::SeaOrmSource;

/// Query-building operations shared by every source.
pub trait Queryable: Sized {
    type Item;

    /// Keep only the items matching `predicate`.
    ///
    /// # Errors
    ///
    /// Sources that cannot evaluate closures return `PushdownUnavailable` for
    /// predicates without a query condition.
    fn filter(self, predicate: &Predicate<Self::Item>) -> Result<Self, GridError>;

    /// Apply a multi-key ordering.
    ///
    /// # Errors
    ///
    /// Implementations may reject orderings they cannot express.
    fn order(self, order: &RecordOrder<Self::Item>) -> Result<Self, GridError>;

    fn paginate(self, skip: u64, take: u64) -> Self;
}

/// Source that can be counted and materialized synchronously.
pub trait BlockingQueryable: Queryable {
    /// Number of items currently selected
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    fn count(&self) -> Result<u64, GridError>;

    /// # Errors
    ///
    /// Returns the store's error.
    fn fetch(self) -> Result<Vec<Self::Item>, GridError>;
}

/// Source that is counted and materialized through async I/O.
#[async_trait]
pub trait AsyncQueryable: Queryable + Send + Sync {
    /// # Errors
    ///
    /// Returns the store's error.
    async fn count_async(&self) -> Result<u64, GridError>;

    /// # Errors
    ///
    /// Returns the store's error.
    async fn fetch_async(self) -> Result<Vec<Self::Item>, GridError>;
}
