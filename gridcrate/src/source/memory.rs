use async_trait::async_trait;

use super::{AsyncQueryable, BlockingQueryable, Queryable};
use crate::core::{GridRecord, Predicate, RecordOrder};
use crate::errors::GridError;

fn saturating_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Source over records already held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemorySource<R> {
    items: Vec<R>,
}

impl<R> InMemorySource<R> {
    #[must_use]
    pub const fn new(items: Vec<R>) -> Self {
        Self { items }
    }

    /// Project every item into another record type
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(R) -> U) -> InMemorySource<U> {
        InMemorySource::new(self.items.into_iter().map(f).collect())
    }

    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<R> {
        self.items
    }
}

impl<R> From<Vec<R>> for InMemorySource<R> {
    fn from(items: Vec<R>) -> Self {
        Self::new(items)
    }
}

impl<R> FromIterator<R> for InMemorySource<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<R: GridRecord> Queryable for InMemorySource<R> {
    type Item = R;

    fn filter(mut self, predicate: &Predicate<R>) -> Result<Self, GridError> {
        self.items.retain(|item| predicate.matches(item));
        Ok(self)
    }

    fn order(mut self, order: &RecordOrder<R>) -> Result<Self, GridError> {
        // sort_by is stable, so equal keys keep their source order
        self.items.sort_by(|a, b| order.compare(a, b));
        Ok(self)
    }

    fn paginate(self, skip: u64, take: u64) -> Self {
        self.items
            .into_iter()
            .skip(saturating_usize(skip))
            .take(saturating_usize(take))
            .collect()
    }
}

impl<R: GridRecord> BlockingQueryable for InMemorySource<R> {
    fn count(&self) -> Result<u64, GridError> {
        Ok(self.items.len() as u64)
    }

    fn fetch(self) -> Result<Vec<R>, GridError> {
        Ok(self.items)
    }
}

#[async_trait]
impl<R: GridRecord + Send + Sync> AsyncQueryable for InMemorySource<R> {
    async fn count_async(&self) -> Result<u64, GridError> {
        self.count()
    }

    async fn fetch_async(self) -> Result<Vec<R>, GridError> {
        self.fetch()
    }
}
