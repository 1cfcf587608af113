use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, EntityTrait, Iterable, PaginatorTrait, PrimaryKeyToColumn, QueryFilter,
    QueryOrder, QuerySelect, Select,
    sea_query::{Alias, Expr, SimpleExpr},
};
use std::fmt;
use std::sync::Arc;

use super::{AsyncQueryable, Queryable};
use crate::core::{Predicate, RecordOrder};
use crate::errors::GridError;
use crate::filtering::query_order;

type Convert<M, T> = Arc<dyn Fn(M) -> T + Send + Sync>;

/// Source backed by a sea-orm `Select`.
///
/// Filters, ordering and paging are appended to the query; nothing is loaded
/// until [`AsyncQueryable::fetch_async`]. Predicates must carry a query
/// condition, so closure-only predicates fail with
/// [`GridError::PushdownUnavailable`].
///
/// Any ordering, and any page taken without one, ends with the primary key
/// ascending, so rows that tie on every requested key keep a fixed order.
///
/// Projection with [`SeaOrmSource::project`] converts each loaded model.
/// Filters and sorts applied after projecting are still translated into SQL,
/// so the projected type's field columns must exist on the entity's table.
pub struct SeaOrmSource<'db, E: EntityTrait, T = <E as EntityTrait>::Model> {
    db: &'db DatabaseConnection,
    select: Select<E>,
    ordered: bool,
    convert: Convert<E::Model, T>,
}

impl<E: EntityTrait, T> fmt::Debug for SeaOrmSource<'_, E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeaOrmSource")
            .field("select", &self.select)
            .finish_non_exhaustive()
    }
}

impl<'db, E: EntityTrait> SeaOrmSource<'db, E> {
    #[must_use]
    pub fn new(db: &'db DatabaseConnection, select: Select<E>) -> Self {
        Self {
            db,
            select,
            ordered: false,
            convert: Arc::new(|model| model),
        }
    }

    /// Every row of the entity's table
    #[must_use]
    pub fn all(db: &'db DatabaseConnection) -> Self {
        Self::new(db, E::find())
    }
}

impl<'db, E: EntityTrait, T: 'static> SeaOrmSource<'db, E, T> {
    /// Convert each loaded row with `f`
    #[must_use]
    pub fn project<U>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> SeaOrmSource<'db, E, U> {
        let convert = self.convert;
        SeaOrmSource {
            db: self.db,
            select: self.select,
            ordered: self.ordered,
            convert: Arc::new(move |model| f(convert(model))),
        }
    }

    /// The query as built so far
    #[must_use]
    pub const fn select(&self) -> &Select<E> {
        &self.select
    }

    fn map_select(self, f: impl FnOnce(Select<E>) -> Select<E>) -> Self {
        Self {
            db: self.db,
            select: f(self.select),
            ordered: self.ordered,
            convert: self.convert,
        }
    }

    /// Append the primary key as the last ordering key
    fn by_primary_key(mut self) -> Self {
        self.select = E::PrimaryKey::iter().fold(self.select, |select, key| {
            select.order_by_asc(key.into_column())
        });
        self.ordered = true;
        self
    }
}

impl<E: EntityTrait, T: 'static> Queryable for SeaOrmSource<'_, E, T> {
    type Item = T;

    fn filter(self, predicate: &Predicate<T>) -> Result<Self, GridError> {
        let condition = predicate
            .pushdown()
            .cloned()
            .ok_or(GridError::PushdownUnavailable)?;
        Ok(self.map_select(|select| select.filter(condition)))
    }

    fn order(self, order: &RecordOrder<T>) -> Result<Self, GridError> {
        let sorted = self.map_select(|select| {
            order.keys().iter().fold(select, |select, key| {
                let (direction, nulls) = query_order(key);
                let column = SimpleExpr::from(Expr::col(Alias::new(key.field.column())));
                select.order_by_with_nulls(column, direction, nulls)
            })
        });
        Ok(sorted.by_primary_key())
    }

    fn paginate(self, skip: u64, take: u64) -> Self {
        let source = if self.ordered {
            self
        } else {
            self.by_primary_key()
        };
        source.map_select(|select| select.offset(skip).limit(take))
    }
}

#[async_trait]
impl<E, T> AsyncQueryable for SeaOrmSource<'_, E, T>
where
    E: EntityTrait,
    E::Model: Sync,
    T: Send + 'static,
{
    async fn count_async(&self) -> Result<u64, GridError> {
        Ok(PaginatorTrait::count(self.select.clone(), self.db).await?)
    }

    async fn fetch_async(self) -> Result<Vec<T>, GridError> {
        let models = self.select.all(self.db).await?;
        Ok(models.into_iter().map(|model| (self.convert)(model)).collect())
    }
}
