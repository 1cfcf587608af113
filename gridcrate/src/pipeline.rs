//! Runs a parsed [`RequestSpec`] against a source.
//!
//! Stages, in order:
//!
//! 1. count the unfiltered source (zero short-circuits to an empty response)
//! 2. apply the free-text search, then the projection, then every column filter
//! 3. count the filtered source (zero short-circuits)
//! 4. order, when any sort was requested
//! 5. page, when the request asked for a bounded page
//! 6. materialize
//!
//! All predicates and orderings are compiled before the first count, so a
//! request naming an unknown field fails without touching the store.

use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::core::{GridRecord, Predicate, RecordOrder};
use crate::errors::GridError;
use crate::filtering::{compile_filters, compile_search, compile_sort};
use crate::models::RequestSpec;
use crate::options::ParsingOptions;
use crate::source::{AsyncQueryable, BlockingQueryable, Queryable};

/// Page of records plus the counts a grid widget needs to render its pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse<T, F = ()> {
    pub data: Vec<T>,
    /// Echo of the request's `draw`, unchanged
    pub draw: Option<String>,
    pub records_total: u64,
    pub records_filtered: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_data: Option<F>,
}

impl<T> GridResponse<T> {
    fn empty(draw: Option<String>, records_total: u64) -> Self {
        Self {
            data: Vec::new(),
            draw,
            records_total,
            records_filtered: 0,
            footer_data: None,
        }
    }
}

impl<T, F> GridResponse<T, F> {
    /// Attach caller-computed aggregates, e.g. column totals
    #[must_use]
    pub fn with_footer<G>(self, footer: G) -> GridResponse<T, G> {
        GridResponse {
            data: self.data,
            draw: self.draw,
            records_total: self.records_total,
            records_filtered: self.records_filtered,
            footer_data: Some(footer),
        }
    }
}

/// Everything compiled from a request, ready to apply to a source
struct Plan<S, P> {
    search: Option<Predicate<S>>,
    filters: Vec<Predicate<P>>,
    order: RecordOrder<P>,
}

impl<S, P> Plan<S, P> {
    fn search<Q: Queryable<Item = S>>(&self, source: Q) -> Result<Q, GridError> {
        match &self.search {
            Some(search) => source.filter(search),
            None => Ok(source),
        }
    }

    fn filter<Q: Queryable<Item = P>>(&self, source: Q) -> Result<Q, GridError> {
        self.filters
            .iter()
            .try_fold(source, |source, predicate| source.filter(predicate))
    }

    fn order_and_page<Q: Queryable<Item = P>>(
        &self,
        source: Q,
        request: &RequestSpec,
    ) -> Result<Q, GridError> {
        let source = if self.order.is_empty() {
            source
        } else {
            source.order(&self.order)?
        };
        Ok(match request.take {
            Some(take) => source.paginate(request.skip, take),
            None => source,
        })
    }
}

/// Await `stage` unless `cancel` fires first
async fn checkpoint<T>(
    cancel: &CancellationToken,
    stage: impl Future<Output = Result<T, GridError>>,
) -> Result<T, GridError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(GridError::Cancelled),
        result = stage => result,
    }
}

/// Executes one grid request.
///
/// ```rust,ignore
/// let request = RequestParser::new().parse(&params)?;
/// let response = GridPipeline::new(&request)
///     .with_search_fields(["Name", "AccountNumber"])
///     .run(InMemorySource::new(accounts))?;
/// ```
#[derive(Debug, Clone)]
pub struct GridPipeline<'r> {
    request: &'r RequestSpec,
    search_fields: Vec<String>,
    options: &'r ParsingOptions,
}

impl<'r> GridPipeline<'r> {
    #[must_use]
    pub fn new(request: &'r RequestSpec) -> Self {
        Self {
            request,
            search_fields: Vec::new(),
            options: ParsingOptions::global(),
        }
    }

    /// Fields the free-text search looks at. Without any, search is skipped.
    #[must_use]
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Options used to coerce select filter values
    #[must_use]
    pub const fn with_options(mut self, options: &'r ParsingOptions) -> Self {
        self.options = options;
        self
    }

    fn plan<S, P>(&self) -> Result<Plan<S, P>, GridError>
    where
        S: GridRecord + 'static,
        P: GridRecord + 'static,
    {
        let search = match &self.request.search_term {
            Some(term) if !self.search_fields.is_empty() => {
                Some(compile_search::<S, _>(&self.search_fields, term))
            }
            _ => None,
        };
        Ok(Plan {
            search,
            filters: compile_filters(&self.request.filter_specs, self.options)?,
            order: compile_sort(&self.request.sort_specs)?,
        })
    }

    fn empty<T>(&self, records_total: u64) -> GridResponse<T> {
        GridResponse::empty(self.request.draw.clone(), records_total)
    }

    /// Run against a source that is counted and fetched synchronously.
    ///
    /// # Errors
    ///
    /// Compile errors for the request, or the source's own errors.
    pub fn run<S>(&self, source: S) -> Result<GridResponse<S::Item>, GridError>
    where
        S: BlockingQueryable,
        S::Item: GridRecord + 'static,
    {
        self.run_projected(source, |source| source)
    }

    /// Like [`GridPipeline::run`], projecting the searched source before the
    /// column filters apply. Column filters and sorts refer to the projected
    /// type's fields.
    ///
    /// # Errors
    ///
    /// See [`GridPipeline::run`].
    pub fn run_projected<S, P>(
        &self,
        source: S,
        project: impl FnOnce(S) -> P,
    ) -> Result<GridResponse<P::Item>, GridError>
    where
        S: BlockingQueryable,
        S::Item: GridRecord + 'static,
        P: BlockingQueryable,
        P::Item: GridRecord + 'static,
    {
        let plan = self.plan::<S::Item, P::Item>()?;

        let records_total = source.count()?;
        tracing::trace!(records_total, "Counted source");
        if records_total == 0 {
            return Ok(self.empty(0));
        }

        let filtered = plan.filter(project(plan.search(source)?))?;
        let records_filtered = filtered.count()?;
        tracing::trace!(records_filtered, "Counted filtered source");
        if records_filtered == 0 {
            return Ok(self.empty(records_total));
        }

        let data = plan.order_and_page(filtered, self.request)?.fetch()?;
        tracing::trace!(rows = data.len(), "Materialized page");
        Ok(GridResponse {
            data,
            draw: self.request.draw.clone(),
            records_total,
            records_filtered,
            footer_data: None,
        })
    }

    /// Run against an async source, giving up with [`GridError::Cancelled`]
    /// when `cancel` fires before a count or the final fetch completes.
    ///
    /// # Errors
    ///
    /// See [`GridPipeline::run`].
    pub async fn run_async<S>(
        &self,
        source: S,
        cancel: &CancellationToken,
    ) -> Result<GridResponse<S::Item>, GridError>
    where
        S: AsyncQueryable,
        S::Item: GridRecord + Send + 'static,
    {
        self.run_projected_async(source, |source| source, cancel).await
    }

    /// Async form of [`GridPipeline::run_projected`].
    ///
    /// # Errors
    ///
    /// See [`GridPipeline::run`].
    pub async fn run_projected_async<S, P, F>(
        &self,
        source: S,
        project: F,
        cancel: &CancellationToken,
    ) -> Result<GridResponse<P::Item>, GridError>
    where
        S: AsyncQueryable,
        S::Item: GridRecord + 'static,
        P: AsyncQueryable,
        P::Item: GridRecord + Send + 'static,
        F: FnOnce(S) -> P + Send,
    {
        let plan = self.plan::<S::Item, P::Item>()?;

        let records_total = checkpoint(cancel, source.count_async()).await?;
        tracing::trace!(records_total, "Counted source");
        if records_total == 0 {
            return Ok(self.empty(0));
        }

        let filtered = plan.filter(project(plan.search(source)?))?;
        let records_filtered = checkpoint(cancel, filtered.count_async()).await?;
        tracing::trace!(records_filtered, "Counted filtered source");
        if records_filtered == 0 {
            return Ok(self.empty(records_total));
        }

        let paged = plan.order_and_page(filtered, self.request)?;
        let data = checkpoint(cancel, paged.fetch_async()).await?;
        tracing::trace!(rows = data.len(), "Materialized page");
        Ok(GridResponse {
            data,
            draw: self.request.draw.clone(),
            records_total,
            records_filtered,
            footer_data: None,
        })
    }
}
