//! Server-side filtering, search, sorting and paging for data-grid widgets.
//!
//! ```rust,ignore
//! let request = RequestParser::new().parse(&params)?;
//! let response = GridPipeline::new(&request)
//!     .with_search_fields(["Name", "AccountNumber"])
//!     .run_async(SeaOrmSource::<account::Entity>::all(&db), &CancellationToken::new())
//!     .await?;
//! ```

extern crate self as gridcrate;

pub mod core;
pub mod errors;
pub mod extract;
pub mod filtering;
pub mod models;
pub mod options;
pub mod pipeline;
pub mod source;

#[cfg(feature = "derive")]
pub use gridcrate_derive::{GridRecord, GridValue}; // Export the proc macros

pub use crate::core::{
    FieldDescriptor, FieldKind, FieldResolver, FieldValue, GridRecord, GridValue, Predicate,
    RecordOrder, SortKey,
};
pub use errors::GridError;
pub use extract::GridRequest;
pub use filtering::{RequestParser, compile_filter, compile_search, compile_sort};
pub use models::{
    FilterCategory, FilterOperator, FilterSpec, RequestSpec, SortDirection, SortSpec, ValueCategory,
};
pub use options::ParsingOptions;
pub use pipeline::{GridPipeline, GridResponse};
pub use source::{AsyncQueryable, BlockingQueryable, InMemorySource, Queryable, SeaOrmSource};
pub use tokio_util::sync::CancellationToken;
