//! # Request Parsing & Compilation
//!
//! This module turns the flat parameter map a grid widget sends into typed
//! specs, and compiles those specs against a [`GridRecord`](crate::GridRecord)
//! into predicates and orderings.
//!
//! ## Main Components
//!
//! - **[`RequestParser`]**: parameters to [`RequestSpec`](crate::RequestSpec)
//! - **[`compile_filter`]**: one column filter to a [`Predicate`](crate::Predicate)
//! - **[`compile_search`]**: free-text search over a list of fields
//! - **[`compile_sort`]**: sort specs to a [`RecordOrder`](crate::RecordOrder)
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Paging and free-text search
//! GET /accounts?draw=1&start=20&length=10&search[value]=acme
//!
//! // Sort by the second column, descending
//! GET /accounts?columns[1][data]=Balance&order[0][column]=1&order[0][dir]=desc
//!
//! // Text filter: Name contains "ltd"
//! GET /accounts?filter[Name][filterCategory]=0&filter[Name][filterType]=2&filter[Name]=ltd
//!
//! // Numeric range: 10 <= Fee <= 1000
//! GET /accounts?filter[Fee][filterCategory]=1&filter[Fee][filterType]=10&filter[Fee]=10;1000
//!
//! // Multi-select: Status in (Open, Closed)
//! GET /accounts?filter[Status][filterCategory]=4&filter[Status]=Open,Closed
//! ```
//!
//! Every compiled predicate can run in memory. Predicates from these
//! compilers also carry a sea-orm `Condition`, so the same filter can be
//! executed by the database.

pub mod conditions;
pub mod query_parser;
pub mod search;
pub mod sort;

// Re-export commonly used items
pub use conditions::{compile_field_filter, compile_filter, compile_filters};
pub use query_parser::{ParseSections, RequestParser, parse_request};
pub use search::compile_search;
pub use sort::{compile_sort, query_order};
