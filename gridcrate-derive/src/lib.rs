mod attribute_parser;
mod record_derive;
mod value_derive;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `gridcrate::GridRecord` for a struct with named fields.
///
/// Every field type must implement `gridcrate::GridValue`. Field attributes:
///
/// - `#[grid(rename = "Name")]`: name requests use for this field
///   (default: the Rust field name)
/// - `#[grid(column = "col")]`: database column for push-down
///   (default: `#[sea_orm(column_name)]`, then the Rust field name)
/// - `#[grid(skip)]`: hide the field from filtering, search and sorting
///
/// ```rust,ignore
/// #[derive(Clone, Debug, DeriveEntityModel, GridRecord)]
/// #[sea_orm(table_name = "accounts")]
/// pub struct Model {
///     #[sea_orm(primary_key)]
///     pub id: i32,
///     #[grid(rename = "AccountNumber")]
///     pub account_number: String,
///     pub balance: Option<Decimal>,
/// }
/// ```
#[proc_macro_derive(GridRecord, attributes(grid))]
pub fn grid_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record_derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derives `gridcrate::GridValue` for an enum of unit variants, so it can be
/// used as a record field. Variants are matched by name, case-insensitively;
/// `#[grid(rename = "...")]` changes a variant's name.
#[proc_macro_derive(GridValue, attributes(grid))]
pub fn grid_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    value_derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
