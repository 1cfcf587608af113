use sea_orm::sea_query::{NullOrdering, Order};

use crate::core::{GridRecord, RecordOrder, SortKey};
use crate::errors::GridError;
use crate::models::{SortDirection, SortSpec};

/// Compile sort specs into a multi-key ordering over `R`.
///
/// The first spec is the primary key and later specs break ties in order.
/// Nulls sort before every value when ascending.
///
/// # Errors
///
/// Returns `FieldNotFound` if any `SortSpec` names a field `R` does not have.
pub fn compile_sort<R: GridRecord + 'static>(
    specs: &[SortSpec],
) -> Result<RecordOrder<R>, GridError> {
    let resolver = R::resolver();
    let keys = specs
        .iter()
        .map(|spec| {
            Ok(SortKey {
                field: resolver.resolve(&spec.field)?.clone(),
                direction: spec.direction,
            })
        })
        .collect::<Result<Vec<_>, GridError>>()?;
    Ok(RecordOrder::from_keys(keys))
}

/// Query ordering for one key, with nulls placed as they are in memory
#[must_use]
pub fn query_order(key: &SortKey) -> (Order, NullOrdering) {
    match key.direction {
        SortDirection::Ascending => (Order::Asc, NullOrdering::First),
        SortDirection::Descending => (Order::Desc, NullOrdering::Last),
    }
}
