// Record model and the per-type field tables that filtering and sorting
// resolve names against.

pub mod predicate;
pub mod record;
pub mod resolver;

// Re-export commonly used items
pub use predicate::{Predicate, RecordOrder, SortKey};
pub use record::{FieldDescriptor, FieldKind, FieldValue, GridRecord, GridValue};
pub use resolver::FieldResolver;
