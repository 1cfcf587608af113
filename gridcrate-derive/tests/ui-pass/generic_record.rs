//! Test that generic records compile when the parameter is a grid value
use gridcrate::{GridRecord, GridValue};

#[derive(Debug, GridRecord)]
pub struct Labelled<T: GridValue> {
    pub label: String,
    pub value: T,
}

fn main() {
    let row = Labelled { label: "a".to_string(), value: 3_i32 };
    assert_eq!(
        row.field_value(1),
        gridcrate::FieldValue::Integer(3)
    );
    assert_eq!(Labelled::<i32>::field_descriptors().len(), 2);
}
