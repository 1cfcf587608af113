//! Test that field attributes and optional fields compile
use chrono::NaiveDate;
use gridcrate::{GridRecord, GridValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, GridValue)]
pub enum Priority {
    Low,
    #[grid(rename = "urgent")]
    High,
}

#[derive(Clone, Debug, GridRecord)]
pub struct Ticket {
    pub id: i64,
    #[grid(rename = "Title")]
    pub title: String,
    #[grid(column = "due_on")]
    pub due: Option<NaiveDate>,
    pub priority: Priority,
    #[grid(skip)]
    pub internal: Vec<String>,
    pub r#type: Option<String>,
}

fn main() {
    let fields = Ticket::field_descriptors();
    assert_eq!(fields.len(), 5);
}
