use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::collections::HashMap;
use uuid::Uuid;

pub use grid_row::Level;

pub mod grid_row {
    use gridcrate::{GridRecord, GridValue};
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, GridRecord, Serialize, Deserialize)]
    #[sea_orm(table_name = "grid_rows")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        #[grid(rename = "Id")]
        pub id: i32,
        #[grid(rename = "IntVal")]
        pub int_val: i32,
        #[grid(rename = "NullableInt")]
        pub nullable_int: Option<i32>,
        #[grid(rename = "Double")]
        pub double: f64,
        #[grid(rename = "StringVal")]
        pub string_val: String,
        #[grid(rename = "NullableString")]
        pub nullable_string: Option<String>,
        #[grid(rename = "AccountNumber")]
        pub account_number: String,
        #[grid(rename = "Date")]
        pub date: Date,
        #[grid(rename = "Timestamp")]
        pub timestamp: DateTime,
        #[grid(rename = "NullableDate")]
        pub nullable_date: Option<Date>,
        #[grid(rename = "Active")]
        pub active: Option<bool>,
        #[grid(rename = "Level")]
        pub level: Level,
        #[grid(rename = "Key")]
        pub key: Uuid,
        #[grid(rename = "StampUtc")]
        pub stamp_utc: DateTimeUtc,
        #[grid(rename = "Balance")]
        pub balance: Decimal,
        #[grid(rename = "Title")]
        pub title: String,
        #[grid(skip)]
        pub notes: String,
    }

    #[derive(
        Clone,
        Copy,
        Debug,
        PartialEq,
        Eq,
        EnumIter,
        DeriveActiveEnum,
        GridValue,
        Serialize,
        Deserialize,
    )]
    #[sea_orm(rs_type = "String", db_type = "Text")]
    pub enum Level {
        #[sea_orm(string_value = "Low")]
        Low,
        #[sea_orm(string_value = "Medium")]
        Medium,
        #[sea_orm(string_value = "High")]
        High,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub use grid_row::Model as GridRow;

pub const ROW_COUNT: i32 = 60;

const WORDS: [&str; 5] = ["alpha", "Bravo", "charlie", "Delta", "echo_test"];

/// Same word with non-ASCII letters in different cases
pub const TITLES: [&str; 4] = ["café", "CAFÉ", "Café", "plain"];

/// Deterministic fixture with nulls, mixed case text and repeated values
#[allow(clippy::cast_sign_loss, clippy::missing_panics_doc)]
pub fn sample_rows() -> Vec<GridRow> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (1..=ROW_COUNT)
        .map(|i| {
            let day = start + Days::new((i % 20) as u64);
            let timestamp = day
                .and_hms_opt((i % 24) as u32, ((i * 7) % 60) as u32, 0)
                .unwrap();
            GridRow {
                id: i,
                int_val: (i * 37) % 1500 - 100,
                nullable_int: (i % 4 != 0).then_some((i * 123) % 1000),
                double: f64::from(i) * 1.5,
                string_val: format!("{} item {i}", WORDS[(i % 5) as usize]),
                nullable_string: match i % 5 {
                    0 => None,
                    1 => Some(format!("Test {i}")),
                    2 => Some(format!("contest{i}")),
                    3 => Some("TESTING".to_string()),
                    _ => Some(format!("other {i}")),
                },
                account_number: format!("{:03}{:04}", i % 7, i * 11),
                date: day,
                timestamp,
                nullable_date: (i % 3 != 0).then_some(day),
                active: match i % 4 {
                    0 => None,
                    1 | 2 => Some(true),
                    _ => Some(false),
                },
                level: match i % 3 {
                    0 => Level::Low,
                    1 => Level::Medium,
                    _ => Level::High,
                },
                key: Uuid::from_u128(0x5eed_0000 + i as u128),
                stamp_utc: timestamp.and_utc(),
                balance: Decimal::new(i64::from(i) * 25, 2),
                title: format!("{} {i}", TITLES[(i % 4) as usize]),
                notes: format!("note {i}"),
            }
        })
        .collect()
}

/// In-memory SQLite database with the fixture loaded
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(grid_row::Entity)))
        .await?;

    let rows = sample_rows().into_iter().map(|row| grid_row::ActiveModel {
        id: Set(row.id),
        int_val: Set(row.int_val),
        nullable_int: Set(row.nullable_int),
        double: Set(row.double),
        string_val: Set(row.string_val),
        nullable_string: Set(row.nullable_string),
        account_number: Set(row.account_number),
        date: Set(row.date),
        timestamp: Set(row.timestamp),
        nullable_date: Set(row.nullable_date),
        active: Set(row.active),
        level: Set(row.level),
        key: Set(row.key),
        stamp_utc: Set(row.stamp_utc),
        balance: Set(row.balance),
        title: Set(row.title),
        notes: Set(row.notes),
    });
    grid_row::Entity::insert_many(rows).exec(&db).await?;
    Ok(db)
}

pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Percent-encode the characters of grid parameter names that a URI rejects
#[allow(dead_code)]
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    let encode = |s: &str| {
        s.replace('%', "%25")
            .replace('[', "%5B")
            .replace(']', "%5D")
            .replace(' ', "%20")
            .replace(';', "%3B")
            .replace('&', "%26")
    };
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
