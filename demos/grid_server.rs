//! Grid endpoints over a database table and an in-memory list
//!
//! ```bash
//! cargo run --example grid_server
//! ```
//!
//! Then try:
//! - <http://localhost:3000/accounts?length=5&search%5Bvalue%5D=north>
//! - <http://localhost:3000/branches?filter[Region][filterCategory]=4&filter[Region]=north,south>
//!
//! Set `GRID_OPTIONS` to a JSON file to change parameter names or the number
//! and date locale.

use axum::{Router, extract::State, routing::get};
use chrono::NaiveDate;
use gridcrate::{
    CancellationToken, GridError, GridPipeline, GridRecord, GridRequest, GridResponse, GridValue,
    InMemorySource, ParsingOptions, SeaOrmSource,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, entity::prelude::*};
use serde::Serialize;
use std::{env, sync::Arc};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, GridRecord, Serialize)]
#[sea_orm(table_name = "accounts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[grid(rename = "Id")]
    pub id: i32,
    #[grid(rename = "Name")]
    pub name: String,
    #[grid(rename = "AccountNumber")]
    pub account_number: String,
    #[grid(rename = "Balance")]
    pub balance: Decimal,
    #[grid(rename = "OpenedOn")]
    pub opened_on: Date,
    #[grid(rename = "ClosedOn")]
    pub closed_on: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}
impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, GridValue)]
enum Region {
    North,
    South,
    #[grid(rename = "east-coast")]
    EastCoast,
}

#[derive(Clone, Debug, Serialize, GridRecord)]
#[serde(rename_all = "camelCase")]
struct Branch {
    #[grid(rename = "Code")]
    code: String,
    #[grid(rename = "Region")]
    region: Region,
    #[grid(rename = "Staff")]
    staff: u32,
}

#[derive(Serialize)]
struct Totals {
    balance: Decimal,
}

async fn list_accounts(
    State(db): State<DatabaseConnection>,
    GridRequest(request): GridRequest,
) -> Result<GridResponse<Model, Totals>, GridError> {
    let response = GridPipeline::new(&request)
        .with_search_fields(["Name", "AccountNumber"])
        .run_async(SeaOrmSource::<Entity>::all(&db), &CancellationToken::new())
        .await?;
    let balance = response.data.iter().map(|account| account.balance).sum();
    Ok(response.with_footer(Totals { balance }))
}

async fn list_branches(
    State(branches): State<Arc<Vec<Branch>>>,
    GridRequest(request): GridRequest,
) -> Result<GridResponse<Branch>, GridError> {
    GridPipeline::new(&request)
        .with_search_fields(["Code"])
        .run(InMemorySource::new(branches.as_ref().clone()))
}

async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    db.execute(backend.build(&Schema::new(backend).create_table_from_entity(Entity)))
        .await?;

    let names = ["North Mill", "South Quay", "Harbour Trust", "Northgate Co-op"];
    let opened = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap_or_default();
    let accounts = (0_i32..40).map(|i| ActiveModel {
        name: sea_orm::Set(format!("{} {i}", names[i.unsigned_abs() as usize % names.len()])),
        account_number: sea_orm::Set(format!("{:04}{:06}", 1000 + i % 3, i * 7919)),
        balance: sea_orm::Set(Decimal::new(i64::from(i) * 12_345, 2)),
        opened_on: sea_orm::Set(opened + chrono::Days::new(u64::from(i.unsigned_abs()) * 17)),
        closed_on: sea_orm::Set((i % 6 == 0).then_some(opened + chrono::Days::new(900))),
        ..Default::default()
    });
    Entity::insert_many(accounts).exec(db).await?;
    Ok(())
}

fn branches() -> Vec<Branch> {
    [
        ("N-01", Region::North, 12),
        ("N-02", Region::North, 4),
        ("S-01", Region::South, 9),
        ("E-01", Region::EastCoast, 21),
        ("E-02", Region::EastCoast, 7),
    ]
    .into_iter()
    .map(|(code, region, staff)| Branch {
        code: code.to_string(),
        region,
        staff,
    })
    .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gridcrate=trace")),
        )
        .init();

    if let Ok(path) = env::var("GRID_OPTIONS") {
        ParsingOptions::from_json_str(&std::fs::read_to_string(path)?)?.install_global()?;
    }

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = Database::connect(&database_url).await?;
    seed(&db).await?;

    let app = Router::new()
        .route("/accounts", get(list_accounts))
        .with_state(db)
        .merge(
            Router::new()
                .route("/branches", get(list_branches))
                .with_state(Arc::new(branches())),
        );

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Grid API listening on http://0.0.0.0:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
