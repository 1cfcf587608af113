mod common;

use async_trait::async_trait;
use common::{GridRow, ROW_COUNT, grid_row, params, sample_rows, setup_test_db};
use gridcrate::{
    AsyncQueryable, CancellationToken, GridError, GridPipeline, GridRecord, InMemorySource,
    Predicate, Queryable, RecordOrder, RequestParser, SeaOrmSource,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Narrow view of a row, exposing the text column under another name
#[derive(Debug, Clone, PartialEq, GridRecord, Serialize)]
struct Summary {
    #[grid(rename = "Id")]
    id: i32,
    #[grid(rename = "Label", column = "string_val")]
    label: String,
    #[grid(rename = "IntVal")]
    int_val: i32,
}

impl From<GridRow> for Summary {
    fn from(row: GridRow) -> Self {
        Self {
            id: row.id,
            label: row.string_val,
            int_val: row.int_val,
        }
    }
}

#[tokio::test]
async fn test_counts_and_paging() {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new()
        .parse(&params(&[
            ("draw", "7"),
            ("start", "50"),
            ("length", "25"),
            ("columns[0][data]", "Id"),
            ("order[0][column]", "0"),
        ]))
        .unwrap();

    let response = GridPipeline::new(&request)
        .run_async(
            SeaOrmSource::<grid_row::Entity>::all(&db),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.draw.as_deref(), Some("7"));
    assert_eq!(response.records_total, ROW_COUNT as u64);
    assert_eq!(response.records_filtered, ROW_COUNT as u64);
    let ids: Vec<i32> = response.data.iter().map(|row| row.id).collect();
    assert_eq!(ids, (51..=60).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_base_query_is_respected() {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new().parse(&params(&[])).unwrap();

    let none = SeaOrmSource::new(
        &db,
        grid_row::Entity::find().filter(grid_row::Column::Id.lt(0)),
    );
    let response = GridPipeline::new(&request)
        .run_async(none, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.records_total, 0);
    assert!(response.data.is_empty());

    let some = SeaOrmSource::new(
        &db,
        grid_row::Entity::find().filter(grid_row::Column::Id.lte(10)),
    );
    let response = GridPipeline::new(&request)
        .run_async(some, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.records_total, 10);
    assert_eq!(response.data.len(), 10);
}

#[tokio::test]
async fn test_no_matches_keeps_total() {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new()
        .parse(&params(&[
            ("filter[StringVal][filterCategory]", "0"),
            ("filter[StringVal][filterType]", "0"),
            ("filter[StringVal]", "nothing like this"),
        ]))
        .unwrap();

    let response = GridPipeline::new(&request)
        .run_async(
            SeaOrmSource::<grid_row::Entity>::all(&db),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(response.records_total, ROW_COUNT as u64);
    assert_eq!(response.records_filtered, 0);
    assert!(response.data.is_empty());
}

#[tokio::test]
async fn test_projection_filters_on_projected_fields() {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new()
        .parse(&params(&[
            ("search[value]", "other"),
            ("filter[Label][filterCategory]", "0"),
            ("filter[Label][filterType]", "2"),
            ("filter[Label]", "echo"),
            ("columns[0][data]", "IntVal"),
            ("order[0][column]", "0"),
            ("order[0][dir]", "desc"),
        ]))
        .unwrap();
    let pipeline = GridPipeline::new(&request).with_search_fields(["NullableString"]);

    let database = pipeline
        .run_projected_async(
            SeaOrmSource::<grid_row::Entity>::all(&db),
            |source| source.project(Summary::from),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let memory = pipeline
        .run_projected(InMemorySource::new(sample_rows()), |source| {
            source.map(Summary::from)
        })
        .unwrap();

    let mut expected: Vec<Summary> = sample_rows()
        .into_iter()
        .filter(|row| {
            row.nullable_string
                .as_deref()
                .is_some_and(|s| s.to_uppercase().contains("OTHER"))
        })
        .map(Summary::from)
        .filter(|summary| summary.label.to_uppercase().contains("ECHO"))
        .collect();
    expected.sort_by(|a, b| b.int_val.cmp(&a.int_val));

    assert!(!expected.is_empty());
    assert_eq!(database.data, expected);
    assert_eq!(memory.data, expected);
    assert_eq!(database.records_filtered, memory.records_filtered);
}

#[tokio::test]
async fn test_footer_is_serialized() {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new()
        .parse(&params(&[("length", "2"), ("start", "0")]))
        .unwrap();

    let response = GridPipeline::new(&request)
        .run_async(
            SeaOrmSource::<grid_row::Entity>::all(&db),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let total: i64 = response.data.iter().map(|row| i64::from(row.int_val)).sum();
    let json = serde_json::to_value(response.with_footer(serde_json::json!({ "IntVal": total })))
        .unwrap();

    assert_eq!(json["footerData"]["IntVal"], total);
    assert_eq!(json["recordsTotal"], ROW_COUNT);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new().parse(&params(&[])).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = GridPipeline::new(&request)
        .run_async(SeaOrmSource::<grid_row::Entity>::all(&db), &cancel)
        .await;
    assert!(matches!(result, Err(GridError::Cancelled)));
}

/// Source that fires `cancel` once `counts_left` counts have completed
struct CancelAfter<S> {
    inner: S,
    cancel: CancellationToken,
    counts_left: Arc<AtomicUsize>,
    fetched: Arc<AtomicBool>,
}

impl<S: Queryable> Queryable for CancelAfter<S> {
    type Item = S::Item;

    fn filter(self, predicate: &Predicate<Self::Item>) -> Result<Self, GridError> {
        let inner = self.inner.filter(predicate)?;
        Ok(Self { inner, ..self })
    }

    fn order(self, order: &RecordOrder<Self::Item>) -> Result<Self, GridError> {
        let inner = self.inner.order(order)?;
        Ok(Self { inner, ..self })
    }

    fn paginate(self, skip: u64, take: u64) -> Self {
        let inner = self.inner.paginate(skip, take);
        Self { inner, ..self }
    }
}

#[async_trait]
impl<S> AsyncQueryable for CancelAfter<S>
where
    S: AsyncQueryable,
    S::Item: Send,
{
    async fn count_async(&self) -> Result<u64, GridError> {
        let count = self.inner.count_async().await?;
        if self.counts_left.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.cancel.cancel();
        }
        Ok(count)
    }

    async fn fetch_async(self) -> Result<Vec<Self::Item>, GridError> {
        self.fetched.store(true, Ordering::SeqCst);
        self.inner.fetch_async().await
    }
}

/// Run a filtered, sorted page and cancel after `counts` counts.
/// Returns the result, the counts still pending and whether rows were fetched.
async fn run_cancelled_after(counts: usize) -> (Result<Vec<i32>, GridError>, usize, bool) {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new()
        .parse(&params(&[
            ("length", "5"),
            ("columns[0][data]", "Id"),
            ("order[0][column]", "0"),
            ("filter[IntVal][filterCategory]", "1"),
            ("filter[IntVal][filterType]", "6"),
            ("filter[IntVal]", "0"),
        ]))
        .unwrap();
    let cancel = CancellationToken::new();
    let counts_left = Arc::new(AtomicUsize::new(counts));
    let fetched = Arc::new(AtomicBool::new(false));
    let source = CancelAfter {
        inner: SeaOrmSource::<grid_row::Entity>::all(&db),
        cancel: cancel.clone(),
        counts_left: Arc::clone(&counts_left),
        fetched: Arc::clone(&fetched),
    };

    let result = GridPipeline::new(&request)
        .run_async(source, &cancel)
        .await
        .map(|response| response.data.iter().map(|row| row.id).collect());
    (
        result,
        counts_left.load(Ordering::SeqCst),
        fetched.load(Ordering::SeqCst),
    )
}

#[tokio::test]
async fn test_cancelled_during_total_count_stops_at_filtered_count() {
    let (result, counts_left, fetched) = run_cancelled_after(1).await;
    assert!(matches!(result, Err(GridError::Cancelled)));
    // The filtered count never ran
    assert_eq!(counts_left, 0);
    assert!(!fetched);
}

#[tokio::test]
async fn test_cancelled_during_filtered_count_stops_before_fetch() {
    let (result, counts_left, fetched) = run_cancelled_after(2).await;
    assert!(matches!(result, Err(GridError::Cancelled)));
    assert_eq!(counts_left, 0);
    assert!(!fetched);
}

#[tokio::test]
async fn test_uncancelled_wrapper_runs_to_completion() {
    let (result, _, fetched) = run_cancelled_after(usize::MAX).await;
    let expected: Vec<i32> = sample_rows()
        .iter()
        .filter(|row| row.int_val > 0)
        .take(5)
        .map(|row| row.id)
        .collect();
    assert_eq!(result.unwrap(), expected);
    assert!(fetched);
}

/// Same request against SQL and memory, returning both id lists
async fn page_ids(pairs: &[(&str, &str)]) -> (Vec<i32>, Vec<i32>) {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new().parse(&params(pairs)).unwrap();
    let pipeline = GridPipeline::new(&request);
    let database = pipeline
        .run_async(
            SeaOrmSource::<grid_row::Entity>::all(&db),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let memory = pipeline.run(InMemorySource::new(sample_rows())).unwrap();
    let ids = |rows: &[GridRow]| rows.iter().map(|row| row.id).collect::<Vec<_>>();
    (ids(&database.data), ids(&memory.data))
}

#[tokio::test]
async fn test_ties_on_sort_key_page_by_primary_key() {
    let mut expected = sample_rows();
    expected.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
    let expected: Vec<i32> = expected.iter().skip(5).take(10).map(|row| row.id).collect();

    // Every date is shared by three rows
    let (database, memory) = page_ids(&[
        ("start", "5"),
        ("length", "10"),
        ("columns[0][data]", "Date"),
        ("order[0][column]", "0"),
        ("order[0][dir]", "desc"),
    ])
    .await;
    assert_eq!(database, expected);
    assert_eq!(memory, expected);
}

#[tokio::test]
async fn test_unsorted_page_follows_primary_key() {
    let (database, memory) = page_ids(&[("start", "10"), ("length", "5")]).await;
    assert_eq!(database, (11..=15).collect::<Vec<_>>());
    assert_eq!(memory, database);
}

#[tokio::test]
async fn test_unknown_field_fails_before_querying() {
    let db = setup_test_db().await.unwrap();
    let request = RequestParser::new()
        .parse(&params(&[
            ("columns[0][data]", "Missing"),
            ("order[0][column]", "0"),
        ]))
        .unwrap();

    let result = GridPipeline::new(&request)
        .run_async(
            SeaOrmSource::<grid_row::Entity>::all(&db),
            &CancellationToken::new(),
        )
        .await;
    assert!(matches!(
        result,
        Err(GridError::FieldNotFound { ref field, .. }) if field == "Missing"
    ));
}

#[tokio::test]
async fn test_closure_predicates_are_refused() {
    let db = setup_test_db().await.unwrap();
    let predicate = Predicate::<GridRow>::from_fn(|row| row.id > 3);

    let result = SeaOrmSource::<grid_row::Entity>::all(&db).filter(&predicate);
    assert!(matches!(result, Err(GridError::PushdownUnavailable)));

    // The same predicate works in memory
    let kept = InMemorySource::new(sample_rows())
        .filter(&predicate)
        .unwrap()
        .count_async()
        .await
        .unwrap();
    assert_eq!(kept, ROW_COUNT as u64 - 3);
}

#[tokio::test]
async fn test_fetch_converts_rows() {
    let db = setup_test_db().await.unwrap();
    let rows = SeaOrmSource::<grid_row::Entity>::all(&db)
        .project(Summary::from)
        .paginate(0, 3)
        .fetch_async()
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
}
