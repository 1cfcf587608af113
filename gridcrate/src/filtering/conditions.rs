use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{
    Condition, Value,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};
use std::cmp::Ordering;
use uuid::Uuid;

use super::search::escape_like_wildcards;
use crate::core::{FieldDescriptor, FieldKind, FieldValue, GridRecord, Predicate};
use crate::errors::GridError;
use crate::models::{
    DateFilter, FilterCategory, FilterOperator, FilterSpec, MultiSelectFilter, NumericFilter,
    NumericValue, SingleSelectFilter, TextFilter,
};
use crate::options::ParsingOptions;

fn column(field: &FieldDescriptor) -> Expr {
    Expr::col(Alias::new(field.column()))
}

fn like(pattern: String) -> LikeExpr {
    LikeExpr::new(pattern).escape('\\')
}

fn never() -> Condition {
    Condition::all().add(Expr::val(1).eq(0))
}

fn type_mismatch(field: &FieldDescriptor, category: FilterCategory) -> GridError {
    GridError::TypeMismatch {
        field: field.name().to_string(),
        category,
        kind: field.kind(),
    }
}

fn unsupported(
    field: &FieldDescriptor,
    category: FilterCategory,
    operator: FilterOperator,
) -> GridError {
    GridError::UnsupportedOperator {
        field: field.name().to_string(),
        category,
        operator,
    }
}

/// Ordering comparisons shared by numeric and date filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    const fn from_operator(operator: FilterOperator) -> Option<Self> {
        Some(match operator {
            FilterOperator::Equals => Self::Eq,
            FilterOperator::NotEqual => Self::Ne,
            FilterOperator::GreaterThan => Self::Gt,
            FilterOperator::GreaterThanOrEqual => Self::Gte,
            FilterOperator::LessThan => Self::Lt,
            FilterOperator::LessThanOrEqual => Self::Lte,
            _ => return None,
        })
    }

    /// `ordering` is the record's value compared to the filter operand
    const fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Gt => ordering.is_gt(),
            Self::Gte => ordering.is_ge(),
            Self::Lt => ordering.is_lt(),
            Self::Lte => ordering.is_le(),
        }
    }

    /// Null fields only satisfy `NotEqual`
    const fn accepts_null(self) -> bool {
        matches!(self, Self::Ne)
    }

    fn condition(self, field: &FieldDescriptor, value: Value) -> Condition {
        let expr = match self {
            Self::Eq => column(field).eq(value),
            Self::Ne => return not_equal(field, column(field).ne(value)),
            Self::Gt => column(field).gt(value),
            Self::Gte => column(field).gte(value),
            Self::Lt => column(field).lt(value),
            Self::Lte => column(field).lte(value),
        };
        Condition::all().add(expr)
    }

    /// Day-granular comparison against a timestamp column: the day covers
    /// `[start, next)` where `next` is midnight of the following day.
    fn day_condition(self, field: &FieldDescriptor, day: NaiveDate) -> Condition {
        let bound = |at: NaiveDateTime| match field.kind() {
            FieldKind::DateTimeUtc => Value::from(at.and_utc()),
            _ => Value::from(at),
        };
        let start = bound(day.and_time(NaiveTime::MIN));
        let next = day.succ_opt().map(|d| bound(d.and_time(NaiveTime::MIN)));

        let before_next = || {
            next.clone().map_or_else(
                || column(field).is_not_null(),
                |next| column(field).lt(next),
            )
        };
        let from_next = || next.clone().map(|next| column(field).gte(next));

        match self {
            Self::Eq => Condition::all()
                .add(column(field).gte(start))
                .add(before_next()),
            Self::Ne => {
                let mut outside = Condition::any().add(column(field).lt(start));
                if let Some(after) = from_next() {
                    outside = outside.add(after);
                }
                if field.is_optional() {
                    outside = outside.add(column(field).is_null());
                }
                outside
            }
            Self::Gt => from_next().map_or_else(never, |after| Condition::all().add(after)),
            Self::Gte => Condition::all().add(column(field).gte(start)),
            Self::Lt => Condition::all().add(column(field).lt(start)),
            Self::Lte => Condition::all().add(before_next()),
        }
    }
}

/// `<>` that also keeps nulls, matching the in-memory lifted comparison
fn not_equal(field: &FieldDescriptor, expr: SimpleExpr) -> Condition {
    let condition = Condition::any().add(expr);
    if field.is_optional() {
        condition.add(column(field).is_null())
    } else {
        condition
    }
}

/// Resolve the filter's field on `R` and compile it.
///
/// # Errors
///
/// `FieldNotFound` if the field does not exist, otherwise see
/// [`compile_field_filter`].
pub fn compile_filter<R: GridRecord + 'static>(
    filter: &FilterSpec,
    options: &ParsingOptions,
) -> Result<Predicate<R>, GridError> {
    let field = R::resolver().resolve(filter.field())?;
    compile_field_filter(field, filter, options)
}

/// Compile every filter, failing on the first error.
///
/// # Errors
///
/// See [`compile_filter`].
pub fn compile_filters<R: GridRecord + 'static>(
    filters: &[FilterSpec],
    options: &ParsingOptions,
) -> Result<Vec<Predicate<R>>, GridError> {
    filters
        .iter()
        .map(|filter| compile_filter(filter, options))
        .collect()
}

/// Compile one filter against an already resolved field.
///
/// # Errors
///
/// - `TypeMismatch` when the filter category cannot apply to the field kind
/// - `UnsupportedOperator` when the operator is outside the category's set,
///   including a `Between` that was not split into bounds
pub fn compile_field_filter<R: GridRecord + 'static>(
    field: &FieldDescriptor,
    filter: &FilterSpec,
    options: &ParsingOptions,
) -> Result<Predicate<R>, GridError> {
    match filter {
        FilterSpec::Text(text) => compile_text(field, text),
        FilterSpec::Numeric(numeric) => compile_numeric(field, numeric),
        FilterSpec::Date(date) => compile_date(field, date),
        FilterSpec::SingleSelect(select) => Ok(compile_single_select(field, select, options)),
        FilterSpec::MultiSelect(select) => Ok(compile_multi_select(field, select, options)),
    }
}

fn text_matches(operator: FilterOperator, value: &str, needle: &str) -> bool {
    match operator {
        FilterOperator::Equals => value == needle,
        FilterOperator::NotEqual => value != needle,
        FilterOperator::Contains => value.contains(needle),
        FilterOperator::DoesNotContain => !value.contains(needle),
        FilterOperator::StartsWith => value.starts_with(needle),
        FilterOperator::EndsWith => value.ends_with(needle),
        _ => false,
    }
}

fn compile_text<R: GridRecord + 'static>(
    field: &FieldDescriptor,
    filter: &TextFilter,
) -> Result<Predicate<R>, GridError> {
    if field.kind() != FieldKind::Text {
        return Err(type_mismatch(field, FilterCategory::Text));
    }

    // `UPPER` folds ASCII letters only on SQLite; fold the same way here
    let needle = filter.value.to_ascii_uppercase();
    let escaped = escape_like_wildcards(&needle);
    let upper = || Expr::expr(Func::upper(column(field)));
    let condition = match filter.operator {
        FilterOperator::Equals => upper().eq(needle.clone()),
        FilterOperator::NotEqual => upper().ne(needle.clone()),
        FilterOperator::Contains => upper().like(like(format!("%{escaped}%"))),
        FilterOperator::DoesNotContain => upper().not_like(like(format!("%{escaped}%"))),
        FilterOperator::StartsWith => upper().like(like(format!("{escaped}%"))),
        FilterOperator::EndsWith => upper().like(like(format!("%{escaped}"))),
        operator => return Err(unsupported(field, FilterCategory::Text, operator)),
    };

    let operator = filter.operator;
    let descriptor = field.clone();
    Ok(Predicate::new(
        move |record: &R| match descriptor.read(record) {
            FieldValue::Text(value) => {
                text_matches(operator, &value.to_ascii_uppercase(), &needle)
            }
            _ => false,
        },
        Condition::all().add(condition),
    ))
}

fn compare_numeric(value: &FieldValue, target: NumericValue) -> Option<Ordering> {
    match value {
        FieldValue::Float(f) => f.partial_cmp(&target.to_decimal().to_f64()?),
        other => Some(other.as_decimal()?.cmp(&target.to_decimal())),
    }
}

/// Query parameter for a numeric operand, typed after the column
fn numeric_param(kind: FieldKind, value: NumericValue) -> Value {
    let decimal = value.to_decimal();
    let float = |d: Decimal| Value::from(d.to_f64().unwrap_or(f64::NAN));
    match kind {
        FieldKind::Decimal => Value::from(decimal),
        FieldKind::Integer if decimal.fract().is_zero() => {
            decimal.to_i64().map_or_else(|| float(decimal), Value::from)
        }
        _ => float(decimal),
    }
}

fn compile_numeric<R: GridRecord + 'static>(
    field: &FieldDescriptor,
    filter: &NumericFilter,
) -> Result<Predicate<R>, GridError> {
    if !field.kind().is_numeric() {
        return Err(type_mismatch(field, FilterCategory::Numeric));
    }
    let comparison = Comparison::from_operator(filter.operator)
        .ok_or_else(|| unsupported(field, FilterCategory::Numeric, filter.operator))?;

    let condition = comparison.condition(field, numeric_param(field.kind(), filter.value));
    let target = filter.value;
    let descriptor = field.clone();
    Ok(Predicate::new(
        move |record: &R| {
            let value = descriptor.read(record);
            if value.is_null() {
                return comparison.accepts_null();
            }
            compare_numeric(&value, target).is_some_and(|ordering| comparison.accepts(ordering))
        },
        condition,
    ))
}

fn compile_date<R: GridRecord + 'static>(
    field: &FieldDescriptor,
    filter: &DateFilter,
) -> Result<Predicate<R>, GridError> {
    if !field.kind().is_temporal() {
        return Err(type_mismatch(field, FilterCategory::Date));
    }
    let comparison = Comparison::from_operator(filter.operator)
        .ok_or_else(|| unsupported(field, FilterCategory::Date, filter.operator))?;

    let day = filter.value;
    let condition = if field.kind() == FieldKind::Date {
        comparison.condition(field, Value::from(day))
    } else {
        comparison.day_condition(field, day)
    };

    let descriptor = field.clone();
    Ok(Predicate::new(
        move |record: &R| {
            descriptor.read(record).day().map_or_else(
                || comparison.accepts_null(),
                |value| comparison.accepts(value.cmp(&day)),
            )
        },
        condition,
    ))
}

/// Convert a raw select value to the field's kind
fn coerce(field: &FieldDescriptor, raw: &str, options: &ParsingOptions) -> Option<FieldValue> {
    let trimmed = raw.trim();
    match field.kind() {
        FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
        FieldKind::Integer => options.parse_integer(trimmed).map(FieldValue::Integer),
        FieldKind::Float => options
            .parse_decimal(trimmed)
            .and_then(|d| d.to_f64())
            .map(FieldValue::Float),
        FieldKind::Decimal => options.parse_decimal(trimmed).map(FieldValue::Decimal),
        FieldKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(FieldValue::Bool(true)),
            "false" | "0" => Some(FieldValue::Bool(false)),
            _ => None,
        },
        FieldKind::Date => options.parse_date(trimmed).map(FieldValue::Date),
        FieldKind::DateTime => options.parse_date_time(trimmed).map(FieldValue::DateTime),
        FieldKind::DateTimeUtc => options
            .parse_date_time(trimmed)
            .map(|dt| FieldValue::DateTimeUtc(dt.and_utc())),
        FieldKind::Uuid => Uuid::parse_str(trimmed).ok().map(FieldValue::Uuid),
        FieldKind::Enum(variants) => variants
            .iter()
            .find(|variant| variant.eq_ignore_ascii_case(trimmed))
            .map(|variant| FieldValue::Enum(*variant)),
    }
}

/// Equality against any of `values`; an empty set filters nothing out
fn membership<R: GridRecord + 'static>(
    field: &FieldDescriptor,
    values: Vec<FieldValue>,
) -> Predicate<R> {
    let params: Vec<Value> = values.iter().filter_map(FieldValue::to_sea_value).collect();
    let expr = match params.as_slice() {
        [] => return Predicate::always(),
        [single] => column(field).eq(single.clone()),
        _ => column(field).is_in(params),
    };

    let descriptor = field.clone();
    Predicate::new(
        move |record: &R| {
            let value = descriptor.read(record);
            !value.is_null() && values.contains(&value)
        },
        Condition::all().add(expr),
    )
}

fn compile_single_select<R: GridRecord + 'static>(
    field: &FieldDescriptor,
    filter: &SingleSelectFilter,
    options: &ParsingOptions,
) -> Predicate<R> {
    let Some(value) = coerce(field, &filter.value, options) else {
        tracing::debug!(
            field = field.name(),
            value = %filter.value,
            kind = field.kind().name(),
            "Select value does not fit the field; ignoring filter"
        );
        return Predicate::always();
    };
    membership(field, vec![value])
}

fn compile_multi_select<R: GridRecord + 'static>(
    field: &FieldDescriptor,
    filter: &MultiSelectFilter,
    options: &ParsingOptions,
) -> Predicate<R> {
    let values: Vec<FieldValue> = filter
        .values
        .iter()
        .filter_map(|raw| {
            let value = coerce(field, raw, options);
            if value.is_none() {
                tracing::debug!(field = field.name(), value = %raw, "Dropping select value");
            }
            value
        })
        .collect();
    membership(field, values)
}
