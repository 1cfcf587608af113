use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::Value;
use std::cmp::Ordering;
use uuid::Uuid;

use super::resolver::FieldResolver;

/// Declared kind of a record field, with `Option<_>` already unwrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Integer,
    Float,
    Decimal,
    Text,
    Date,
    DateTime,
    DateTimeUtc,
    Uuid,
    /// Unit enum stored by variant name
    Enum(&'static [&'static str]),
}

impl FieldKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Decimal)
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::DateTimeUtc)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::DateTimeUtc => "timestamp",
            Self::Uuid => "uuid",
            Self::Enum(_) => "enum",
        }
    }
}

/// A field value read off a record.
///
/// Values carry enough type information to be compared in memory and to be
/// bound as query parameters when a predicate is pushed down to the database.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
    Uuid(Uuid),
    Enum(&'static str),
}

impl FieldValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text used by free-text search. Nulls become the empty string.
    #[must_use]
    pub fn to_search_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::DateTimeUtc(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Uuid(u) => u.to_string(),
            Self::Enum(name) => (*name).to_string(),
        }
    }

    /// Calendar day of a temporal value
    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            Self::DateTimeUtc(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    /// Total order used for sorting: nulls first, then by value. Values of
    /// different kinds (which a well-formed record never produces for the
    /// same field) fall back to comparing their kind rank.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::DateTimeUtc(a), Self::DateTimeUtc(b)) => a.cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.cmp(b),
            (Self::Enum(a), Self::Enum(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Integer(_) => 2,
            Self::Float(_) => 3,
            Self::Decimal(_) => 4,
            Self::Text(_) => 5,
            Self::Date(_) => 6,
            Self::DateTime(_) => 7,
            Self::DateTimeUtc(_) => 8,
            Self::Uuid(_) => 9,
            Self::Enum(_) => 10,
        }
    }

    /// Decimal view of a numeric value
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Integer(i) => Some(Decimal::from(*i)),
            Self::Float(f) => Decimal::try_from(*f).ok(),
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Query parameter for this value. `None` for nulls.
    #[must_use]
    pub fn to_sea_value(&self) -> Option<Value> {
        let value = match self {
            Self::Null => return None,
            Self::Bool(b) => Value::from(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Decimal(d) => Value::from(*d),
            Self::Text(s) => Value::from(s.clone()),
            Self::Date(d) => Value::from(*d),
            Self::DateTime(dt) => Value::from(*dt),
            Self::DateTimeUtc(dt) => Value::from(*dt),
            Self::Uuid(u) => Value::from(*u),
            Self::Enum(name) => Value::from(*name),
        };
        Some(value)
    }
}

/// A type that can appear as a field of a [`GridRecord`].
///
/// Implemented for the common scalar types, `Option<T>`, and for unit enums
/// through `#[derive(GridValue)]`.
pub trait GridValue {
    const KIND: FieldKind;
    const OPTIONAL: bool = false;

    fn to_field_value(&self) -> FieldValue;
}

macro_rules! impl_grid_value_integer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl GridValue for $ty {
                const KIND: FieldKind = FieldKind::Integer;

                fn to_field_value(&self) -> FieldValue {
                    FieldValue::Integer(i64::from(*self))
                }
            }
        )+
    };
}

impl_grid_value_integer!(i8, i16, i32, i64, u8, u16, u32);

impl GridValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

impl GridValue for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(f64::from(*self))
    }
}

impl GridValue for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl GridValue for Decimal {
    const KIND: FieldKind = FieldKind::Decimal;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Decimal(*self)
    }
}

impl GridValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl GridValue for NaiveDate {
    const KIND: FieldKind = FieldKind::Date;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Date(*self)
    }
}

impl GridValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }
}

impl GridValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::DateTimeUtc;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTimeUtc(*self)
    }
}

impl GridValue for Uuid {
    const KIND: FieldKind = FieldKind::Uuid;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }
}

impl<T: GridValue> GridValue for Option<T> {
    const KIND: FieldKind = T::KIND;
    const OPTIONAL: bool = true;

    fn to_field_value(&self) -> FieldValue {
        self.as_ref().map_or(FieldValue::Null, GridValue::to_field_value)
    }
}

/// Resolved, type-carrying handle to a named field on a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    index: usize,
    name: &'static str,
    column: &'static str,
    kind: FieldKind,
    optional: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(
        index: usize,
        name: &'static str,
        column: &'static str,
        kind: FieldKind,
        optional: bool,
    ) -> Self {
        Self {
            index,
            name,
            column,
            kind,
            optional,
        }
    }

    /// Position passed to [`GridRecord::field_value`]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// External name the grid refers to this field by
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Database column used when predicates are pushed down
    #[must_use]
    pub const fn column(&self) -> &'static str {
        self.column
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Read this field off a record
    pub fn read<R: GridRecord>(&self, record: &R) -> FieldValue {
        record.field_value(self.index)
    }
}

/// A record type whose fields can be filtered, searched and sorted by name.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(GridRecord)]
/// pub struct Account {
///     pub id: i32,
///     #[grid(rename = "AccountNumber")]
///     pub account_number: String,
///     pub balance: Option<Decimal>,
///     #[grid(skip)]
///     pub internal_notes: String,
/// }
/// ```
pub trait GridRecord {
    /// Field table, indexed consistently with [`GridRecord::field_value`].
    fn field_descriptors() -> Vec<FieldDescriptor>;

    fn field_value(&self, index: usize) -> FieldValue;

    /// Case-insensitive field lookup table, built once per type.
    #[must_use]
    fn resolver() -> &'static FieldResolver
    where
        Self: Sized + 'static,
    {
        FieldResolver::of::<Self>()
    }
}
