use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a column filter, sent as `{prefix}[{field}][filterCategory]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterCategory {
    Text,
    Numeric,
    Date,
    SingleSelect,
    MultiSelect,
}

impl FilterCategory {
    /// Decode the integer enumerant used on the wire
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::Text,
            1 => Self::Numeric,
            2 => Self::Date,
            3 => Self::SingleSelect,
            4 => Self::MultiSelect,
            _ => return None,
        })
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::SingleSelect => "single-select",
            Self::MultiSelect => "multi-select",
        };
        f.write_str(name)
    }
}

/// Comparison requested by a filter, sent as `{prefix}[{field}][filterType]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    Equals,
    NotEqual,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
}

impl FilterOperator {
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::Equals,
            1 => Self::NotEqual,
            2 => Self::Contains,
            3 => Self::DoesNotContain,
            4 => Self::StartsWith,
            5 => Self::EndsWith,
            6 => Self::GreaterThan,
            7 => Self::GreaterThanOrEqual,
            8 => Self::LessThan,
            9 => Self::LessThanOrEqual,
            10 => Self::Between,
            _ => return None,
        })
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Semantic subtype of a filter value, sent as `{prefix}[{field}][valueCategory]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueCategory {
    #[default]
    Default,
    /// Account numbers are matched with their hyphens removed
    AccountNumber,
    Integer,
    Decimal,
}

impl ValueCategory {
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::Default,
            1 => Self::AccountNumber,
            2 => Self::Integer,
            3 => Self::Decimal,
            _ => return None,
        })
    }
}

/// Parsed operand of a numeric filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericValue {
    Integer(i64),
    Decimal(Decimal),
}

impl NumericValue {
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        match self {
            Self::Integer(i) => Decimal::from(i),
            Self::Decimal(d) => d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
    pub value_category: ValueCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: NumericValue,
    pub value_category: ValueCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSelectFilter {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelectFilter {
    pub field: String,
    pub values: Vec<String>,
}

/// One parsed column filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterSpec {
    Text(TextFilter),
    Numeric(NumericFilter),
    Date(DateFilter),
    SingleSelect(SingleSelectFilter),
    MultiSelect(MultiSelectFilter),
}

impl FilterSpec {
    /// Name of the field this filter targets
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Text(f) => &f.field,
            Self::Numeric(f) => &f.field,
            Self::Date(f) => &f.field,
            Self::SingleSelect(f) => &f.field,
            Self::MultiSelect(f) => &f.field,
        }
    }

    #[must_use]
    pub const fn category(&self) -> FilterCategory {
        match self {
            Self::Text(_) => FilterCategory::Text,
            Self::Numeric(_) => FilterCategory::Numeric,
            Self::Date(_) => FilterCategory::Date,
            Self::SingleSelect(_) => FilterCategory::SingleSelect,
            Self::MultiSelect(_) => FilterCategory::MultiSelect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// `"desc"` in any case is descending, anything else ascending
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

impl From<SortDirection> for sea_orm::Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => Self::Asc,
            SortDirection::Descending => Self::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Typed form of one grid request.
///
/// Sort specs are ordered: the first is the primary key, the rest break ties.
/// `take` is `None` when the grid asked for every row (`length=-1`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestSpec {
    pub draw: Option<String>,
    pub search_term: Option<String>,
    pub skip: u64,
    pub take: Option<u64>,
    pub sort_specs: Vec<SortSpec>,
    pub filter_specs: Vec<FilterSpec>,
}
