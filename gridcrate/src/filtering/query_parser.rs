use std::collections::HashMap;

use crate::errors::GridError;
use crate::models::{
    DateFilter, FilterCategory, FilterOperator, FilterSpec, MultiSelectFilter, NumericFilter,
    NumericValue, RequestSpec, SingleSelectFilter, SortDirection, SortSpec, TextFilter,
    ValueCategory,
};
use crate::options::ParsingOptions;

const MAX_FIELD_NAME_LENGTH: usize = 100;

/// Field names taken from parameter keys must be plain identifiers-ish
fn is_valid_field_name(field_name: &str) -> bool {
    !field_name.trim().is_empty()
        && field_name.len() <= MAX_FIELD_NAME_LENGTH
        && !field_name.contains(['[', ']'])
}

/// Which parts of a request to read. Everything is read by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseSections {
    /// Search term and paging (`search[value]`, `start`, `length`)
    pub search: bool,
    pub sort: bool,
    pub filters: bool,
}

impl Default for ParseSections {
    fn default() -> Self {
        Self {
            search: true,
            sort: true,
            filters: true,
        }
    }
}

/// Turns the flat parameter map sent by a grid widget into a [`RequestSpec`].
///
/// ```rust,ignore
/// let spec = RequestParser::new().parse(&params)?;
/// ```
///
/// Filters whose values cannot be parsed are dropped and logged at debug
/// level. The only fatal parsing error is a `Between` value that does not
/// split into exactly two parts.
#[derive(Debug, Clone, Copy)]
pub struct RequestParser<'o> {
    options: &'o ParsingOptions,
    sections: ParseSections,
}

impl RequestParser<'static> {
    /// Parser using the process-wide [`ParsingOptions::global`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParsingOptions::global())
    }
}

impl Default for RequestParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'o> RequestParser<'o> {
    #[must_use]
    pub fn with_options(options: &'o ParsingOptions) -> Self {
        Self {
            options,
            sections: ParseSections::default(),
        }
    }

    #[must_use]
    pub const fn sections(mut self, sections: ParseSections) -> Self {
        self.sections = sections;
        self
    }

    /// Parse raw request parameters.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRange` when a `Between` filter value does not contain
    /// exactly one separator.
    pub fn parse(&self, params: &HashMap<String, String>) -> Result<RequestSpec, GridError> {
        let mut spec = RequestSpec {
            draw: params.get("draw").cloned(),
            ..RequestSpec::default()
        };

        if self.sections.search {
            spec.search_term = params
                .get("search[value]")
                .map(|term| term.trim())
                .filter(|term| !term.is_empty())
                .map(str::to_string);
            spec.skip = params
                .get("start")
                .and_then(|start| start.trim().parse::<u64>().ok())
                .unwrap_or(0);
            spec.take = params
                .get("length")
                .and_then(|length| length.trim().parse::<i64>().ok())
                .and_then(|length| u64::try_from(length).ok());
        }

        if self.sections.sort {
            spec.sort_specs = Self::parse_sort_specs(params);
        }

        if self.sections.filters {
            spec.filter_specs = self.parse_filter_specs(params)?;
        }

        Ok(spec)
    }

    fn parse_sort_specs(params: &HashMap<String, String>) -> Vec<SortSpec> {
        let mut ordinals: Vec<(usize, &str)> = params
            .iter()
            .filter_map(|(key, column)| {
                let ordinal = key
                    .strip_prefix("order[")?
                    .strip_suffix("][column]")?
                    .parse::<usize>()
                    .ok()?;
                Some((ordinal, column.as_str()))
            })
            .collect();
        ordinals.sort_unstable_by_key(|(ordinal, _)| *ordinal);

        ordinals
            .into_iter()
            .filter_map(|(ordinal, column)| {
                let column_index = column.trim().parse::<usize>().ok()?;
                let field = params.get(&format!("columns[{column_index}][data]"))?.trim();
                if field.is_empty() {
                    return None;
                }
                let direction = params
                    .get(&format!("order[{ordinal}][dir]"))
                    .map_or(SortDirection::Ascending, |dir| SortDirection::from_param(dir));
                Some(SortSpec {
                    field: field.to_string(),
                    direction,
                })
            })
            .collect()
    }

    fn parse_filter_specs(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Vec<FilterSpec>, GridError> {
        let head = format!("{}[", self.options.prefix);
        let tail = format!("][{}]", self.options.filter_category_key);

        let mut fields: Vec<&str> = params
            .keys()
            .filter_map(|key| key.strip_prefix(head.as_str())?.strip_suffix(tail.as_str()))
            .filter(|field| is_valid_field_name(field))
            .collect();
        fields.sort_unstable();
        fields.dedup();

        let mut specs = Vec::with_capacity(fields.len());
        for field in fields {
            self.parse_field(params, field, &mut specs)?;
        }
        Ok(specs)
    }

    fn parse_field(
        &self,
        params: &HashMap<String, String>,
        field: &str,
        specs: &mut Vec<FilterSpec>,
    ) -> Result<(), GridError> {
        let options = self.options;
        let Some(category) = self
            .read_code(params, field, &options.filter_category_key)
            .and_then(FilterCategory::from_code)
        else {
            tracing::debug!(field, "Skipping filter with an unknown category");
            return Ok(());
        };

        let raw = params
            .get(&options.value_key(field))
            .map_or("", String::as_str)
            .trim();
        if raw.is_empty() {
            tracing::debug!(field, %category, "Skipping filter without a value");
            return Ok(());
        }

        match category {
            FilterCategory::Text => {
                let Some(operator) = self.operator(params, field) else {
                    return Ok(());
                };
                let value_category = self.value_category(params, field);
                let value = if value_category == ValueCategory::AccountNumber {
                    raw.replace('-', "")
                } else {
                    raw.to_string()
                };
                if value.is_empty() {
                    return Ok(());
                }
                specs.push(FilterSpec::Text(TextFilter {
                    field: field.to_string(),
                    operator,
                    value,
                    value_category,
                }));
            }
            FilterCategory::Numeric => {
                let Some(operator) = self.operator(params, field) else {
                    return Ok(());
                };
                let value_category = self.value_category(params, field);
                let parse = |text: &str| self.parse_numeric(field, text, value_category);
                let make = |operator, value| {
                    FilterSpec::Numeric(NumericFilter {
                        field: field.to_string(),
                        operator,
                        value,
                        value_category,
                    })
                };
                self.push_bounds(field, raw, operator, parse, make, specs)?;
            }
            FilterCategory::Date => {
                let Some(operator) = self.operator(params, field) else {
                    return Ok(());
                };
                let parse = |text: &str| {
                    options
                        .parse_date(text)
                        .ok_or_else(|| GridError::ParseFailure {
                            field: field.to_string(),
                            value: text.to_string(),
                        })
                };
                let make = |operator, value| {
                    FilterSpec::Date(DateFilter {
                        field: field.to_string(),
                        operator,
                        value,
                    })
                };
                self.push_bounds(field, raw, operator, parse, make, specs)?;
            }
            FilterCategory::SingleSelect => {
                specs.push(FilterSpec::SingleSelect(SingleSelectFilter {
                    field: field.to_string(),
                    value: raw.to_string(),
                }));
            }
            FilterCategory::MultiSelect => {
                let values: Vec<String> = raw
                    .split(options.multi_select_separator.as_str())
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect();
                if values.is_empty() {
                    tracing::debug!(field, "Skipping multi-select filter with no values");
                    return Ok(());
                }
                specs.push(FilterSpec::MultiSelect(MultiSelectFilter {
                    field: field.to_string(),
                    values,
                }));
            }
        }
        Ok(())
    }

    /// Push one comparison, or the `>=`/`<=` pair a `Between` decomposes into.
    ///
    /// A value that fails to parse drops the whole filter, so a range is never
    /// applied with only one of its written bounds.
    fn push_bounds<V>(
        &self,
        field: &str,
        raw: &str,
        operator: FilterOperator,
        parse: impl Fn(&str) -> Result<V, GridError>,
        make: impl Fn(FilterOperator, V) -> FilterSpec,
        specs: &mut Vec<FilterSpec>,
    ) -> Result<(), GridError> {
        if operator != FilterOperator::Between {
            match parse(raw) {
                Ok(value) => specs.push(make(operator, value)),
                Err(err) => tracing::debug!(error = %err, "Dropping unparseable filter"),
            }
            return Ok(());
        }

        let parts: Vec<&str> = raw.split(self.options.between_separator.as_str()).collect();
        let [low, high] = parts.as_slice() else {
            return Err(GridError::MalformedRange {
                field: field.to_string(),
                value: raw.to_string(),
            });
        };

        let mut bounds = Vec::with_capacity(2);
        for (bound_operator, part) in [
            (FilterOperator::GreaterThanOrEqual, low.trim()),
            (FilterOperator::LessThanOrEqual, high.trim()),
        ] {
            if part.is_empty() {
                continue;
            }
            match parse(part) {
                Ok(value) => bounds.push(make(bound_operator, value)),
                Err(err) => {
                    tracing::debug!(
                        error = %err,
                        "Dropping range filter with an unparseable bound"
                    );
                    return Ok(());
                }
            }
        }
        if bounds.is_empty() {
            tracing::debug!(field, "Range filter has no bounds");
        }
        specs.extend(bounds);
        Ok(())
    }

    fn parse_numeric(
        &self,
        field: &str,
        raw: &str,
        value_category: ValueCategory,
    ) -> Result<NumericValue, GridError> {
        let parsed = if value_category == ValueCategory::Integer {
            self.options.parse_integer(raw).map(NumericValue::Integer)
        } else {
            self.options.parse_decimal(raw).map(NumericValue::Decimal)
        };
        parsed.ok_or_else(|| GridError::ParseFailure {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    fn read_code(&self, params: &HashMap<String, String>, field: &str, key: &str) -> Option<i64> {
        params
            .get(&self.options.field_key(field, key))
            .and_then(|code| code.trim().parse().ok())
    }

    fn operator(&self, params: &HashMap<String, String>, field: &str) -> Option<FilterOperator> {
        let operator = self
            .read_code(params, field, &self.options.filter_type_key)
            .and_then(FilterOperator::from_code);
        if operator.is_none() {
            tracing::debug!(field, "Skipping filter with a missing or unknown operator");
        }
        operator
    }

    fn value_category(&self, params: &HashMap<String, String>, field: &str) -> ValueCategory {
        self.read_code(params, field, &self.options.value_category_key)
            .and_then(ValueCategory::from_code)
            .unwrap_or_default()
    }
}

/// Parse `params` with explicit options and section switches.
///
/// # Errors
///
/// See [`RequestParser::parse`].
pub fn parse_request(
    params: &HashMap<String, String>,
    options: &ParsingOptions,
    sections: ParseSections,
) -> Result<RequestSpec, GridError> {
    RequestParser::with_options(options)
        .sections(sections)
        .parse(params)
}
