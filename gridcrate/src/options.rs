//! Parsing options: parameter naming, separators and locale.
//!
//! A process-wide default is available through [`ParsingOptions::global`]. It
//! can be replaced once at startup with [`ParsingOptions::install_global`],
//! typically from a JSON configuration file:
//!
//! ```rust,ignore
//! let options = ParsingOptions::from_json_str(r#"{
//!     "prefix": "f",
//!     "decimalSeparator": ",",
//!     "groupSeparator": ".",
//!     "dateFormats": ["%d.%m.%Y"]
//! }"#)?;
//! options.install_global()?;
//! ```
//!
//! Options passed explicitly to the parser or pipeline take precedence over
//! the global instance.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::GridError;

static GLOBAL_OPTIONS: OnceLock<ParsingOptions> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParsingOptions {
    /// Leading name of filter parameters: `{prefix}[{field}]`
    pub prefix: String,
    pub filter_type_key: String,
    pub filter_category_key: String,
    pub value_category_key: String,
    /// Splits the two bounds of a `Between` value
    pub between_separator: String,
    /// Splits the values of a multi-select filter
    pub multi_select_separator: String,
    pub decimal_separator: char,
    /// Thousands separator, removed before parsing numbers
    pub group_separator: Option<char>,
    /// `chrono` formats tried in order when parsing dates
    pub date_formats: Vec<String>,
    /// `chrono` formats tried in order when parsing date-times
    pub date_time_formats: Vec<String>,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self {
            prefix: "filter".to_string(),
            filter_type_key: "filterType".to_string(),
            filter_category_key: "filterCategory".to_string(),
            value_category_key: "valueCategory".to_string(),
            between_separator: ";".to_string(),
            multi_select_separator: ",".to_string(),
            decimal_separator: '.',
            group_separator: Some(','),
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%m/%d/%Y".to_string(),
                "%d.%m.%Y".to_string(),
            ],
            date_time_formats: vec![
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M".to_string(),
            ],
        }
    }
}

impl ParsingOptions {
    /// The installed process-wide options, or the built-in defaults.
    pub fn global() -> &'static Self {
        GLOBAL_OPTIONS.get_or_init(Self::default)
    }

    /// Install these options as the process-wide default.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptions` if the options are inconsistent, or if global
    /// options were already installed or read.
    pub fn install_global(self) -> Result<(), GridError> {
        self.validate()?;
        GLOBAL_OPTIONS
            .set(self)
            .map_err(|_| GridError::InvalidOptions {
                message: "global parsing options are already initialised".to_string(),
            })
    }

    /// Load options from JSON. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptions` when the JSON is malformed or the resulting
    /// options are inconsistent.
    pub fn from_json_str(json: &str) -> Result<Self, GridError> {
        let options: Self = serde_json::from_str(json).map_err(|e| GridError::InvalidOptions {
            message: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Check that every key and separator is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptions` describing the first problem found.
    pub fn validate(&self) -> Result<(), GridError> {
        let invalid = |message: &str| {
            Err(GridError::InvalidOptions {
                message: message.to_string(),
            })
        };

        if self.prefix.is_empty() {
            return invalid("prefix must not be empty");
        }
        for key in [
            &self.filter_type_key,
            &self.filter_category_key,
            &self.value_category_key,
        ] {
            if key.is_empty() || key.contains(['[', ']']) {
                return invalid("filter keys must be non-empty and contain no brackets");
            }
        }
        if self.between_separator.is_empty() || self.multi_select_separator.is_empty() {
            return invalid("separators must not be empty");
        }
        if self.group_separator == Some(self.decimal_separator) {
            return invalid("group and decimal separators must differ");
        }
        if self.date_formats.is_empty() {
            return invalid("at least one date format is required");
        }
        Ok(())
    }

    /// `{prefix}[{field}]`, the key holding a filter's raw value
    #[must_use]
    pub fn value_key(&self, field: &str) -> String {
        format!("{}[{field}]", self.prefix)
    }

    /// `{prefix}[{field}][{key}]`
    #[must_use]
    pub fn field_key(&self, field: &str, key: &str) -> String {
        format!("{}[{field}][{key}]", self.prefix)
    }

    /// Remove group separators and normalise the decimal separator to `.`
    fn normalise_number(&self, raw: &str) -> String {
        raw.trim()
            .chars()
            .filter(|c| Some(*c) != self.group_separator && !c.is_whitespace())
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect()
    }

    /// Parse an integer using the configured locale
    #[must_use]
    pub fn parse_integer(&self, raw: &str) -> Option<i64> {
        self.normalise_number(raw).parse().ok()
    }

    /// Parse a decimal number using the configured locale
    #[must_use]
    pub fn parse_decimal(&self, raw: &str) -> Option<Decimal> {
        let normalised = self.normalise_number(raw);
        Decimal::from_str(&normalised)
            .or_else(|_| Decimal::from_scientific(&normalised))
            .ok()
    }

    /// Parse a calendar date with the configured formats
    #[must_use]
    pub fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        self.date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
            .or_else(|| self.parse_date_time(raw).map(|dt| dt.date()))
    }

    /// Parse a date-time; a bare date means midnight
    #[must_use]
    pub fn parse_date_time(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        self.date_time_formats
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                self.date_formats
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }
}
