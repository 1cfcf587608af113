//! # Error Handling
//!
//! Every fallible operation in this crate returns [`GridError`]. The variants
//! follow the life of a request:
//!
//! - **Parsing** (`ParseFailure`, `MalformedRange`): problems with the raw
//!   request parameters. Unparseable values only drop the offending filter and
//!   are logged; a malformed `Between` range fails the request.
//! - **Compilation** (`FieldNotFound`, `TypeMismatch`, `UnsupportedOperator`):
//!   the request names a field or operator the record type cannot serve.
//! - **Execution** (`Database`, `Cancelled`, `PushdownUnavailable`): the store
//!   failed, the caller gave up, or a predicate cannot be run by the store.
//!
//! When returned from an axum handler the error becomes a sanitized JSON body
//! with an appropriate status code; database details are logged through
//! `tracing` and never sent to the client.
//!
//! ```rust,ignore
//! async fn list_accounts(
//!     State(db): State<DatabaseConnection>,
//!     GridRequest(request): GridRequest,
//! ) -> Result<GridResponse<Account>, GridError> {
//!     GridPipeline::new(&request)
//!         .run_async(SeaOrmSource::all(&db), &CancellationToken::new())
//!         .await
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

use crate::core::FieldKind;
use crate::models::{FilterCategory, FilterOperator};

#[derive(Debug)]
pub enum GridError {
    /// No field of the record type matches the requested name
    FieldNotFound {
        record: &'static str,
        field: String,
    },

    /// The filter category cannot be applied to the field's declared kind
    TypeMismatch {
        field: String,
        category: FilterCategory,
        kind: FieldKind,
    },

    /// The operator is not valid for the filter category
    UnsupportedOperator {
        field: String,
        category: FilterCategory,
        operator: FilterOperator,
    },

    /// A filter value could not be parsed
    ParseFailure { field: String, value: String },

    /// A `Between` value did not split into exactly two parts
    MalformedRange { field: String, value: String },

    /// The query string could not be decoded
    InvalidQuery { message: String },

    /// Parsing options could not be loaded or installed
    InvalidOptions { message: String },

    /// A closure-only predicate was handed to a store that needs a query condition
    PushdownUnavailable,

    /// The caller cancelled the request
    Cancelled,

    /// The underlying store failed
    Database(DbErr),
}

impl GridError {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::FieldNotFound { .. }
            | Self::TypeMismatch { .. }
            | Self::UnsupportedOperator { .. }
            | Self::ParseFailure { .. }
            | Self::MalformedRange { .. }
            | Self::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            Self::Cancelled => StatusCode::REQUEST_TIMEOUT,
            Self::InvalidOptions { .. } | Self::PushdownUnavailable | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to send to clients
    fn user_message(&self) -> String {
        match self {
            Self::Database(_) => "A database error occurred".to_string(),
            Self::InvalidOptions { .. } | Self::PushdownUnavailable => {
                "The listing is not configured correctly".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database(internal) => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::InvalidOptions { message } => {
                tracing::error!(details = %message, "Invalid grid parsing options");
            }
            Self::PushdownUnavailable => {
                tracing::error!("Predicate without a query condition given to a database source");
            }
            _ => {
                tracing::debug!(
                    error = %self,
                    status = %self.status_code(),
                    "Grid request rejected"
                );
            }
        }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound { record, field } => {
                write!(f, "Field '{field}' not found on {record}")
            }
            Self::TypeMismatch {
                field,
                category,
                kind,
            } => write!(
                f,
                "Cannot apply a {category} filter to field '{field}' of type {}",
                kind.name()
            ),
            Self::UnsupportedOperator {
                field,
                category,
                operator,
            } => write!(
                f,
                "Operator {operator} is not supported by the {category} filter on '{field}'"
            ),
            Self::ParseFailure { field, value } => {
                write!(f, "Could not parse '{value}' for field '{field}'")
            }
            Self::MalformedRange { field, value } => {
                write!(f, "Range '{value}' for field '{field}' must have exactly two parts")
            }
            Self::InvalidQuery { message } => write!(f, "Invalid query string: {message}"),
            Self::InvalidOptions { message } => write!(f, "Invalid parsing options: {message}"),
            Self::PushdownUnavailable => {
                f.write_str("Predicate cannot be translated into a query condition")
            }
            Self::Cancelled => f.write_str("Request was cancelled"),
            Self::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for GridError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for GridError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}
