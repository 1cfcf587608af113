//! axum integration: a request extractor and a JSON response.
//!
//! ```rust,ignore
//! async fn list_accounts(
//!     State(accounts): State<Arc<Vec<Account>>>,
//!     GridRequest(request): GridRequest,
//! ) -> Result<GridResponse<Account>, GridError> {
//!     GridPipeline::new(&request)
//!         .with_search_fields(["Name"])
//!         .run(InMemorySource::new(accounts.as_ref().clone()))
//! }
//! ```

use axum::{
    Json,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::GridError;
use crate::filtering::RequestParser;
use crate::models::RequestSpec;
use crate::pipeline::GridResponse;

/// Grid request parsed from the query string with the global parsing options.
///
/// Rejects with a 400 when the query string cannot be decoded or a `Between`
/// range is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRequest(pub RequestSpec);

impl<S> FromRequestParts<S> for GridRequest
where
    S: Send + Sync,
{
    type Rejection = GridError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|rejection| GridError::InvalidQuery {
                message: rejection.body_text(),
            })?;
        RequestParser::new().parse(&params).map(Self)
    }
}

impl<T, F> IntoResponse for GridResponse<T, F>
where
    T: Serialize,
    F: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
