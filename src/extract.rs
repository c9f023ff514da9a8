//! Request extractors that reject with the app's JSON [Error] rather than axum's plain text.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, rejection::JsonRejection},
    http::request::Parts,
};

use crate::{Error, ValidationErrors, database_id::DatabaseId};

/// A JSON request body.
///
/// A body that is not JSON, or does not fit `T`, is a validation error on the
/// `body` field.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        ValidationErrors::single("body", rejection.body_text())
    }
}

/// The ID in the request path, e.g. `42` in `/api/categories/42`.
///
/// IDs that are not integers cannot name a stored resource, so they are reported as
/// [Error::NotFound] like any other unknown ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub DatabaseId);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| Error::NotFound)?;

        raw_id.parse().map(Self).map_err(|_| Error::NotFound)
    }
}
