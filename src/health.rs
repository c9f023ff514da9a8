//! Liveness check.

use axum::Json;
use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::Error;

/// Report that the server is up, with the current UTC time.
pub async fn get_health() -> Result<Json<Value>, Error> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|error| Error::DateFormatError(error.to_string()))?;

    Ok(Json(json!({ "status": "OK", "timestamp": timestamp })))
}
