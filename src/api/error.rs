//! Error body shared by handlers and middleware: `{"detail": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}

#[must_use]
pub fn detail(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorDetail {
            detail: message.to_string(),
        }),
    )
        .into_response()
}
