//! The response envelope shared by every API route.
//!
//! Success and failure both render as
//! `{ "success": bool, "error": string|null, "data": T|null, "status": u16 }`
//! with the HTTP status mirrored in the body. Handlers return
//! [`ApiResponse`] directly; errors go through [`AppError`](crate::error::AppError),
//! which renders the same shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
    pub status: u16,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with a payload.
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    /// 201 with the created resource.
    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
            status: status.as_u16(),
        }
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null`, used by deletes and logout.
    pub fn empty() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
            status: StatusCode::OK.as_u16(),
        }
    }

    /// Failure envelope with the given status and message.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
            status: status.as_u16(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
