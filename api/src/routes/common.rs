//! Shared helpers for route handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use services::ServiceError;

use crate::response::{ApiResponse, Empty};

/// Maps the domain error taxonomy onto status codes and the standard
/// envelope. Business validation never produces a 5xx; only a store fault
/// does.
pub fn service_error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::RowValidation { .. } => StatusCode::BAD_REQUEST,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Db(e) => {
            tracing::error!(error = %e, "database error while handling request");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(ApiResponse::<Empty>::error(err.to_string()))).into_response()
}

/// 200 OK with the standard envelope.
pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data, message))).into_response()
}

/// 201 Created with the standard envelope.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(data, message)),
    )
        .into_response()
}

/// 400 Bad Request with the standard envelope.
pub fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<Empty>::error(message)),
    )
        .into_response()
}

/// 401 Unauthorized with the standard envelope.
pub fn unauthorized(message: impl Into<String>) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<Empty>::error(message)),
    )
        .into_response()
}
