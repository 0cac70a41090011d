//! Response envelopes.
//!
//! Success bodies are `{"message": .., "data": ..}`; failures are
//! `{"message": .., "errors": ..}`. `ServiceError` maps to a status in one
//! place, here.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use lsp_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "Invalid request", msg),
        ServiceError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, "Invalid credentials", msg),
        ServiceError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "Forbidden", msg),
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "Not found", msg),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "Conflict", msg),
        // Detail already logged where it was raised.
        ServiceError::Internal(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            "internal error",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    message: &'static str,
    errors: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "message": message,
            "errors": errors.into(),
        })),
    )
        .into_response()
}

pub fn json_ok<T: Serialize>(status: StatusCode, message: &'static str, data: T) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

/// `Ok` becomes a success envelope, `Err` the mapped error envelope.
pub fn respond<T: Serialize>(
    result: Result<T, ServiceError>,
    status: StatusCode,
    message: &'static str,
) -> axum::response::Response {
    match result {
        Ok(data) => json_ok(status, message, data),
        Err(e) => service_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (ServiceError::validation("x"), StatusCode::BAD_REQUEST),
            (ServiceError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::not_found("asesmen"), StatusCode::NOT_FOUND),
            (ServiceError::conflict("x"), StatusCode::CONFLICT),
            (ServiceError::Internal("db down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}
