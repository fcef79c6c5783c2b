use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use almox_core::DomainError;
use almox_store::StoreError;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(&e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
    }
}

/// Persistence failures are logged with their cause but surfaced as one
/// generic message; the caller cannot act on the difference anyway.
pub fn store_error_to_response(err: &StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "persistence operation failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        "operation failed, please try again",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Admin gate shared by the management routes.
pub fn require_admin(current: &crate::context::CurrentUser) -> Result<(), axum::response::Response> {
    if current.is_admin() {
        Ok(())
    } else {
        Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "administrator role required",
        ))
    }
}
