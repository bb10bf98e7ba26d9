use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ledgerbank_infra::EngineError;

/// Map an engine failure to a JSON error response.
///
/// Business-rule failures keep their human-readable message. Storage failures
/// are logged here and surfaced as a generic message so storage internals
/// never leak to clients.
pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    match err {
        EngineError::Validation(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        EngineError::InvalidOperation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_operation", msg)
        }
        EngineError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        EngineError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "account not found"),
        EngineError::InsufficientFunds => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_funds",
            "insufficient funds",
        ),
        EngineError::Conflict(detail) => {
            tracing::error!(%detail, "storage conflict");
            json_error(StatusCode::CONFLICT, "conflict", "the operation could not be committed")
        }
        EngineError::Storage(detail) => {
            tracing::error!(%detail, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "storage failure",
            )
        }
    }
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
