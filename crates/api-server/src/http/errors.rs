use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ErrorBody, ErrorResponse};

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

pub(super) fn unprocessable_entity_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, code, message)
}

pub(super) fn internal_error_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, code, message)
}
