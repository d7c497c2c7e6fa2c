use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use shared::models::HealthResponse;

use super::AppState;

pub(super) async fn root(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: format!("{} is running", state.project_name),
        }),
    )
}
