use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::config::ModelConfig;
use shared::llm::ModelGateway;

mod cors;
mod errors;
mod health;
mod media;
mod observability;
mod simulation;

pub const API_PREFIX: &str = "/api";

/// Immutable per-process state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ModelGateway>,
    pub models: ModelConfig,
    pub project_name: String,
}

pub fn build_router(app_state: AppState, client_origin: Option<&str>) -> Router {
    let api_routes = Router::new()
        .route("/simulate-turn", post(simulation::simulate_turn))
        .route("/generate-image", post(media::generate_image))
        .route("/generate-audio", post(media::generate_audio));

    Router::new()
        .route("/", get(health::root))
        .nest(API_PREFIX, api_routes)
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .layer(cors::cors_layer(client_origin))
        .with_state(app_state)
}
