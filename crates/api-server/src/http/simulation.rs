use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::llm::{
    GenerateRequest, GenerationConfig, JSON_MIME_TYPE, OutputValidationError, Prompt,
    parse_simulation_output, simulation_response_schema, simulation_system_instruction,
    simulation_turn_prompt,
};
use shared::models::{SimulationRequest, SimulationResponse};
use thiserror::Error;
use tracing::{error, info};

use super::AppState;
use super::errors::{internal_error_response, unprocessable_entity_response};
use super::observability::RequestContext;

#[derive(Debug, Error)]
enum SimulationError {
    #[error("No response from simulation model")]
    EmptyProviderResponse,
    #[error("Failed to parse simulation JSON: {0}")]
    Parse(OutputValidationError),
    #[error("Simulation failed: {0}")]
    Failed(String),
}

impl SimulationError {
    const fn code(&self) -> &'static str {
        match self {
            Self::EmptyProviderResponse => "empty_provider_response",
            Self::Parse(_) => "simulation_parse_failed",
            Self::Failed(_) => "simulation_failed",
        }
    }
}

impl From<OutputValidationError> for SimulationError {
    fn from(err: OutputValidationError) -> Self {
        if err.is_parse_failure() {
            Self::Parse(err)
        } else {
            Self::Failed(err.to_string())
        }
    }
}

pub(super) async fn simulate_turn(
    State(state): State<AppState>,
    Extension(request_context): Extension<RequestContext>,
    Json(req): Json<SimulationRequest>,
) -> Response {
    if let Some(current_state) = &req.current_state
        && let Err(err) = current_state.validate()
    {
        return unprocessable_entity_response("invalid_world_state", &err.to_string());
    }

    match run_simulation(&state, &req).await {
        Ok(response) => {
            info!(
                request_id = %request_context.request_id,
                year = response.world_state_update.year,
                chaos_level = response.world_state_update.chaos_level,
                "simulation turn completed"
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            error!(
                request_id = %request_context.request_id,
                code = err.code(),
                "simulation turn failed: {err}"
            );
            internal_error_response(err.code(), &err.to_string())
        }
    }
}

async fn run_simulation(
    state: &AppState,
    req: &SimulationRequest,
) -> Result<SimulationResponse, SimulationError> {
    let request = GenerateRequest::new(
        &state.models.simulation_model,
        Prompt::Text(simulation_turn_prompt(&req.history, &req.input)),
    )
    .with_config(GenerationConfig {
        system_instruction: Some(simulation_system_instruction(req.current_state.as_ref())),
        response_mime_type: Some(JSON_MIME_TYPE.to_string()),
        response_schema: Some(simulation_response_schema().clone()),
        ..GenerationConfig::default()
    });

    let response = state
        .gateway
        .generate(request)
        .await
        .map_err(|err| SimulationError::Failed(err.to_string()))?;

    let text = response
        .text()
        .ok_or(SimulationError::EmptyProviderResponse)?;

    Ok(parse_simulation_output(&text)?)
}
