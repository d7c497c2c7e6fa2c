use std::sync::LazyLock;

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

use super::contracts::simulation_response_schema;
use super::sanitize::clean_json;
use crate::models::{SimulationResponse, WorldStateError};

#[derive(Debug, Error)]
pub enum OutputValidationError {
    #[error("simulation output is not valid json: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("simulation schema failed to compile: {0}")]
    SchemaCompile(String),
    #[error("simulation output failed schema validation: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),
    #[error("simulation output does not match the response contract: {0}")]
    Contract(#[source] serde_json::Error),
    #[error(transparent)]
    WorldState(#[from] WorldStateError),
}

impl OutputValidationError {
    /// True when the text could not be parsed as JSON at all.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::InvalidJson(_))
    }
}

/// Strips code fences from provider text, parses it and validates it as a
/// [`SimulationResponse`].
pub fn parse_simulation_output(raw_text: &str) -> Result<SimulationResponse, OutputValidationError> {
    let cleaned = clean_json(raw_text);
    let payload: Value =
        serde_json::from_str(&cleaned).map_err(OutputValidationError::InvalidJson)?;
    validate_simulation_value(&payload)
}

pub fn validate_simulation_value(
    payload: &Value,
) -> Result<SimulationResponse, OutputValidationError> {
    let validator = SIMULATION_RESPONSE_VALIDATOR
        .as_ref()
        .map_err(|message| OutputValidationError::SchemaCompile(message.clone()))?;

    if let Err(validation_errors) = validator.validate(payload) {
        let errors = validation_errors
            .map(|err| format!("{} at {}", err, err.instance_path))
            .collect::<Vec<_>>();
        return Err(OutputValidationError::SchemaViolation(errors));
    }

    let response: SimulationResponse =
        serde_json::from_value(payload.clone()).map_err(OutputValidationError::Contract)?;
    response.world_state_update.validate()?;
    Ok(response)
}

static SIMULATION_RESPONSE_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(simulation_response_schema()).map_err(|err| err.to_string())
});
