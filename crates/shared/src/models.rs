use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const BOUNDED_SCALE_MIN: i64 = 0;
pub const BOUNDED_SCALE_MAX: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Snapshot of the simulated world after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorldState {
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "i64")]
    pub year: i64,
    /// Chaos level from 0 to 100.
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "i64", range(min = 0, max = 100))]
    pub chaos_level: i64,
    pub deviations: Vec<String>,
    pub population_mood: String,
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "i64", range(min = 0, max = 100))]
    pub geopolitical_stability: i64,
}

/// Accepts integers and integral floats such as `10.0`, which JSON schema
/// already treats as integers. Fractional values are rejected.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Integer(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Integer(value) => Ok(value),
        Number::Float(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        Number::Float(value) => Err(D::Error::custom(format!(
            "expected a whole number, got {value}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldStateError {
    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: i64 },
}

impl WorldState {
    /// Rejects bounded fields outside `[0, 100]`. Values are never clamped.
    pub fn validate(&self) -> Result<(), WorldStateError> {
        ensure_bounded("chaos_level", self.chaos_level)?;
        ensure_bounded("geopolitical_stability", self.geopolitical_stability)
    }
}

fn ensure_bounded(field: &'static str, value: i64) -> Result<(), WorldStateError> {
    if (BOUNDED_SCALE_MIN..=BOUNDED_SCALE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(WorldStateError::OutOfRange { field, value })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub input: String,
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub current_state: Option<WorldState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SimulationResponse {
    pub narrative: String,
    pub world_state_update: WorldState,
    pub suggested_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub scenario_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioRequest {
    pub narrative: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioResponse {
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}
