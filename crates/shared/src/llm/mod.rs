pub mod contracts;
pub mod gateway;
pub mod gemini;
pub mod media;
pub mod prompts;
pub mod sanitize;
pub mod validation;

pub use contracts::{JSON_MIME_TYPE, simulation_response_schema};
pub use gateway::{
    Candidate, Content, GenerateRequest, GenerationConfig, InlineData, ModelGateway,
    ModelGatewayError, ModelGatewayFuture, ModelResponse, Part, Prompt, ResponseModality,
};
pub use gemini::{GeminiGateway, GeminiGatewayConfig};
pub use media::first_inline_data_uri;
pub use prompts::{
    NARRATOR_VOICE, NO_DIVERGENCE_SENTINEL, audio_prompt, image_prompt,
    simulation_system_instruction, simulation_turn_prompt,
};
pub use sanitize::clean_json;
pub use validation::{OutputValidationError, parse_simulation_output, validate_simulation_value};
