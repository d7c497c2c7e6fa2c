use axum::Json;
use axum::extract::{Extension, State};
use shared::llm::{
    Content, GenerateRequest, GenerationConfig, ModelGatewayError, ModelResponse, NARRATOR_VOICE,
    Part, Prompt, ResponseModality, audio_prompt, first_inline_data_uri, image_prompt,
};
use shared::models::{AudioRequest, AudioResponse, ImageRequest, ImageResponse};
use tracing::{info, warn};

use super::AppState;
use super::observability::RequestContext;

// Media endpoints degrade to a null payload instead of failing the request.

pub(super) async fn generate_image(
    State(state): State<AppState>,
    Extension(request_context): Extension<RequestContext>,
    Json(req): Json<ImageRequest>,
) -> Json<ImageResponse> {
    let request = GenerateRequest::new(
        &state.models.image_model,
        Prompt::Content(vec![Content {
            role: None,
            parts: vec![Part::text(image_prompt(&req.scenario_description))],
        }]),
    );

    let result = state.gateway.generate(request).await;
    let image = media_data_uri("image", &request_context.request_id, result);
    Json(ImageResponse { image })
}

pub(super) async fn generate_audio(
    State(state): State<AppState>,
    Extension(request_context): Extension<RequestContext>,
    Json(req): Json<AudioRequest>,
) -> Json<AudioResponse> {
    let request = GenerateRequest::new(
        &state.models.audio_model,
        Prompt::Content(vec![Content::user_text(audio_prompt(&req.narrative))]),
    )
    .with_config(GenerationConfig {
        response_modalities: vec![ResponseModality::Audio],
        voice_name: Some(NARRATOR_VOICE.to_string()),
        ..GenerationConfig::default()
    });

    let result = state.gateway.generate(request).await;
    let audio = media_data_uri("audio", &request_context.request_id, result);
    Json(AudioResponse { audio })
}

fn media_data_uri(
    kind: &'static str,
    request_id: &str,
    result: Result<ModelResponse, ModelGatewayError>,
) -> Option<String> {
    match result {
        Ok(response) => {
            let data_uri = first_inline_data_uri(&response);
            if data_uri.is_none() {
                info!(request_id, kind, "provider returned no inline media");
            }
            data_uri
        }
        Err(err) => {
            warn!(request_id, kind, "{kind} generation failed: {err}");
            None
        }
    }
}
