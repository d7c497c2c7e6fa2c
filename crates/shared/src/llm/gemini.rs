use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::gateway::{
    Candidate, Content, GenerateRequest, GenerationConfig, InlineData, ModelGateway,
    ModelGatewayError, ModelGatewayFuture, ModelResponse, Part, Prompt,
};
use crate::config::ConfigError;
use crate::config_env::{env_or, require_any_env};

const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone)]
pub struct GeminiGatewayConfig {
    pub base_url: String,
    pub api_key: String,
}

impl GeminiGatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or("GEMINI_API_BASE_URL", DEFAULT_API_BASE_URL);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidConfiguration(
                "GEMINI_API_BASE_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            api_key: require_any_env(&API_KEY_VARS)?,
        })
    }
}

/// [`ModelGateway`] backed by the Gemini `generateContent` REST endpoint.
///
/// One call per request: no timeout and no retries are applied, so provider
/// latency and failures reach the caller unchanged.
#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GeminiGatewayConfig,
}

impl GeminiGateway {
    pub fn new(config: GeminiGatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint_for(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model.trim_start_matches("models/")
        )
    }

    async fn send(&self, request: GenerateRequest) -> Result<ModelResponse, ModelGatewayError> {
        let url = self.endpoint_for(&request.model);
        let body = WireRequest::from(request);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ModelGatewayError::ProviderFailure(err.without_url().to_string()))?;

        let status = response.status();
        let raw = response.text().await.map_err(|_| {
            ModelGatewayError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            return Err(ModelGatewayError::ProviderFailure(format!(
                "status={} {}",
                status.as_u16(),
                parse_provider_error(&raw)
            )));
        }

        let parsed: WireResponse = serde_json::from_str(&raw).map_err(|_| {
            ModelGatewayError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;
        debug!(
            url = %url,
            candidates = parsed.candidates.len(),
            "gemini generateContent succeeded"
        );

        parsed.into_model_response()
    }
}

impl ModelGateway for GeminiGateway {
    fn generate<'a>(&'a self, request: GenerateRequest) -> ModelGatewayFuture<'a> {
        Box::pin(self.send(request))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

impl From<GenerateRequest> for WireRequest {
    fn from(request: GenerateRequest) -> Self {
        let contents = match request.prompt {
            Prompt::Text(text) => vec![WireContent::from(Content::user_text(text))],
            Prompt::Content(contents) => contents.into_iter().map(WireContent::from).collect(),
        };

        let (system_instruction, generation_config) = match request.config {
            Some(config) => split_config(config),
            None => (None, None),
        };

        Self {
            contents,
            system_instruction,
            generation_config,
        }
    }
}

fn split_config(config: GenerationConfig) -> (Option<WireContent>, Option<WireGenerationConfig>) {
    let system_instruction = config.system_instruction.map(|text| WireContent {
        role: None,
        parts: vec![WirePart::text(text)],
    });

    let generation_config = WireGenerationConfig {
        response_mime_type: config.response_mime_type,
        response_json_schema: config.response_schema,
        response_modalities: config
            .response_modalities
            .iter()
            .map(|modality| modality.as_str())
            .collect(),
        speech_config: config.voice_name.map(|voice_name| WireSpeechConfig {
            voice_config: WireVoiceConfig {
                prebuilt_voice_config: WirePrebuiltVoiceConfig { voice_name },
            },
        }),
    };

    let generation_config = (!generation_config.is_empty()).then_some(generation_config);
    (system_instruction, generation_config)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json_schema: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    response_modalities: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<WireSpeechConfig>,
}

impl WireGenerationConfig {
    fn is_empty(&self) -> bool {
        self.response_mime_type.is_none()
            && self.response_json_schema.is_none()
            && self.response_modalities.is_empty()
            && self.speech_config.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSpeechConfig {
    voice_config: WireVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireVoiceConfig {
    prebuilt_voice_config: WirePrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

impl From<Content> for WireContent {
    fn from(content: Content) -> Self {
        Self {
            role: content.role,
            parts: content.parts.into_iter().map(WirePart::from).collect(),
        }
    }
}

impl WireContent {
    fn into_content(self) -> Result<Content, ModelGatewayError> {
        let parts = self
            .parts
            .into_iter()
            .map(WirePart::into_part)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Content {
            role: self.role,
            parts,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl WirePart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    fn into_part(self) -> Result<Part, ModelGatewayError> {
        let inline_data = self
            .inline_data
            .map(|blob| {
                STANDARD
                    .decode(blob.data.as_bytes())
                    .map(|data| InlineData {
                        mime_type: blob.mime_type,
                        data,
                    })
                    .map_err(|_| {
                        ModelGatewayError::InvalidProviderPayload(
                            "inline_data_not_base64".to_string(),
                        )
                    })
            })
            .transpose()?;

        Ok(Part {
            text: self.text,
            inline_data,
            thought: self.thought.unwrap_or(false),
        })
    }
}

impl From<Part> for WirePart {
    fn from(part: Part) -> Self {
        Self {
            text: part.text,
            inline_data: part.inline_data.map(|inline| WireBlob {
                mime_type: inline.mime_type,
                data: STANDARD.encode(inline.data),
            }),
            thought: part.thought.then_some(true),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

impl WireResponse {
    fn into_model_response(self) -> Result<ModelResponse, ModelGatewayError> {
        let candidates = self
            .candidates
            .into_iter()
            .map(|candidate| {
                candidate
                    .content
                    .map(WireContent::into_content)
                    .transpose()
                    .map(|content| Candidate { content })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModelResponse { candidates })
    }
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
}

fn parse_provider_error(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        status: Option<String>,
        message: Option<String>,
    }

    let details = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error);

    match details {
        Some(details) => format!(
            "code={} message={}",
            details.status.as_deref().unwrap_or("unknown"),
            details.message.as_deref().unwrap_or("")
        ),
        None => "code=unknown".to_string(),
    }
}
