use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

pub type ModelGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ModelResponse, ModelGatewayError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Text(String),
    Content(Vec<Content>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModality {
    Text,
    Image,
    Audio,
}

impl ResponseModality {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
            Self::Audio => "AUDIO",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub system_instruction: Option<String>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<Value>,
    pub response_modalities: Vec<ResponseModality>,
    /// Prebuilt voice used for speech output.
    pub voice_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: Prompt,
    pub config: Option<GenerationConfig>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: Prompt) -> Self {
        Self {
            model: model.into(),
            prompt,
            config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
    /// Set on reasoning parts that are not part of the answer.
    pub thought: bool,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub candidates: Vec<Candidate>,
}

impl ModelResponse {
    /// Concatenated answer text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text = parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect::<String>();

        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Debug, Error)]
pub enum ModelGatewayError {
    #[error("model provider request failed: {0}")]
    ProviderFailure(String),
    #[error("model provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

/// Sends one prompt to a generative model and returns its raw candidates.
pub trait ModelGateway: Send + Sync {
    fn generate<'a>(&'a self, request: GenerateRequest) -> ModelGatewayFuture<'a>;
}
