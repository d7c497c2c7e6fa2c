#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use api_server::http::{AppState, build_router};
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use shared::config::ModelConfig;
use shared::llm::{
    Candidate, Content, GenerateRequest, ModelGateway, ModelGatewayError, ModelGatewayFuture,
    ModelResponse, Part,
};
use tower::ServiceExt;

pub const CLIENT_ORIGIN: &str = "http://localhost:3000";

pub type ScriptedReply = Result<ModelResponse, ModelGatewayError>;

/// In-memory gateway that replays queued replies and records every request.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    seen_requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl ScriptedGateway {
    pub fn with_replies(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn seen_requests(&self) -> Vec<GenerateRequest> {
        self.seen_requests
            .lock()
            .expect("seen requests lock should not be poisoned")
            .clone()
    }
}

impl ModelGateway for ScriptedGateway {
    fn generate<'a>(&'a self, request: GenerateRequest) -> ModelGatewayFuture<'a> {
        self.seen_requests
            .lock()
            .expect("seen requests lock should not be poisoned")
            .push(request);
        let reply = self
            .replies
            .lock()
            .expect("replies lock should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelGatewayError::ProviderFailure(
                    "exhausted scripted replies".to_string(),
                ))
            });

        Box::pin(async move { reply })
    }
}

pub fn test_models() -> ModelConfig {
    ModelConfig {
        simulation_model: "test-simulation-model".to_string(),
        image_model: "test-image-model".to_string(),
        audio_model: "test-audio-model".to_string(),
    }
}

pub fn build_test_router(gateway: ScriptedGateway) -> axum::Router {
    build_router(
        AppState {
            gateway: Arc::new(gateway),
            models: test_models(),
            project_name: "Chronos API".to_string(),
        },
        Some(CLIENT_ORIGIN),
    )
}

pub fn text_reply(text: &str) -> ScriptedReply {
    Ok(single_candidate(vec![Part::text(text)]))
}

pub fn inline_reply(mime_type: &str, data: &[u8]) -> ScriptedReply {
    Ok(single_candidate(vec![Part::inline_data(
        mime_type,
        data.to_vec(),
    )]))
}

pub fn single_candidate(parts: Vec<Part>) -> ModelResponse {
    ModelResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".to_string()),
                parts,
            }),
        }],
    }
}

pub fn provider_failure(message: &str) -> ScriptedReply {
    Err(ModelGatewayError::ProviderFailure(message.to_string()))
}

pub struct JsonResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse {
        status,
        headers,
        body,
    }
}

pub fn request(method: Method, uri: &str, json_body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match json_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

pub fn error_code(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|error| error.get("code"))
        .and_then(Value::as_str)
}

pub fn error_message(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
}
