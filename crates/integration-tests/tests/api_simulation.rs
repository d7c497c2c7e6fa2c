mod support;

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use shared::llm::{JSON_MIME_TYPE, NO_DIVERGENCE_SENTINEL, Prompt};

use support::{
    ScriptedGateway, build_test_router, error_code, error_message, provider_failure, request,
    send_json, text_reply,
};

const CANONICAL_OUTPUT: &str = r#"{"narrative":"X","world_state_update":{"year":1900,"chaos_level":10,"deviations":[],"population_mood":"calm","geopolitical_stability":80},"suggested_actions":["a"]}"#;

fn first_turn_body() -> Value {
    json!({
        "input": "What if the Titanic missed the iceberg?",
        "history": []
    })
}

#[tokio::test]
async fn simulate_turn_returns_validated_response() {
    let gateway = ScriptedGateway::with_replies(vec![text_reply(CANONICAL_OUTPUT)]);
    let app = build_test_router(gateway.clone());

    let response = send_json(
        &app,
        request(Method::POST, "/api/simulate-turn", Some(first_turn_body())),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["narrative"], "X");
    assert_eq!(response.body["world_state_update"]["chaos_level"], 10);
    assert_eq!(response.body["world_state_update"]["year"], 1900);
    assert_eq!(response.body["suggested_actions"], json!(["a"]));

    let seen = gateway.seen_requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].model, "test-simulation-model");

    let config = seen[0].config.as_ref().expect("json mode config present");
    assert_eq!(config.response_mime_type.as_deref(), Some(JSON_MIME_TYPE));
    assert!(config.response_schema.is_some());
    assert!(
        config
            .system_instruction
            .as_deref()
            .is_some_and(|instruction| instruction.contains(NO_DIVERGENCE_SENTINEL))
    );
}

#[tokio::test]
async fn simulate_turn_sends_state_and_transcript_to_provider() {
    let gateway = ScriptedGateway::with_replies(vec![text_reply(&format!(
        "```json\n{CANONICAL_OUTPUT}\n```"
    ))]);
    let app = build_test_router(gateway.clone());

    let response = send_json(
        &app,
        request(
            Method::POST,
            "/api/simulate-turn",
            Some(json!({
                "input": "Advance 10 years",
                "history": [
                    { "id": "1", "role": "system", "content": "session started", "timestamp": "2026-10-16T00:00:00Z" },
                    { "id": "2", "role": "user", "content": "The Titanic arrives in New York" },
                    { "id": "3", "role": "ai", "content": "Crowds cheer at Pier 59." }
                ],
                "current_state": {
                    "year": 1912,
                    "chaos_level": 12,
                    "deviations": ["Titanic survives"],
                    "population_mood": "jubilant",
                    "geopolitical_stability": 70
                }
            })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);

    let seen = gateway.seen_requests();
    let Prompt::Text(prompt) = &seen[0].prompt else {
        panic!("simulation prompt should be plain text");
    };
    assert!(prompt.starts_with(
        "USER: The Titanic arrives in New York\nAI: Crowds cheer at Pier 59.\nUSER: Advance 10 years"
    ));
    assert!(!prompt.contains("session started"));

    let instruction = seen[0]
        .config
        .as_ref()
        .and_then(|config| config.system_instruction.clone())
        .expect("system instruction present");
    assert!(instruction.contains("\"deviations\":[\"Titanic survives\"]"));
    assert!(!instruction.contains(NO_DIVERGENCE_SENTINEL));
}

#[tokio::test]
async fn simulate_turn_empty_provider_text_is_server_error() {
    let gateway = ScriptedGateway::with_replies(vec![text_reply("")]);
    let app = build_test_router(gateway);

    let response = send_json(
        &app,
        request(Method::POST, "/api/simulate-turn", Some(first_turn_body())),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&response.body), Some("empty_provider_response"));
    assert_eq!(
        error_message(&response.body),
        Some("No response from simulation model")
    );
}

#[tokio::test]
async fn simulate_turn_malformed_json_is_parse_failure() {
    let gateway =
        ScriptedGateway::with_replies(vec![text_reply("```json\n{\"narrative\": \"X\",\n```")]);
    let app = build_test_router(gateway);

    let response = send_json(
        &app,
        request(Method::POST, "/api/simulate-turn", Some(first_turn_body())),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&response.body), Some("simulation_parse_failed"));
    assert!(
        error_message(&response.body)
            .is_some_and(|message| message.starts_with("Failed to parse simulation JSON"))
    );
}

#[tokio::test]
async fn simulate_turn_out_of_range_output_is_simulation_failure() {
    let out_of_range = CANONICAL_OUTPUT.replace("\"chaos_level\":10", "\"chaos_level\":101");
    let gateway = ScriptedGateway::with_replies(vec![text_reply(&out_of_range)]);
    let app = build_test_router(gateway);

    let response = send_json(
        &app,
        request(Method::POST, "/api/simulate-turn", Some(first_turn_body())),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&response.body), Some("simulation_failed"));
    assert!(
        error_message(&response.body)
            .is_some_and(|message| message.starts_with("Simulation failed"))
    );
}

#[tokio::test]
async fn simulate_turn_provider_failure_is_simulation_failure() {
    let gateway = ScriptedGateway::with_replies(vec![provider_failure("status=503")]);
    let app = build_test_router(gateway);

    let response = send_json(
        &app,
        request(Method::POST, "/api/simulate-turn", Some(first_turn_body())),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&response.body), Some("simulation_failed"));
    assert!(
        error_message(&response.body).is_some_and(|message| message.contains("status=503"))
    );
}

#[tokio::test]
async fn simulate_turn_rejects_out_of_range_current_state_without_calling_provider() {
    let gateway = ScriptedGateway::with_replies(vec![text_reply(CANONICAL_OUTPUT)]);
    let app = build_test_router(gateway.clone());

    let response = send_json(
        &app,
        request(
            Method::POST,
            "/api/simulate-turn",
            Some(json!({
                "input": "Continue",
                "history": [],
                "current_state": {
                    "year": 1800,
                    "chaos_level": 5,
                    "deviations": [],
                    "population_mood": "calm",
                    "geopolitical_stability": 180
                }
            })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&response.body), Some("invalid_world_state"));
    assert!(gateway.seen_requests().is_empty());
}

#[tokio::test]
async fn simulate_turn_rejects_body_missing_history() {
    let gateway = ScriptedGateway::default();
    let app = build_test_router(gateway.clone());

    let response = send_json(
        &app,
        request(
            Method::POST,
            "/api/simulate-turn",
            Some(json!({ "input": "Hello" })),
        ),
    )
    .await;

    assert!(response.status.is_client_error());
    assert!(gateway.seen_requests().is_empty());
}
