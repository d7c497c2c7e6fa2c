mod support;

use axum::http::{Method, StatusCode, header};
use serde_json::json;

use support::{CLIENT_ORIGIN, ScriptedGateway, build_test_router, request, send_json};

#[tokio::test]
async fn root_reports_service_status() {
    let app = build_test_router(ScriptedGateway::default());

    let response = send_json(&app, request(Method::GET, "/", None)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "status": "Chronos API is running" }));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = build_test_router(ScriptedGateway::default());

    let generated = send_json(&app, request(Method::GET, "/", None)).await;
    assert!(generated.headers.contains_key("x-request-id"));

    let mut echoed_request = request(Method::GET, "/", None);
    echoed_request
        .headers_mut()
        .insert("x-request-id", "turn-42".parse().expect("valid header"));
    let echoed = send_json(&app, echoed_request).await;

    assert_eq!(
        echoed
            .headers
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("turn-42")
    );
}

#[tokio::test]
async fn api_routes_allow_configured_client_origin() {
    let app = build_test_router(ScriptedGateway::default());

    let mut preflight = request(Method::OPTIONS, "/api/simulate-turn", None);
    let headers = preflight.headers_mut();
    headers.insert(header::ORIGIN, CLIENT_ORIGIN.parse().expect("valid header"));
    headers.insert(
        header::ACCESS_CONTROL_REQUEST_METHOD,
        "POST".parse().expect("valid header"),
    );

    let response = send_json(&app, preflight).await;

    assert_eq!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some(CLIENT_ORIGIN)
    );
}

#[tokio::test]
async fn unknown_api_route_is_not_found() {
    let app = build_test_router(ScriptedGateway::default());

    let response = send_json(&app, request(Method::POST, "/api/rewrite-history", None)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
