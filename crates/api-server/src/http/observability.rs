use std::time::Instant;

use axum::extract::Request;
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const MAX_REQUEST_ID_LEN: usize = 128;

/// Per-request data handlers read back through `Extension`.
#[derive(Clone, Debug)]
pub(super) struct RequestContext {
    pub(super) request_id: String,
}

/// Tags every request with an id, echoes it in `x-request-id` and logs the
/// outcome inside an `api_request` span.
///
/// Runs as an outer `Router::layer`, before routing, so the logged path is the
/// raw request path. Unmatched routes are logged and tagged too.
pub(super) async fn request_observability_middleware(mut req: Request, next: Next) -> Response {
    let request_id = inbound_request_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());
    let span = info_span!(
        "api_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let started_at = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let latency_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    span.in_scope(|| log_completion(response.status(), latency_ms));
    response
}

fn log_completion(status: StatusCode, latency_ms: u64) {
    let status = status.as_u16();
    if status >= 500 {
        warn!(status, latency_ms, "request failed");
    } else {
        info!(status, latency_ms, "request completed");
    }
}

fn inbound_request_id(req: &Request) -> Option<String> {
    req.headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(normalize_request_id)
}

fn normalize_request_id(raw: &str) -> Option<String> {
    let candidate = raw.trim();
    let acceptable = !candidate.is_empty()
        && candidate.len() <= MAX_REQUEST_ID_LEN
        && candidate
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'));

    acceptable.then(|| candidate.to_owned())
}
