use std::net::SocketAddr;
use std::sync::Arc;

use api_server::http::{self, AppState};
use shared::config::{ApiConfig, load_env_files};
use shared::llm::{GeminiGateway, GeminiGatewayConfig};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let loaded_env_files = load_env_files();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "api_server=debug,shared=info,axum=info,tower_http=info".to_string()
        }))
        .init();

    for file in loaded_env_files {
        info!("loaded environment from {file}");
    }

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let gateway_config = match GeminiGatewayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read gemini gateway config: {err}");
            std::process::exit(1);
        }
    };

    if config.client_origin.is_none() {
        warn!("CLIENT_URL is not set; browser clients on other origins will be refused");
    }

    info!(
        simulation_model = %config.models.simulation_model,
        image_model = %config.models.image_model,
        audio_model = %config.models.audio_model,
        "model routing configured"
    );

    let app = http::build_router(
        AppState {
            gateway: Arc::new(GeminiGateway::new(gateway_config)),
            models: config.models.clone(),
            project_name: config.project_name.clone(),
        },
        config.client_origin.as_deref(),
    );

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!("invalid API_BIND_ADDR {}: {err}", config.bind_addr);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "{} listening on {}",
        config.project_name,
        listener.local_addr().unwrap_or(addr)
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server exited with error: {err}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
