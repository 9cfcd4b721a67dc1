use crate::config::RelayConfig;
use crate::relay::{RelayActor, RelayCommand, SignalRelay};
use crate::room::RoomRegistry;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use huddle_core::IceServerConfig;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const RELAY_QUEUE_SIZE: usize = 1024;

/// Starts the relay actor and returns the service the WebSocket routes use.
pub fn spawn_relay(ice_servers: Vec<IceServerConfig>) -> SignalingService {
    let (relay_tx, relay_rx) = mpsc::channel::<RelayCommand>(RELAY_QUEUE_SIZE);
    let service = SignalingService::new(relay_tx, ice_servers);

    let actor = RelayActor::new(
        SignalRelay::new(RoomRegistry::new()),
        relay_rx,
        Arc::new(service.clone()),
    );
    tokio::spawn(actor.run());

    service
}

pub fn build_router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(service)
}

pub async fn serve(listener: TcpListener, config: RelayConfig) -> Result<()> {
    let service = spawn_relay(config.ice_servers);
    let app = build_router(service);

    info!("Signaling relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Signaling relay stopped");
    Ok(())
}

async fn index() -> Json<Value> {
    Json(json!({
        "status": "Server is running",
        "message": "Connect via WebSocket at /ws",
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
