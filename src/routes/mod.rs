// HTTP + WebSocket routes over the latest domain snapshots

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::models::{Domain, DomainSnapshot};
use crate::worker::LatestSnapshots;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) snapshot_tx: broadcast::Sender<DomainSnapshot>,
    pub(crate) latest: Arc<LatestSnapshots>,
    pub(crate) domains: Arc<Vec<Domain>>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    snapshot_tx: broadcast::Sender<DomainSnapshot>,
    latest: Arc<LatestSnapshots>,
    domains: Vec<Domain>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        snapshot_tx,
        latest,
        domains: Arc::new(domains),
        ws_connections,
    };
    Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/snapshots", get(http::snapshots_handler)) // GET /api/snapshots
        .route("/api/snapshots/{domain}", get(http::domain_snapshot_handler)) // GET /api/snapshots/{domain}
        .route("/ws/snapshots", get(ws::ws_snapshots)) // WS /ws/snapshots
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
