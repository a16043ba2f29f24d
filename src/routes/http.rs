// GET handlers: banner, version, latest snapshots

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::AppState;
use crate::models::Domain;
use crate::version::{NAME, VERSION, banner};

/// GET /: plain-text banner.
pub(super) async fn root_handler() -> impl IntoResponse {
    banner()
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/snapshots: latest snapshot of every domain polled so far.
pub(super) async fn snapshots_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.latest.all().await)
}

/// GET /api/snapshots/{domain}: 404 for unknown domains or before the first successful poll.
pub(super) async fn domain_snapshot_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> axum::response::Response {
    let Ok(domain) = domain.parse::<Domain>() else {
        return (StatusCode::NOT_FOUND, format!("unknown domain '{}'", domain)).into_response();
    };
    match state.latest.get(domain).await {
        Some(snapshot) => axum::Json(snapshot).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("no {} snapshot yet", domain),
        )
            .into_response(),
    }
}
