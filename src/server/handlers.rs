use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use super::state::AppState;
use crate::models::HealthReport;
use crate::storage::CacheRead;

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

/// Serve the current feed, refreshing it first if stale.
pub async fn serve_feed(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    log::info!("RSS request from {}", user_agent);

    let CacheRead::Snapshot(snapshot) = state.cache.get_current().await else {
        log::warn!("Feed requested before any successful fetch");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Feed temporarily unavailable",
        )
            .into_response();
    };

    match state.renderer.render(&snapshot) {
        Ok(xml) => {
            let headers: [(HeaderName, String); 3] = [
                (header::CONTENT_TYPE, RSS_CONTENT_TYPE.to_string()),
                (header::CACHE_CONTROL, state.cache_control.to_string()),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            ];
            (StatusCode::OK, headers, xml).into_response()
        }
        Err(e) => {
            log::error!("Failed to render feed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Liveness plus the time of the last successful fetch.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.cache.health().report(Utc::now()))
}

pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
