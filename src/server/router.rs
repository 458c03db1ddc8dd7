use axum::{Router, routing::get};

use super::{handlers, state::AppState};

/// Paths that all serve the RSS feed.
pub const FEED_PATHS: [&str; 4] = ["/", "/rss", "/feed", "/nyt-morning-briefing.xml"];

pub fn create_router(state: AppState) -> Router {
    let router = FEED_PATHS
        .iter()
        .fold(Router::<AppState>::new(), |router, path| {
            router.route(path, get(handlers::serve_feed))
        });

    router
        .route("/health", get(handlers::health))
        .route("/favicon.ico", get(handlers::favicon))
        .with_state(state)
}
