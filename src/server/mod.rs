//! HTTP surface: `/rss` (and aliases), `/health`, `/favicon.ico`.

mod handlers;
mod router;
mod state;

pub use router::{FEED_PATHS, create_router};
pub use state::AppState;

use crate::error::Result;
use crate::models::Config;

/// Bind the configured address and serve until the process exits.
pub async fn run_server(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = create_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Serving feed for {} on http://{}", config.fetcher.source_url, addr);

    axum::serve(listener, app).await?;
    Ok(())
}
