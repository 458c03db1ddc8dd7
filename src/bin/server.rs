//! Briefing RSS server
//!
//! Serves `/rss` and `/health` for the configured source page.

use std::path::PathBuf;

use briefing_rss::{error::Result, models::Config, server};
use clap::Parser;

/// Briefing RSS - republishes a briefing series page as RSS
#[derive(Parser, Debug)]
#[command(name = "briefing-rss", version, about = "Briefing page to RSS feed server")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log verbosity (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Seconds before a cached feed is considered stale
    #[arg(long, env = "CACHE_TTL_SECS")]
    ttl_secs: Option<u64>,

    /// Source page fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl Cli {
    /// Apply command-line and environment overrides on top of the file config.
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ttl) = self.ttl_secs {
            config.cache.ttl_secs = ttl;
        }
        if let Some(timeout) = self.timeout_secs {
            config.fetcher.timeout_secs = timeout;
        }
    }
}

/// Initialize logging at the requested level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut config = Config::load_optional(cli.config.as_deref())?;
    cli.apply(&mut config);

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::info!(
        "Cache TTL {}s, fetch timeout {}s",
        config.cache.ttl_secs,
        config.fetcher.timeout_secs
    );

    server::run_server(&config).await
}
