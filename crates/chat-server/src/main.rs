use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use chat_server::config::ServerConfig;
use chat_server::http::router::build_router;
use chat_server::{AppState, InMemoryQuotaCounter};

const EVICTION_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let counter = Arc::new(InMemoryQuotaCounter::new());
    spawn_quota_eviction(counter.clone(), config.quota_idle_ttl);

    let state = AppState::from_config(&config, counter);
    let app = build_router(state, config.web_dir.as_deref());

    let listener = TcpListener::bind(&config.bind_addr).await?;
    log::info!("Chat server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_quota_eviction(counter: Arc<InMemoryQuotaCounter>, max_idle: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL.min(max_idle.max(Duration::from_secs(1))));
        loop {
            ticker.tick().await;
            let evicted = counter.evict_idle(max_idle);
            if evicted > 0 {
                log::info!("Evicted {} idle demo counter(s), {} left", evicted, counter.len());
            }
        }
    });
}
