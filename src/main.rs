use std::net::SocketAddr;
use std::sync::Arc;

use movie_discovery_backend::api::{self, AppState};
use movie_discovery_backend::config::{AppConfig, DiscoveryConfig};
use movie_discovery_backend::external::{Catalog, TmdbClient};
use movie_discovery_backend::services::trend::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();
    let config = AppConfig::from_env();

    // Load cache policy
    let discovery_config = DiscoveryConfig::load(&config.discovery_config_path).await?;

    // Initialize catalog client
    let tmdb_client = TmdbClient::new(&config.tmdb)?;
    let catalog_configured = tmdb_client.has_credentials();
    let catalog: Arc<dyn Catalog> = Arc::new(tmdb_client);

    let state = AppState::new(
        catalog,
        &discovery_config,
        Arc::new(SystemClock),
        catalog_configured,
    );

    // Start cache cleanup task
    let cleanup_task = state.cleanup_task(&discovery_config);
    tokio::spawn(cleanup_task.start());

    let app = api::create_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!(
        "📊 Cache cleanup task started (interval: {}s)",
        discovery_config.cleanup_interval().as_secs()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
