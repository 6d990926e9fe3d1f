use memgame::{router, AppState, ServerConfig, SessionRegistry};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memgame=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        bind_addr = %config.bind_addr,
        slots = config.slots,
        max_tiles = config.max_tiles,
        verbose = config.verbose,
        "Starting memory game server"
    );

    let registry = Arc::new(SessionRegistry::new(
        config.slots,
        config.max_tiles,
        config.verbose,
    ));
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    let app = router(AppState::new(registry));

    info!(addr = %listener.local_addr()?, "Server listening");
    axum::serve(listener, app).await
}
