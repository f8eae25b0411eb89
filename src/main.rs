//! Server entry point: configuration, logging, database and search index
//! bootstrap, then the axum server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dungeon_builder_backend::auth::{TokenManager, DEFAULT_SECRET};
use dungeon_builder_backend::config::Config;
use dungeon_builder_backend::db::{self, Repository};
use dungeon_builder_backend::search::SearchIndex;
use dungeon_builder_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Character-Builder Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the token secret is not configured
    if config.secret_key.is_none() {
        tracing::warn!(
            "No token secret configured (DND_SECRET_KEY). Falling back to the default secret!"
        );
    }

    // Initialize database (migrations + catalog seed)
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Build the equipment index from the seeded catalog
    tracing::info!("Building search index...");
    let equipments = repo.all_equipments().await?;
    search.rebuild(&equipments).await?;
    tracing::info!("Search index built with {} equipments", equipments.len());

    // Token manager with the configured or default secret
    let secret = config
        .secret_key
        .clone()
        .unwrap_or_else(|| DEFAULT_SECRET.to_string());
    let tokens = Arc::new(TokenManager::new(&secret));

    // Create application state
    let state = AppState {
        repo,
        search,
        tokens,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
