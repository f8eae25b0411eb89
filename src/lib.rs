//! Character-Builder Backend
//!
//! GraphQL backend for a D&D character builder with SQLite persistence and
//! a Tantivy-backed equipment search, plus the client state-sync layer the
//! frontend contract is built on.

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod graphql;
pub mod models;
pub mod search;

use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenManager;
use config::Config;
use db::Repository;
use search::SearchIndex;

/// Application state shared across all resolvers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub tokens: Arc<TokenManager>,
    pub config: Arc<Config>,
}

/// Create the application router with the GraphQL endpoint and health check.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let schema = graphql::create_schema(state.clone());
    let tokens = state.tokens.clone();

    Router::new()
        .route(
            "/graphql",
            get(graphql::graphql_playground).post(graphql::graphql_handler),
        )
        .route("/health", get(health_check))
        .layer(middleware::from_fn(move |req, next| {
            auth::bearer_auth_layer(tokens.clone(), req, next)
        }))
        .layer(Extension(schema))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
