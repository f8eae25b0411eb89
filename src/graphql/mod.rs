//! GraphQL schema and axum handlers.
//!
//! A single `/graphql` endpoint serves queries and mutations; the
//! playground is mounted for development. Application state is schema
//! data; the verified caller identity is attached per request.

mod mutation;
mod query;

pub use mutation::Mutation;
pub use query::Query;

use async_graphql::{EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{response::Html, response::IntoResponse, Extension};

use crate::auth::{AuthContext, MaybeAuth};
use crate::errors::AppError;
use crate::AppState;

/// The main GraphQL schema type.
pub type BuilderSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create the GraphQL schema with application state attached.
pub fn create_schema(state: AppState) -> BuilderSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(state)
        .finish()
}

/// GraphQL handler for axum. The auth middleware guarantees the
/// [`MaybeAuth`] extension is present on every request.
pub async fn graphql_handler(
    Extension(schema): Extension<BuilderSchema>,
    Extension(auth): Extension<MaybeAuth>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner().data(auth)).await.into()
}

/// GraphQL playground handler for development.
pub async fn graphql_playground() -> impl IntoResponse {
    let playground_html = async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    );

    Html(playground_html)
}

/// Resolve the caller identity, requiring that the token subject matches
/// the user being mutated.
pub(crate) fn authorize(
    ctx: &async_graphql::Context<'_>,
    user_id: &str,
) -> Result<AuthContext, AppError> {
    let auth = ctx
        .data::<MaybeAuth>()
        .map_err(|_| AppError::Internal("Missing auth extension".to_string()))?;

    match &auth.0 {
        Some(identity) if identity.user_id == user_id => Ok(identity.clone()),
        Some(_) => Err(AppError::Unauthorized(
            "Token subject does not match user".to_string(),
        )),
        None => Err(AppError::Unauthorized(
            "Authentication required".to_string(),
        )),
    }
}

/// Resolve the caller identity for operations that only need a signed-in
/// user (reviews), without a subject match.
pub(crate) fn require_auth(ctx: &async_graphql::Context<'_>) -> Result<AuthContext, AppError> {
    let auth = ctx
        .data::<MaybeAuth>()
        .map_err(|_| AppError::Internal("Missing auth extension".to_string()))?;

    auth.0
        .clone()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}
