use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::graphql::BifrostSchema;

/// One endpoint: GraphiQL on GET, query execution on POST.
pub fn build_router(schema: BifrostSchema) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(graphiql).post(graphql_handler))
        .route("/health", get(health))
        .layer(cors)
        .with_state(schema)
}

async fn graphql_handler(
    State(schema): State<BifrostSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let response = schema.execute(req.into_inner()).await;
    if !response.errors.is_empty() {
        warn!(errors = ?response.errors, "GraphQL errors");
    }
    response.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/").finish())
}

async fn health() -> &'static str {
    "ok"
}
