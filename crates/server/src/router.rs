//! HTTP routes for smartsearch.
//!
//! `/health` and `/search`, plus the middleware stack wrapped around them.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::Method,
    middleware,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use smartsearch_core::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::rate_limit::{SharedRateLimiter, rate_limit_middleware};
use crate::resolver::{Resolved, Resolver};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
}

/// Query string of `/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

/// Build the application router.
///
/// `limiter` of `None` leaves admission control to whatever sits in front.
pub fn build_router(state: AppState, limiter: Option<SharedRateLimiter>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .with_state(state);

    if let Some(limiter) = limiter {
        app = app.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    app.layer(cors).layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// A query string that does not deserialize is treated like a missing query.
async fn search(
    State(state): State<AppState>, params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Resolved>, Error> {
    let Query(params) = params.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;
    let raw = params.query.unwrap_or_default();
    let resolved = state.resolver.resolve(&raw).await?;
    Ok(Json(resolved))
}
