//! Router assembly for the three protocol endpoints
//!
//! Hosts with their own routing can mount the handlers directly; this
//! module wires the standard paths plus a health check.

use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use profilefed_core::WEBFINGER_PATH;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::profile::{ProfileHandler, ProfileQuery};
use crate::server_info::ServerInfoHandler;
use crate::webfinger::WebFingerHandler;

/// Path the profile handler is mounted at by [`create_router`]; the demo
/// WebFinger resolver advertises hrefs under this path
pub const PROFILE_PATH: &str = "/profile";

#[derive(Deserialize)]
struct ResourceQuery {
    resource: Option<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

async fn webfinger_route(
    State(handler): State<Arc<WebFingerHandler>>,
    Query(query): Query<ResourceQuery>,
) -> Response {
    handler.handle(query.resource.as_deref().unwrap_or_default()).await
}

async fn server_info_route(State(handler): State<Arc<ServerInfoHandler>>) -> Response {
    handler.handle().await
}

async fn profile_route(
    State(handler): State<Arc<ProfileHandler>>,
    Query(query): Query<ProfileQuery>,
) -> Response {
    handler.handle(&query).await
}

/// Create a router serving the WebFinger, server-info, and profile
/// endpoints at their standard paths
pub fn create_router(
    webfinger: Arc<WebFingerHandler>,
    server_info: Arc<ServerInfoHandler>,
    profile: Arc<ProfileHandler>,
) -> Router {
    // CORS configuration for browser-based clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let webfinger = Router::new()
        .route(WEBFINGER_PATH, get(webfinger_route))
        .with_state(webfinger);
    let server_info = Router::new()
        .route(profilefed_core::SERVER_INFO_PATH, get(server_info_route))
        .with_state(server_info);
    let profile = Router::new()
        .route(PROFILE_PATH, get(profile_route))
        .with_state(profile);

    webfinger
        .merge(server_info)
        .merge(profile)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
