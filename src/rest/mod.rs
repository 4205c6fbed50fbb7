//! REST API for the refund request wizard.
//!
//! Clients create a session, post each step's input, and submit once the
//! session reports `canSubmit`. Status lookups by confirmation number are
//! stateless.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors_allow_any = state.config.server.cors_allow_any;

    let router = Router::new()
        // Health endpoints
        .route("/api/v1/health", get(routes::health::health))
        // Session endpoints
        .route(
            "/api/v1/refunds/sessions",
            post(routes::sessions::create),
        )
        .route(
            "/api/v1/refunds/sessions/:id",
            get(routes::sessions::get_one).delete(routes::sessions::delete),
        )
        .route(
            "/api/v1/refunds/sessions/:id/email",
            post(routes::sessions::submit_email),
        )
        .route(
            "/api/v1/refunds/sessions/:id/pass-details",
            post(routes::sessions::confirm_pass_details),
        )
        .route(
            "/api/v1/refunds/sessions/:id/decision",
            post(routes::sessions::set_decision),
        )
        .route(
            "/api/v1/refunds/sessions/:id/payment",
            post(routes::sessions::set_payment),
        )
        .route(
            "/api/v1/refunds/sessions/:id/navigate",
            post(routes::sessions::navigate),
        )
        .route(
            "/api/v1/refunds/sessions/:id/back",
            post(routes::sessions::go_back),
        )
        .route(
            "/api/v1/refunds/sessions/:id/reset",
            post(routes::sessions::reset),
        )
        .route(
            "/api/v1/refunds/sessions/:id/submission",
            get(routes::sessions::submission),
        )
        .route(
            "/api/v1/refunds/sessions/:id/submit",
            post(routes::sessions::submit),
        )
        // Status endpoints
        .route(
            "/api/v1/refunds/status/:confirmation",
            get(routes::status::lookup),
        )
        // API docs
        .route("/api-docs/openapi.json", get(openapi::spec))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Start the REST API server
pub async fn serve(state: ApiState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    tracing::info!("REST API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::config::Config;
    use std::sync::Arc;

    #[test]
    fn test_build_router() {
        let state = ApiState::new(Config::default(), Arc::new(InMemoryBackend::new()));
        let _router = build_router(state);
        // Router builds without panicking
    }

    #[test]
    fn test_build_router_without_cors() {
        let mut config = Config::default();
        config.server.cors_allow_any = false;
        let state = ApiState::new(config, Arc::new(InMemoryBackend::demo()));
        let _router = build_router(state);
    }

    #[tokio::test]
    async fn test_serve_rejects_bad_host() {
        let state = ApiState::new(Config::default(), Arc::new(InMemoryBackend::new()));
        let err = serve(state, "not a host", 0).await.unwrap_err();
        assert!(err.to_string().contains("Invalid listen address"));
    }
}
