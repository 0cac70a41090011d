//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and extraction helpers
//! - `errors.rs`: response envelopes

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let wiring = services::build_services(config).await?;
    let auth_state = middleware::AuthState { jwt: wiring.jwt };

    // Protected routes: require a valid session token.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let api = Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(wiring.services));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1", api)
        .fallback(routes::system::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
}
