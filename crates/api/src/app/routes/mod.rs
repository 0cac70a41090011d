use axum::{Router, routing::post};

pub mod apl01;
pub mod apl02;
pub mod assessments;
pub mod assessors;
pub mod auth;
pub mod catalog;
pub mod system;

/// Endpoints reachable without a session token.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/login/admin", post(auth::login_admin))
        .route("/auth/login/asesor", post(auth::login_assessor))
        .route("/auth/login/asesi", post(auth::login_assessee))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/asesors", assessors::router())
        .nest("/kompetensi", catalog::competency_router())
        .nest("/skema", catalog::schema_router())
        .nest("/asesmen", assessments::router())
        .nest("/apl01", apl01::router())
        .nest("/apl02", apl02::router())
}
