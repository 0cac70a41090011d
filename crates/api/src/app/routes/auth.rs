use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Router,
};

use lsp_auth::Role;
use lsp_infra::services::Registration;

use crate::app::dto::{ApiJson, LoginRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Session endpoints that need a token.
pub fn router() -> Router {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<Registration>,
) -> axum::response::Response {
    errors::respond(
        services.auth.register(body).await,
        StatusCode::CREATED,
        "User registered successfully",
    )
}

async fn login_as(services: &AppServices, body: LoginRequest, role: Option<Role>) -> axum::response::Response {
    errors::respond(
        services.auth.login(&body.email, &body.password, role).await,
        StatusCode::OK,
        "Login successful",
    )
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> axum::response::Response {
    login_as(&services, body, None).await
}

pub async fn login_admin(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> axum::response::Response {
    login_as(&services, body, Some(Role::Admin)).await
}

pub async fn login_assessor(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> axum::response::Response {
    login_as(&services, body, Some(Role::Assessor)).await
}

pub async fn login_assessee(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> axum::response::Response {
    login_as(&services, body, Some(Role::Assessee)).await
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(Extension(principal): Extension<PrincipalContext>) -> axum::response::Response {
    tracing::info!(user_id = %principal.user_id(), "logout");
    errors::json_ok(StatusCode::OK, "Logged out successfully", ())
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    errors::respond(
        services.auth.profile(principal.principal()).await,
        StatusCode::OK,
        "Profile retrieved successfully",
    )
}
