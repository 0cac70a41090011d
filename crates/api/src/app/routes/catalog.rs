use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Router,
};

use lsp_assessment::{NewCompetency, NewSchema, NewUnit};
use lsp_core::SchemaId;

use crate::app::dto::{self, ApiJson};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn competency_router() -> Router {
    Router::new().route("/", get(list_competencies).post(create_competency))
}

pub fn schema_router() -> Router {
    Router::new()
        .route("/", get(list_schemas).post(create_schema))
        .route("/:id", get(get_schema))
        .route("/:id/units", get(list_units).post(create_unit))
}

pub async fn create_competency(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewCompetency>,
) -> axum::response::Response {
    errors::respond(
        services.catalog.create_competency(principal.principal(), body).await,
        StatusCode::CREATED,
        "Kompetensi created successfully",
    )
}

pub async fn list_competencies(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(
        services.catalog.list_competencies().await,
        StatusCode::OK,
        "Kompetensi retrieved successfully",
    )
}

pub async fn create_schema(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewSchema>,
) -> axum::response::Response {
    errors::respond(
        services.catalog.create_schema(principal.principal(), body).await,
        StatusCode::CREATED,
        "Skema created successfully",
    )
}

pub async fn list_schemas(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(
        services.catalog.list_schemas().await,
        StatusCode::OK,
        "Skema retrieved successfully",
    )
}

pub async fn get_schema(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SchemaId = match dto::parse_id(&id, "skema") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.catalog.get_schema(id).await,
        StatusCode::OK,
        "Skema retrieved successfully",
    )
}

pub async fn create_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NewUnit>,
) -> axum::response::Response {
    let id: SchemaId = match dto::parse_id(&id, "skema") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.catalog.create_unit(principal.principal(), id, body).await,
        StatusCode::CREATED,
        "Unit kompetensi created successfully",
    )
}

pub async fn list_units(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SchemaId = match dto::parse_id(&id, "skema") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.catalog.list_units(id).await,
        StatusCode::OK,
        "Unit kompetensi retrieved successfully",
    )
}
