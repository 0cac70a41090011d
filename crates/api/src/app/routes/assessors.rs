use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Router,
};

use lsp_assessment::{AssessorPatch, NewAssessor};
use lsp_core::AssessorId;

use crate::app::dto::{self, ApiJson};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_assessors).post(create_assessor))
        .route("/:id", get(get_assessor).put(update_assessor).delete(delete_assessor))
        .route("/registrasi/:no_registrasi", get(get_by_registration))
}

pub async fn create_assessor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewAssessor>,
) -> axum::response::Response {
    errors::respond(
        services.assessors.create(principal.principal(), body).await,
        StatusCode::CREATED,
        "Asesor created successfully",
    )
}

pub async fn list_assessors(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    errors::respond(
        services.assessors.list(principal.principal()).await,
        StatusCode::OK,
        "Asesors retrieved successfully",
    )
}

pub async fn get_assessor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssessorId = match dto::parse_id(&id, "asesor") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.assessors.get(principal.principal(), id).await,
        StatusCode::OK,
        "Asesor retrieved successfully",
    )
}

pub async fn get_by_registration(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(number): Path<String>,
) -> axum::response::Response {
    errors::respond(
        services.assessors.by_registration(principal.principal(), &number).await,
        StatusCode::OK,
        "Asesor retrieved successfully",
    )
}

pub async fn update_assessor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AssessorPatch>,
) -> axum::response::Response {
    let id: AssessorId = match dto::parse_id(&id, "asesor") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.assessors.update(principal.principal(), id, body).await,
        StatusCode::OK,
        "Asesor updated successfully",
    )
}

pub async fn delete_assessor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssessorId = match dto::parse_id(&id, "asesor") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.assessors.delete(principal.principal(), id).await,
        StatusCode::OK,
        "Asesor deleted successfully",
    )
}
