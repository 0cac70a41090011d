use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Router,
};

use lsp_assessment::{AssessmentPatch, NewAssessment};
use lsp_core::{AssesseeId, AssessmentId, AssessorId};

use crate::app::dto::{self, ApiJson, AssessmentQuery};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_assessments).post(create_assessment))
        .route("/:id", get(get_assessment).put(update_assessment).delete(delete_assessment))
}

pub async fn create_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewAssessment>,
) -> axum::response::Response {
    errors::respond(
        services.assessments.create(principal.principal(), body).await,
        StatusCode::CREATED,
        "Asesmen created successfully",
    )
}

/// `?asesi_id=` or `?asesor_id=`; without either, the caller's own.
pub async fn list_assessments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<AssessmentQuery>,
) -> axum::response::Response {
    let assessee: Option<AssesseeId> = match dto::parse_opt_id(query.asesi_id.as_deref(), "asesi") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let assessor: Option<AssessorId> = match dto::parse_opt_id(query.asesor_id.as_deref(), "asesor") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let principal = principal.principal();
    if assessee.is_none() && assessor.is_none() && principal.is_staff() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "Invalid request",
            "asesi_id or asesor_id query parameter is required",
        );
    }
    let result = match (assessee, assessor) {
        (Some(id), _) => services.assessments.list_by_assessee(principal, id).await,
        (None, Some(id)) => services.assessments.list_by_assessor(principal, id).await,
        (None, None) => services.assessments.list_mine(principal).await,
    };
    errors::respond(result, StatusCode::OK, "Asesmen retrieved successfully")
}

pub async fn get_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssessmentId = match dto::parse_id(&id, "asesmen") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.assessments.get(principal.principal(), id).await,
        StatusCode::OK,
        "Asesmen retrieved successfully",
    )
}

pub async fn update_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AssessmentPatch>,
) -> axum::response::Response {
    let id: AssessmentId = match dto::parse_id(&id, "asesmen") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.assessments.update(principal.principal(), id, body).await,
        StatusCode::OK,
        "Asesmen updated successfully",
    )
}

pub async fn delete_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssessmentId = match dto::parse_id(&id, "asesmen") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.assessments.delete(principal.principal(), id).await,
        StatusCode::OK,
        "Asesmen deleted successfully",
    )
}
