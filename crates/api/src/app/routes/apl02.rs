use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Router,
};

use lsp_core::{AssesseeId, AssessmentId, FormApl02Id};
use lsp_forms::{Apl02Patch, NewApl02};

use crate::app::dto::{self, ApiJson, FormQuery};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_form).get(query_forms))
        .route("/:id", get(get_form).put(update_form).delete(delete_form))
}

pub async fn create_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewApl02>,
) -> axum::response::Response {
    errors::respond(
        services.apl02.create(principal.principal(), body).await,
        StatusCode::CREATED,
        "Form APL02 created successfully",
    )
}

/// `?id=` returns one record, `?asesmen_id=` / `?asesi_id=` a list.
pub async fn query_forms(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<FormQuery>,
) -> axum::response::Response {
    let principal = principal.principal();
    const MESSAGE: &str = "Form APL02 retrieved successfully";

    let id: Option<FormApl02Id> = match dto::parse_opt_id(query.id.as_deref(), "form") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Some(id) = id {
        return errors::respond(services.apl02.get(principal, id).await, StatusCode::OK, MESSAGE);
    }

    let assessment: Option<AssessmentId> = match dto::parse_opt_id(query.asesmen_id.as_deref(), "asesmen") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Some(id) = assessment {
        return errors::respond(services.apl02.list_by_assessment(principal, id).await, StatusCode::OK, MESSAGE);
    }

    let assessee: Option<AssesseeId> = match dto::parse_opt_id(query.asesi_id.as_deref(), "asesi") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match assessee {
        Some(id) => errors::respond(services.apl02.list_by_assessee(principal, id).await, StatusCode::OK, MESSAGE),
        None if principal.is_staff() => errors::json_error(
            StatusCode::BAD_REQUEST,
            "Invalid request",
            "id, asesmen_id or asesi_id query parameter is required",
        ),
        None => errors::respond(services.apl02.list_mine(principal).await, StatusCode::OK, MESSAGE),
    }
}

pub async fn get_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: FormApl02Id = match dto::parse_id(&id, "form") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.apl02.get(principal.principal(), id).await,
        StatusCode::OK,
        "Form APL02 retrieved successfully",
    )
}

pub async fn update_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Apl02Patch>,
) -> axum::response::Response {
    let id: FormApl02Id = match dto::parse_id(&id, "form") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.apl02.update(principal.principal(), id, body).await,
        StatusCode::OK,
        "Form APL02 updated successfully",
    )
}

pub async fn delete_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: FormApl02Id = match dto::parse_id(&id, "form") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        services.apl02.delete(principal.principal(), id).await,
        StatusCode::OK,
        "Form APL02 deleted successfully",
    )
}
