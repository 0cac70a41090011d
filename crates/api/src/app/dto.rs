//! Request DTOs and extraction helpers.

use core::str::FromStr;

use axum::{
    async_trait,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use lsp_core::DomainError;

use crate::app::errors;

// -------------------------
// Extractors
// -------------------------

/// `Json<T>` whose rejection is a 400 envelope instead of axum's plain text.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> Response {
    errors::json_error(StatusCode::BAD_REQUEST, "Invalid request body", rejection.body_text())
}

/// Parse a path or query identifier, answering 400 when it is malformed.
pub fn parse_id<T>(raw: &str, what: &'static str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.trim()
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "Invalid request", format!("invalid {what} id")))
}

/// Parse an optional query identifier.
pub fn parse_opt_id<T>(raw: Option<&str>, what: &'static str) -> Result<Option<T>, Response>
where
    T: FromStr<Err = DomainError>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_id(raw, what).map(Some),
        None => Ok(None),
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /asesmen` filters.
#[derive(Debug, Default, Deserialize)]
pub struct AssessmentQuery {
    pub asesi_id: Option<String>,
    pub asesor_id: Option<String>,
}

/// `GET /apl01` and `GET /apl02` filters; at most one is used, in this order.
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    pub id: Option<String>,
    pub asesmen_id: Option<String>,
    pub asesi_id: Option<String>,
}
