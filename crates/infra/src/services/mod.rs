//! Application services.
//!
//! Each service owns a [`Stores`] handle and runs one use case per method:
//! validate the input, resolve the records involved, check the caller's role
//! and ownership, then persist. Every failure is reported as a
//! [`ServiceError`], whose variants line up one-to-one with HTTP status codes.

pub mod assessments;
pub mod assessors;
pub mod auth;
pub mod catalog;
pub mod forms;
pub mod ownership;

use thiserror::Error;
use tracing::{error, warn};

use lsp_auth::{AuthzError, PasswordError, TokenError};
use lsp_core::{DomainError, UserId};

use crate::store::{StoreError, Stores};

pub use assessments::AssessmentService;
pub use assessors::AssessorService;
pub use auth::{AuthService, Profile, Registration, Session};
pub use catalog::CatalogService;
pub use forms::{Apl01Service, Apl02Service};
pub use ownership::OwnershipResolver;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or a login through the wrong role.
    #[error("{0}")]
    Unauthorized(String),

    /// Ownership or role check failed.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness rule violated.
    #[error("{0}")]
    Conflict(String),

    /// Store or crypto failure. The detail is logged, never shown to clients.
    #[error("internal error")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("record not found".to_string()),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Backend(msg) => {
                error!(error = %msg, "store failure");
                Self::Internal(msg)
            }
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound => Self::NotFound("not found".to_string()),
            DomainError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        error!(error = %err, "password hashing failed");
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        error!(error = %err, "token signing failed");
        Self::Internal(err.to_string())
    }
}

/// Turn a store lookup into a `NotFound` naming the missing record.
pub(crate) trait Found<T> {
    fn or_not_found(self, what: &str) -> Result<T, ServiceError>;
}

impl<T> Found<T> for Result<Option<T>, StoreError> {
    fn or_not_found(self, what: &str) -> Result<T, ServiceError> {
        self?.ok_or_else(|| ServiceError::not_found(what))
    }
}

/// Remove an account whose profile could not be completed, so a retry is
/// not blocked by its email. Profiles the account already owns go with it.
pub(crate) async fn discard_account(stores: &Stores, user_id: UserId) {
    if let Err(err) = stores.users.delete_user(user_id).await {
        warn!(user_id = %user_id, error = %err, "orphaned user account");
    }
}

/// Every service, built over one set of stores.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub assessors: AssessorService,
    pub catalog: CatalogService,
    pub assessments: AssessmentService,
    pub apl01: Apl01Service,
    pub apl02: Apl02Service,
}

impl Services {
    pub fn new(stores: Stores, tokens: std::sync::Arc<dyn lsp_auth::TokenIssuer>) -> Self {
        let ownership = OwnershipResolver::new(stores.clone());
        Self {
            auth: AuthService::new(stores.clone(), tokens),
            assessors: AssessorService::new(stores.clone()),
            catalog: CatalogService::new(stores.clone()),
            assessments: AssessmentService::new(stores.clone(), ownership.clone()),
            apl01: Apl01Service::new(stores.clone(), ownership.clone()),
            apl02: Apl02Service::new(stores, ownership),
        }
    }
}
