use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use lsp_assessment::{Assessee, Assessment, Assessor, CertificationSchema, Competency, CompetencyUnit};
use lsp_auth::{User, verify_password};
use lsp_core::{
    AssesseeId, AssessmentId, AssessorId, CompetencyId, FormApl01Id, FormApl02Id, SchemaId, UserId,
};
use lsp_forms::{FormApl01, FormApl02};

/// Data-store operation error.
///
/// These are **storage errors** as opposed to domain errors: the record the
/// caller asked to change is gone, a uniqueness constraint fired, or the
/// backend itself failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Credential store: user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` on a duplicate email or username.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    /// `email` is matched after trimming and lower-casing.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Look a user up by email and check the password against its stored
    /// hash. Unknown email and wrong password both yield `None`.
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>, StoreError> {
        let user = self.find_user_by_email(email).await?;
        Ok(user.filter(|u| verify_password(password, &u.password_hash)))
    }
}

#[async_trait]
pub trait AssesseeStore: Send + Sync {
    async fn insert_assessee(&self, assessee: &Assessee) -> Result<(), StoreError>;
    async fn find_assessee(&self, id: AssesseeId) -> Result<Option<Assessee>, StoreError>;
    async fn find_assessee_by_user(&self, user_id: UserId) -> Result<Option<Assessee>, StoreError>;
}

#[async_trait]
pub trait AssessorStore: Send + Sync {
    /// Fails with `Conflict` on a duplicate registration number.
    async fn insert_assessor(&self, assessor: &Assessor) -> Result<(), StoreError>;
    async fn update_assessor(&self, assessor: &Assessor) -> Result<(), StoreError>;
    async fn delete_assessor(&self, id: AssessorId) -> Result<(), StoreError>;
    async fn find_assessor(&self, id: AssessorId) -> Result<Option<Assessor>, StoreError>;
    async fn find_assessor_by_registration(&self, number: &str) -> Result<Option<Assessor>, StoreError>;
    async fn list_assessors(&self) -> Result<Vec<Assessor>, StoreError>;
}

/// Competency catalog, certification schemas and their units.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_competency(&self, competency: &Competency) -> Result<(), StoreError>;
    async fn list_competencies(&self) -> Result<Vec<Competency>, StoreError>;
    /// Returns the competencies that exist among `ids`; unknown ids are skipped.
    async fn find_competencies(&self, ids: &[CompetencyId]) -> Result<Vec<Competency>, StoreError>;

    async fn insert_schema(&self, schema: &CertificationSchema) -> Result<(), StoreError>;
    async fn find_schema(&self, id: SchemaId) -> Result<Option<CertificationSchema>, StoreError>;
    async fn list_schemas(&self) -> Result<Vec<CertificationSchema>, StoreError>;

    async fn insert_unit(&self, unit: &CompetencyUnit) -> Result<(), StoreError>;
    async fn list_units(&self, schema_id: SchemaId) -> Result<Vec<CompetencyUnit>, StoreError>;
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn insert_assessment(&self, assessment: &Assessment) -> Result<(), StoreError>;
    async fn update_assessment(&self, assessment: &Assessment) -> Result<(), StoreError>;
    /// Removes the assessment together with its forms.
    async fn delete_assessment(&self, id: AssessmentId) -> Result<(), StoreError>;
    async fn find_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, StoreError>;
    async fn list_assessments_by_assessee(&self, id: AssesseeId) -> Result<Vec<Assessment>, StoreError>;
    async fn list_assessments_by_assessor(&self, id: AssessorId) -> Result<Vec<Assessment>, StoreError>;
}

#[async_trait]
pub trait Apl01Store: Send + Sync {
    /// Fails with `Conflict` when the assessment already has an APL01.
    async fn insert_apl01(&self, form: &FormApl01) -> Result<(), StoreError>;
    async fn update_apl01(&self, form: &FormApl01) -> Result<(), StoreError>;
    async fn delete_apl01(&self, id: FormApl01Id) -> Result<(), StoreError>;
    async fn find_apl01(&self, id: FormApl01Id) -> Result<Option<FormApl01>, StoreError>;
    async fn find_apl01_by_assessment(&self, id: AssessmentId) -> Result<Option<FormApl01>, StoreError>;
    async fn list_apl01_by_assessee(&self, id: AssesseeId) -> Result<Vec<FormApl01>, StoreError>;
}

#[async_trait]
pub trait Apl02Store: Send + Sync {
    async fn insert_apl02(&self, form: &FormApl02) -> Result<(), StoreError>;
    async fn update_apl02(&self, form: &FormApl02) -> Result<(), StoreError>;
    async fn delete_apl02(&self, id: FormApl02Id) -> Result<(), StoreError>;
    async fn find_apl02(&self, id: FormApl02Id) -> Result<Option<FormApl02>, StoreError>;
    async fn list_apl02_by_assessment(&self, id: AssessmentId) -> Result<Vec<FormApl02>, StoreError>;
    async fn list_apl02_by_assessee(&self, id: AssesseeId) -> Result<Vec<FormApl02>, StoreError>;
}

/// Handles to every store, as shared by the services.
///
/// Both backends implement all the traits, so a single store value usually
/// sits behind every field.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub assessees: Arc<dyn AssesseeStore>,
    pub assessors: Arc<dyn AssessorStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub assessments: Arc<dyn AssessmentStore>,
    pub apl01: Arc<dyn Apl01Store>,
    pub apl02: Arc<dyn Apl02Store>,
}

impl Stores {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: UserStore
            + AssesseeStore
            + AssessorStore
            + CatalogStore
            + AssessmentStore
            + Apl01Store
            + Apl02Store
            + 'static,
    {
        Self {
            users: backend.clone(),
            assessees: backend.clone(),
            assessors: backend.clone(),
            catalog: backend.clone(),
            assessments: backend.clone(),
            apl01: backend.clone(),
            apl02: backend,
        }
    }
}
