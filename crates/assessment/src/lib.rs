//! `lsp-assessment`: assessments, participant profiles and the schema catalog.

pub mod assessment;
pub mod patch;
pub mod profile;
pub mod schema;

pub use assessment::{Assessment, AssessmentPatch, AssessmentResult, AssessmentStatus, NewAssessment};
pub use profile::{Assessee, Assessor, AssessorPatch, Gender, NewAssessor};
pub use schema::{
    CatalogStatus, CertificationSchema, Competency, CompetencyUnit, NewCompetency, NewSchema,
    NewUnit, SchemaKind, SchemaStatus,
};
