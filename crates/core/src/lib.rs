//! `lsp-core`: identifiers and domain errors shared by every crate.
//!
//! Nothing in here knows about HTTP, storage or tokens.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{
    AssesseeId, AssessmentId, AssessorId, CompetencyId, FormApl01Id, FormApl02Id, SchemaId,
    UnitId, UserId,
};
