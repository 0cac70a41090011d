//! Assessment records.
//!
//! An assessment links one assessee, one assessor and one certification
//! schema. Its assessee is what makes forms ownable: every APL01/APL02 hangs
//! off an assessment and is owned by that assessment's assessee.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lsp_core::{AssesseeId, AssessmentId, AssessorId, DomainError, SchemaId};

use crate::patch::{blank_as_none, merge};

/// Lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssessmentStatus {
    #[default]
    #[serde(rename = "Draft")]
    Draft,
    #[serde(rename = "Berjalan", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Selesai", alias = "Completed")]
    Completed,
    #[serde(rename = "Ditolak", alias = "Rejected")]
    Rejected,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "Draft",
            AssessmentStatus::InProgress => "Berjalan",
            AssessmentStatus::Completed => "Selesai",
            AssessmentStatus::Rejected => "Ditolak",
        }
    }
}

impl core::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Berjalan" | "InProgress" => Ok(Self::InProgress),
            "Selesai" | "Completed" => Ok(Self::Completed),
            "Ditolak" | "Rejected" => Ok(Self::Rejected),
            other => Err(DomainError::validation(format!(
                "status must be one of Draft, Berjalan, Selesai, Ditolak (got '{other}')"
            ))),
        }
    }
}

/// Assessment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssessmentResult {
    #[serde(rename = "Kompeten", alias = "Competent")]
    Competent,
    #[serde(rename = "Belum Kompeten", alias = "NotYetCompetent")]
    NotYetCompetent,
    #[default]
    #[serde(rename = "Belum Selesai", alias = "Incomplete")]
    Incomplete,
}

impl AssessmentResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentResult::Competent => "Kompeten",
            AssessmentResult::NotYetCompetent => "Belum Kompeten",
            AssessmentResult::Incomplete => "Belum Selesai",
        }
    }
}

impl core::fmt::Display for AssessmentResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentResult {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kompeten" | "Competent" => Ok(Self::Competent),
            "Belum Kompeten" | "NotYetCompetent" => Ok(Self::NotYetCompetent),
            "Belum Selesai" | "Incomplete" => Ok(Self::Incomplete),
            other => Err(DomainError::validation(format!(
                "hasil must be one of Kompeten, Belum Kompeten, Belum Selesai (got '{other}')"
            ))),
        }
    }
}

/// Assessment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    #[serde(rename = "id_skema")]
    pub schema_id: Option<SchemaId>,
    #[serde(rename = "id_asesi")]
    pub assessee_id: Option<AssesseeId>,
    #[serde(rename = "id_asesor")]
    pub assessor_id: Option<AssessorId>,
    #[serde(rename = "tanggal_mulai")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "tanggal_selesai")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Assessment venue (TUK).
    #[serde(rename = "tuk")]
    pub venue: String,
    pub status: AssessmentStatus,
    #[serde(rename = "hasil")]
    pub result: AssessmentResult,
    #[serde(rename = "catatan")]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new assessment (references are checked by the caller).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssessment {
    #[serde(rename = "id_asesi")]
    pub assessee_id: AssesseeId,
    #[serde(rename = "id_asesor")]
    pub assessor_id: AssessorId,
    #[serde(rename = "id_skema")]
    pub schema_id: SchemaId,
    #[serde(rename = "tuk", default)]
    pub venue: String,
}

/// Merge-patch for an assessment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssessmentPatch {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<AssessmentStatus>,
    #[serde(rename = "hasil", default, deserialize_with = "blank_as_none")]
    pub result: Option<AssessmentResult>,
    #[serde(rename = "catatan", default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
}

impl Assessment {
    /// Start a new assessment: `Draft`, result `Belum Selesai`, started now.
    pub fn new(input: NewAssessment, now: DateTime<Utc>) -> Self {
        Self {
            id: AssessmentId::new(),
            schema_id: Some(input.schema_id),
            assessee_id: Some(input.assessee_id),
            assessor_id: Some(input.assessor_id),
            started_at: Some(now),
            finished_at: None,
            venue: input.venue.trim().to_string(),
            status: AssessmentStatus::Draft,
            result: AssessmentResult::Incomplete,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a merge-patch. Moving to `Selesai` stamps the finish time.
    pub fn apply(&mut self, patch: AssessmentPatch, now: DateTime<Utc>) {
        let completed = patch.status == Some(AssessmentStatus::Completed);

        merge(&mut self.status, patch.status);
        merge(&mut self.result, patch.result);
        merge(&mut self.notes, patch.notes);

        if completed {
            self.finished_at = Some(now);
        }
        self.updated_at = now;
    }
}
