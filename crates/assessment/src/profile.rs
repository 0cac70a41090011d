//! Participant profiles: assessees (asesi) and assessors (asesor).
//!
//! Each profile points at the user account that logs in for it.

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use lsp_core::{AssesseeId, AssessorId, CompetencyId, DomainError, UserId};

use crate::patch::{blank_as_none, merge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Laki-laki", alias = "Male")]
    Male,
    #[serde(rename = "Perempuan", alias = "Female")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Laki-laki",
            Gender::Female => "Perempuan",
        }
    }
}

impl core::fmt::Display for Gender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Laki-laki" | "Male" => Ok(Self::Male),
            "Perempuan" | "Female" => Ok(Self::Female),
            other => Err(DomainError::validation(format!(
                "jenis_kelamin must be Laki-laki or Perempuan (got '{other}')"
            ))),
        }
    }
}

/// The person being assessed.
///
/// Created alongside the user account on registration; most personal fields
/// start empty and are filled in through the APL01 form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessee {
    pub id: AssesseeId,
    pub user_id: UserId,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    #[serde(rename = "no_ktp")]
    pub id_card_number: String,
    #[serde(rename = "tempat_lahir")]
    pub birth_place: String,
    #[serde(rename = "tanggal_lahir")]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "jenis_kelamin")]
    pub gender: Option<Gender>,
    #[serde(rename = "alamat")]
    pub address: String,
    #[serde(rename = "kode_pos")]
    pub postal_code: String,
    #[serde(rename = "no_telepon")]
    pub phone: String,
    pub email: String,
    #[serde(rename = "kualifikasi_pendidikan")]
    pub education: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessee {
    pub fn new(
        user_id: UserId,
        full_name: impl Into<String>,
        email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AssesseeId::new(),
            user_id,
            full_name: full_name.into(),
            id_card_number: String::new(),
            birth_place: String::new(),
            birth_date: None,
            gender: None,
            address: String::new(),
            postal_code: String::new(),
            phone: String::new(),
            email: email.into(),
            education: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The person conducting assessments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessor {
    pub id: AssessorId,
    pub user_id: UserId,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    #[serde(rename = "no_registrasi")]
    pub registration_number: String,
    pub email: String,
    #[serde(rename = "no_telepon")]
    pub phone: String,
    /// Competency codes (`kode`) this assessor may assess.
    #[serde(rename = "kompetensi")]
    pub competencies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin input for a new assessor and its login account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssessor {
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    #[serde(rename = "no_registrasi")]
    pub registration_number: String,
    pub email: String,
    #[serde(rename = "no_telepon", default)]
    pub phone: String,
    /// Defaults to the registration number.
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
    #[serde(rename = "kompetensi_ids", default)]
    pub competency_ids: Vec<CompetencyId>,
}

impl NewAssessor {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::validation("nama_lengkap is required"));
        }
        if self.registration_number.trim().is_empty() {
            return Err(DomainError::validation("no_registrasi is required"));
        }
        Ok(())
    }

    pub fn login_name(&self) -> String {
        match self.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.registration_number.trim().to_string(),
        }
    }
}

/// Merge-patch for an assessor profile.
///
/// `kompetensi_ids`, when present, replaces the whole competency list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssessorPatch {
    #[serde(rename = "nama_lengkap", default, deserialize_with = "blank_as_none")]
    pub full_name: Option<String>,
    #[serde(rename = "no_registrasi", default, deserialize_with = "blank_as_none")]
    pub registration_number: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(rename = "no_telepon", default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(rename = "kompetensi_ids", default)]
    pub competency_ids: Option<Vec<CompetencyId>>,
}

impl Assessor {
    pub fn new(
        user_id: UserId,
        input: &NewAssessor,
        competencies: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AssessorId::new(),
            user_id,
            full_name: input.full_name.trim().to_string(),
            registration_number: input.registration_number.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone: input.phone.trim().to_string(),
            competencies,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the scalar fields of a patch. Competency ids are resolved to
    /// codes by the caller and passed in `competencies`.
    pub fn apply(&mut self, patch: AssessorPatch, competencies: Option<Vec<String>>, now: DateTime<Utc>) {
        merge(&mut self.full_name, patch.full_name);
        merge(&mut self.registration_number, patch.registration_number);
        merge(&mut self.email, patch.email.map(|e| e.to_lowercase()));
        merge(&mut self.phone, patch.phone);
        merge(&mut self.competencies, competencies);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_assessor() -> NewAssessor {
        NewAssessor {
            full_name: "Rina Wati".to_string(),
            registration_number: "MET.000.001".to_string(),
            email: "Rina@LSP.id".to_string(),
            phone: String::new(),
            username: None,
            password: "rahasia".to_string(),
            competency_ids: vec![],
        }
    }

    #[test]
    fn gender_accepts_both_vocabularies() {
        assert_eq!("Laki-laki".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("L".parse::<Gender>().is_err());
        assert_eq!(serde_json::to_value(Gender::Female).unwrap(), "Perempuan");
    }

    #[test]
    fn assessor_login_name_falls_back_to_registration_number() {
        let mut input = new_assessor();
        assert_eq!(input.login_name(), "MET.000.001");
        input.username = Some("rina".to_string());
        assert_eq!(input.login_name(), "rina");
        input.username = Some("  ".to_string());
        assert_eq!(input.login_name(), "MET.000.001");
    }

    #[test]
    fn assessor_validation_requires_name_and_number() {
        assert!(new_assessor().validate().is_ok());
        let mut input = new_assessor();
        input.registration_number = " ".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn assessor_patch_merges() {
        let now = Utc::now();
        let mut assessor = Assessor::new(UserId::new(), &new_assessor(), vec!["K1".to_string()], now);
        assert_eq!(assessor.email, "rina@lsp.id");

        let patch: AssessorPatch = serde_json::from_str(r#"{"no_telepon": "0812", "nama_lengkap": ""}"#).unwrap();
        assessor.apply(patch, None, now);
        assert_eq!(assessor.phone, "0812");
        assert_eq!(assessor.full_name, "Rina Wati");
        assert_eq!(assessor.competencies, vec!["K1".to_string()]);
    }
}
