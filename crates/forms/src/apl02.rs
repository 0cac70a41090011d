//! APL02: assessee self-evaluation, one record per competency element.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lsp_assessment::patch::{blank_as_none, merge};
use lsp_core::{AssessmentId, DomainError, FormApl02Id};

/// Self-assessed verdict for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Apl02Status {
    /// Kompeten.
    K,
    /// Belum kompeten.
    #[serde(rename = "BK")]
    Bk,
}

impl Apl02Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Apl02Status::K => "K",
            Apl02Status::Bk => "BK",
        }
    }
}

impl core::fmt::Display for Apl02Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Apl02Status {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "K" => Ok(Self::K),
            "BK" => Ok(Self::Bk),
            other => Err(DomainError::validation(format!("status must be K or BK (got '{other}')"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormApl02 {
    pub id: FormApl02Id,
    #[serde(rename = "id_asesmen")]
    pub assessment_id: AssessmentId,
    #[serde(rename = "kode_unit")]
    pub unit_code: String,
    #[serde(rename = "judul_unit")]
    pub unit_title: String,
    #[serde(rename = "elemen")]
    pub element: String,
    /// Performance criteria (KUK).
    #[serde(rename = "kuk")]
    pub criteria: String,
    pub status: Apl02Status,
    /// Supporting evidence.
    #[serde(rename = "bukti")]
    pub evidence: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request. Every field is required; they are optional here only so
/// that a missing one reports as a validation error naming the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewApl02 {
    #[serde(rename = "id_asesmen", default)]
    pub assessment_id: Option<AssessmentId>,
    #[serde(rename = "kode_unit", default, deserialize_with = "blank_as_none")]
    pub unit_code: Option<String>,
    #[serde(rename = "judul_unit", default, deserialize_with = "blank_as_none")]
    pub unit_title: Option<String>,
    #[serde(rename = "elemen", default, deserialize_with = "blank_as_none")]
    pub element: Option<String>,
    #[serde(rename = "kuk", default, deserialize_with = "blank_as_none")]
    pub criteria: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<Apl02Status>,
    #[serde(rename = "bukti", default, deserialize_with = "blank_as_none")]
    pub evidence: Option<String>,
}

impl NewApl02 {
    /// The parent assessment, if one was given.
    pub fn assessment(&self) -> Result<AssessmentId, DomainError> {
        self.assessment_id
            .ok_or_else(|| DomainError::validation("id_asesmen is required"))
    }
}

/// Merge-patch for an APL02 record. The parent assessment cannot change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Apl02Patch {
    #[serde(rename = "kode_unit", default, deserialize_with = "blank_as_none")]
    pub unit_code: Option<String>,
    #[serde(rename = "judul_unit", default, deserialize_with = "blank_as_none")]
    pub unit_title: Option<String>,
    #[serde(rename = "elemen", default, deserialize_with = "blank_as_none")]
    pub element: Option<String>,
    #[serde(rename = "kuk", default, deserialize_with = "blank_as_none")]
    pub criteria: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<Apl02Status>,
    #[serde(rename = "bukti", default, deserialize_with = "blank_as_none")]
    pub evidence: Option<String>,
}

impl FormApl02 {
    pub fn new(input: NewApl02, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let assessment_id = input.assessment()?;
        let missing: Vec<&str> = [
            ("kode_unit", input.unit_code.is_none()),
            ("judul_unit", input.unit_title.is_none()),
            ("elemen", input.element.is_none()),
            ("kuk", input.criteria.is_none()),
            ("status", input.status.is_none()),
            ("bukti", input.evidence.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match input {
            NewApl02 {
                unit_code: Some(unit_code),
                unit_title: Some(unit_title),
                element: Some(element),
                criteria: Some(criteria),
                status: Some(status),
                evidence: Some(evidence),
                ..
            } => Ok(Self {
                id: FormApl02Id::new(),
                assessment_id,
                unit_code,
                unit_title,
                element,
                criteria,
                status,
                evidence,
                created_at: now,
                updated_at: now,
            }),
            _ => Err(DomainError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }

    pub fn apply(&mut self, patch: Apl02Patch, now: DateTime<Utc>) {
        merge(&mut self.unit_code, patch.unit_code);
        merge(&mut self.unit_title, patch.unit_title);
        merge(&mut self.element, patch.element);
        merge(&mut self.criteria, patch.criteria);
        merge(&mut self.status, patch.status);
        merge(&mut self.evidence, patch.evidence);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn complete(assessment_id: AssessmentId) -> NewApl02 {
        NewApl02 {
            assessment_id: Some(assessment_id),
            unit_code: Some("J.620100.004.02".to_string()),
            unit_title: Some("Menggunakan Struktur Data".to_string()),
            element: Some("Mengidentifikasi konsep data".to_string()),
            criteria: Some("Konsep data diidentifikasi".to_string()),
            status: Some(Apl02Status::K),
            evidence: Some("Sertifikat pelatihan".to_string()),
        }
    }

    #[test]
    fn complete_input_creates_form() {
        let id = AssessmentId::new();
        let form = FormApl02::new(complete(id), Utc::now()).unwrap();
        assert_eq!(form.assessment_id, id);
        assert_eq!(form.status, Apl02Status::K);
    }

    #[test]
    fn missing_fields_are_named() {
        let mut input = complete(AssessmentId::new());
        input.criteria = None;
        input.evidence = None;
        let err = FormApl02::new(input, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("missing required fields: kuk, bukti")
        );

        let err = FormApl02::new(NewApl02::default(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("id_asesmen is required"));
    }

    #[test]
    fn status_accepts_only_k_and_bk() {
        let patch: Apl02Patch = serde_json::from_str(r#"{"status": "BK"}"#).unwrap();
        assert_eq!(patch.status, Some(Apl02Status::Bk));
        assert!(serde_json::from_str::<Apl02Patch>(r#"{"status": "X"}"#).is_err());
    }

    fn status() -> impl Strategy<Value = Apl02Status> {
        prop_oneof![Just(Apl02Status::K), Just(Apl02Status::Bk)]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a status-only patch leaves every other field unchanged.
        #[test]
        fn status_patch_preserves_other_fields(
            unit_code in "[A-Z]\\.[0-9]{6}\\.[0-9]{3}\\.[0-9]{2}",
            evidence in "[A-Za-z ]{1,40}",
            next in status(),
        ) {
            let mut input = complete(AssessmentId::new());
            input.unit_code = Some(unit_code.clone());
            input.evidence = Some(evidence.clone());
            let mut form = FormApl02::new(input, Utc::now()).unwrap();
            let before = form.clone();

            form.apply(Apl02Patch { status: Some(next), ..Default::default() }, Utc::now());

            prop_assert_eq!(form.status, next);
            prop_assert_eq!(&form.unit_code, &unit_code);
            prop_assert_eq!(&form.evidence, &evidence);
            prop_assert_eq!(&form.unit_title, &before.unit_title);
            prop_assert_eq!(&form.element, &before.element);
            prop_assert_eq!(&form.criteria, &before.criteria);
            prop_assert_eq!(form.assessment_id, before.assessment_id);
        }
    }
}
