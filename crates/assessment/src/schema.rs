//! Certification schemas (skema), their competency units, and the competency
//! catalog referenced by assessor profiles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use lsp_core::{CompetencyId, DomainError, SchemaId, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    #[serde(rename = "KKNI")]
    Kkni,
    Okupasi,
    Klaster,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Kkni => "KKNI",
            SchemaKind::Okupasi => "Okupasi",
            SchemaKind::Klaster => "Klaster",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "KKNI" => Ok(Self::Kkni),
            "Okupasi" => Ok(Self::Okupasi),
            "Klaster" => Ok(Self::Klaster),
            other => Err(DomainError::validation(format!("unknown jenis_skema '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SchemaStatus {
    #[default]
    #[serde(rename = "Aktif")]
    Active,
    #[serde(rename = "Tidak Aktif")]
    Inactive,
}

impl SchemaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaStatus::Active => "Aktif",
            SchemaStatus::Inactive => "Tidak Aktif",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "Aktif" => Ok(Self::Active),
            "Tidak Aktif" => Ok(Self::Inactive),
            other => Err(DomainError::validation(format!("unknown schema status '{other}'"))),
        }
    }
}

/// Status of a catalog competency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CatalogStatus {
    #[default]
    #[serde(rename = "Aktif")]
    Active,
    #[serde(rename = "Non-Aktif")]
    Inactive,
}

impl CatalogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogStatus::Active => "Aktif",
            CatalogStatus::Inactive => "Non-Aktif",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "Aktif" => Ok(Self::Active),
            "Non-Aktif" => Ok(Self::Inactive),
            other => Err(DomainError::validation(format!("unknown competency status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationSchema {
    pub id: SchemaId,
    #[serde(rename = "judul_skema")]
    pub title: String,
    #[serde(rename = "nomor_skema")]
    pub number: String,
    #[serde(rename = "jenis_skema")]
    pub kind: SchemaKind,
    #[serde(rename = "deskripsi")]
    pub description: String,
    #[serde(rename = "tanggal_berlaku")]
    pub valid_from: Option<NaiveDate>,
    pub status: SchemaStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSchema {
    #[serde(rename = "judul_skema")]
    pub title: String,
    #[serde(rename = "nomor_skema")]
    pub number: String,
    #[serde(rename = "jenis_skema")]
    pub kind: SchemaKind,
    #[serde(rename = "deskripsi", default)]
    pub description: String,
    #[serde(rename = "tanggal_berlaku", default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub status: SchemaStatus,
}

impl CertificationSchema {
    pub fn new(input: NewSchema, now: DateTime<Utc>) -> Result<Self, DomainError> {
        required("judul_skema", &input.title)?;
        required("nomor_skema", &input.number)?;
        Ok(Self {
            id: SchemaId::new(),
            title: input.title.trim().to_string(),
            number: input.number.trim().to_string(),
            kind: input.kind,
            description: input.description,
            valid_from: input.valid_from,
            status: input.status,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A competency unit belonging to one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyUnit {
    pub id: UnitId,
    #[serde(rename = "id_skema")]
    pub schema_id: SchemaId,
    #[serde(rename = "kode_unit")]
    pub code: String,
    #[serde(rename = "judul_unit")]
    pub title: String,
    #[serde(rename = "deskripsi")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUnit {
    #[serde(rename = "kode_unit")]
    pub code: String,
    #[serde(rename = "judul_unit")]
    pub title: String,
    #[serde(rename = "deskripsi", default)]
    pub description: String,
}

impl CompetencyUnit {
    pub fn new(schema_id: SchemaId, input: NewUnit, now: DateTime<Utc>) -> Result<Self, DomainError> {
        required("kode_unit", &input.code)?;
        required("judul_unit", &input.title)?;
        Ok(Self {
            id: UnitId::new(),
            schema_id,
            code: input.code.trim().to_string(),
            title: input.title.trim().to_string(),
            description: input.description,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Catalog competency; assessors list the codes they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competency {
    pub id: CompetencyId,
    #[serde(rename = "kode")]
    pub code: String,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "deskripsi")]
    pub description: String,
    #[serde(rename = "jenis")]
    pub kind: String,
    pub level: String,
    pub status: CatalogStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCompetency {
    #[serde(rename = "kode")]
    pub code: String,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "deskripsi", default)]
    pub description: String,
    #[serde(rename = "jenis", default)]
    pub kind: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub status: CatalogStatus,
}

impl Competency {
    pub fn new(input: NewCompetency, now: DateTime<Utc>) -> Result<Self, DomainError> {
        required("kode", &input.code)?;
        required("nama", &input.name)?;
        Ok(Self {
            id: CompetencyId::new(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            kind: input.kind,
            level: input.level,
            status: input.status,
            created_at: now,
            updated_at: now,
        })
    }
}

fn required(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_from_json() {
        let input: NewSchema = serde_json::from_str(
            r#"{"judul_skema": "Junior Web Developer", "nomor_skema": "SKM/0001", "jenis_skema": "KKNI", "tanggal_berlaku": "2024-01-01"}"#,
        )
        .unwrap();
        let schema = CertificationSchema::new(input, Utc::now()).unwrap();
        assert_eq!(schema.kind, SchemaKind::Kkni);
        assert_eq!(schema.status, SchemaStatus::Active);
        assert_eq!(schema.valid_from, NaiveDate::from_ymd_opt(2024, 1, 1));

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["jenis_skema"], "KKNI");
        assert_eq!(json["status"], "Aktif");
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let unit = NewUnit {
            code: " ".to_string(),
            title: "Menggunakan SQL".to_string(),
            description: String::new(),
        };
        assert!(CompetencyUnit::new(SchemaId::new(), unit, Utc::now()).is_err());

        let competency = NewCompetency {
            code: "J.620100.001.01".to_string(),
            name: String::new(),
            description: String::new(),
            kind: String::new(),
            level: String::new(),
            status: CatalogStatus::Active,
        };
        assert!(Competency::new(competency, Utc::now()).is_err());
    }

    #[test]
    fn status_strings_round_trip() {
        for s in [CatalogStatus::Active, CatalogStatus::Inactive] {
            assert_eq!(CatalogStatus::parse(s.as_str()).unwrap(), s);
        }
        for s in [SchemaStatus::Active, SchemaStatus::Inactive] {
            assert_eq!(SchemaStatus::parse(s.as_str()).unwrap(), s);
        }
        for k in [SchemaKind::Kkni, SchemaKind::Okupasi, SchemaKind::Klaster] {
            assert_eq!(SchemaKind::parse(k.as_str()).unwrap(), k);
        }
    }
}
