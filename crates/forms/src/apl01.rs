//! APL01: certification application / personal data form.
//!
//! At most one per assessment. Every field is optional on the wire; blank
//! values never overwrite stored ones.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use lsp_assessment::Gender;
use lsp_assessment::patch::{blank_as_none, merge, merge_opt};
use lsp_core::{AssessmentId, FormApl01Id};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormApl01 {
    pub id: FormApl01Id,
    #[serde(rename = "id_asesmen")]
    pub assessment_id: AssessmentId,

    // Personal data
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
    #[serde(rename = "kebangsaan")]
    pub nationality: String,
    #[serde(rename = "alamat")]
    pub address: String,
    #[serde(rename = "kode_pos")]
    pub postal_code: String,
    #[serde(rename = "no_rumah")]
    pub home_phone: String,
    #[serde(rename = "no_kantor")]
    pub office_phone: String,
    #[serde(rename = "no_hp")]
    pub mobile_phone: String,
    pub email: String,
    #[serde(rename = "kualifikasi_pendidikan")]
    pub education: String,

    // Current employment
    #[serde(rename = "institusi")]
    pub institution: String,
    #[serde(rename = "jabatan")]
    pub position: String,
    #[serde(rename = "alamat_kantor")]
    pub office_address: String,
    #[serde(rename = "kode_pos_kantor")]
    pub office_postal_code: String,
    #[serde(rename = "telp_kantor")]
    pub office_tel: String,
    #[serde(rename = "fax_kantor")]
    pub office_fax: String,
    #[serde(rename = "email_kantor")]
    pub office_email: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// APL01 field values, used both for creation and as an update merge-patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Apl01Fields {
    #[serde(rename = "nama_lengkap", default, deserialize_with = "blank_as_none")]
    pub full_name: Option<String>,
    #[serde(rename = "no_ktp", default, deserialize_with = "blank_as_none")]
    pub id_card_number: Option<String>,
    #[serde(rename = "tempat_lahir", default, deserialize_with = "blank_as_none")]
    pub birth_place: Option<String>,
    /// `YYYY-MM-DD`; anything else is a validation error.
    #[serde(rename = "tanggal_lahir", default, deserialize_with = "blank_as_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "jenis_kelamin", default, deserialize_with = "blank_as_none")]
    pub gender: Option<Gender>,
    #[serde(rename = "kebangsaan", default, deserialize_with = "blank_as_none")]
    pub nationality: Option<String>,
    #[serde(rename = "alamat", default, deserialize_with = "blank_as_none")]
    pub address: Option<String>,
    #[serde(rename = "kode_pos", default, deserialize_with = "blank_as_none")]
    pub postal_code: Option<String>,
    #[serde(rename = "no_rumah", default, deserialize_with = "blank_as_none")]
    pub home_phone: Option<String>,
    #[serde(rename = "no_kantor", default, deserialize_with = "blank_as_none")]
    pub office_phone: Option<String>,
    #[serde(rename = "no_hp", default, deserialize_with = "blank_as_none")]
    pub mobile_phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(rename = "kualifikasi_pendidikan", default, deserialize_with = "blank_as_none")]
    pub education: Option<String>,
    #[serde(rename = "institusi", default, deserialize_with = "blank_as_none")]
    pub institution: Option<String>,
    #[serde(rename = "jabatan", default, deserialize_with = "blank_as_none")]
    pub position: Option<String>,
    #[serde(rename = "alamat_kantor", default, deserialize_with = "blank_as_none")]
    pub office_address: Option<String>,
    #[serde(rename = "kode_pos_kantor", default, deserialize_with = "blank_as_none")]
    pub office_postal_code: Option<String>,
    #[serde(rename = "telp_kantor", default, deserialize_with = "blank_as_none")]
    pub office_tel: Option<String>,
    #[serde(rename = "fax_kantor", default, deserialize_with = "blank_as_none")]
    pub office_fax: Option<String>,
    #[serde(rename = "email_kantor", default, deserialize_with = "blank_as_none")]
    pub office_email: Option<String>,
}

/// Create request: the parent assessment plus the initial field values.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApl01 {
    #[serde(rename = "id_asesmen")]
    pub assessment_id: AssessmentId,
    #[serde(flatten)]
    pub fields: Apl01Fields,
}

impl FormApl01 {
    pub fn new(assessment_id: AssessmentId, fields: Apl01Fields, now: DateTime<Utc>) -> Self {
        let mut form = Self {
            id: FormApl01Id::new(),
            assessment_id,
            full_name: String::new(),
            id_card_number: String::new(),
            birth_place: String::new(),
            birth_date: None,
            gender: None,
            nationality: String::new(),
            address: String::new(),
            postal_code: String::new(),
            home_phone: String::new(),
            office_phone: String::new(),
            mobile_phone: String::new(),
            email: String::new(),
            education: String::new(),
            institution: String::new(),
            position: String::new(),
            office_address: String::new(),
            office_postal_code: String::new(),
            office_tel: String::new(),
            office_fax: String::new(),
            office_email: String::new(),
            created_at: now,
            updated_at: now,
        };
        form.apply(fields, now);
        form
    }

    /// Merge supplied values into the form.
    pub fn apply(&mut self, fields: Apl01Fields, now: DateTime<Utc>) {
        merge(&mut self.full_name, fields.full_name);
        merge(&mut self.id_card_number, fields.id_card_number);
        merge(&mut self.birth_place, fields.birth_place);
        merge_opt(&mut self.birth_date, fields.birth_date);
        merge_opt(&mut self.gender, fields.gender);
        merge(&mut self.nationality, fields.nationality);
        merge(&mut self.address, fields.address);
        merge(&mut self.postal_code, fields.postal_code);
        merge(&mut self.home_phone, fields.home_phone);
        merge(&mut self.office_phone, fields.office_phone);
        merge(&mut self.mobile_phone, fields.mobile_phone);
        merge(&mut self.email, fields.email);
        merge(&mut self.education, fields.education);
        merge(&mut self.institution, fields.institution);
        merge(&mut self.position, fields.position);
        merge(&mut self.office_address, fields.office_address);
        merge(&mut self.office_postal_code, fields.office_postal_code);
        merge(&mut self.office_tel, fields.office_tel);
        merge(&mut self.office_fax, fields.office_fax);
        merge(&mut self.office_email, fields.office_email);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_flattens_fields() {
        let id = AssessmentId::new();
        let body = serde_json::json!({
            "id_asesmen": id,
            "nama_lengkap": "Siti Aminah",
            "tanggal_lahir": "1998-07-17",
            "jenis_kelamin": "Perempuan",
            "no_hp": ""
        });
        let req: NewApl01 = serde_json::from_value(body).unwrap();
        assert_eq!(req.assessment_id, id);

        let form = FormApl01::new(req.assessment_id, req.fields, Utc::now());
        assert_eq!(form.full_name, "Siti Aminah");
        assert_eq!(form.birth_date, NaiveDate::from_ymd_opt(1998, 7, 17));
        assert_eq!(form.gender, Some(Gender::Female));
        assert_eq!(form.mobile_phone, "");
    }

    #[test]
    fn malformed_birth_date_is_rejected() {
        let body = serde_json::json!({ "tanggal_lahir": "17-07-1998" });
        assert!(serde_json::from_value::<Apl01Fields>(body).is_err());
    }

    #[test]
    fn update_keeps_unspecified_and_blank_fields() {
        let now = Utc::now();
        let mut form = FormApl01::new(
            AssessmentId::new(),
            Apl01Fields {
                full_name: Some("Siti Aminah".to_string()),
                institution: Some("PT Maju".to_string()),
                ..Default::default()
            },
            now,
        );

        let patch: Apl01Fields =
            serde_json::from_str(r#"{"jabatan": "Staff IT", "nama_lengkap": "", "institusi": null}"#).unwrap();
        form.apply(patch, now);

        assert_eq!(form.full_name, "Siti Aminah");
        assert_eq!(form.institution, "PT Maju");
        assert_eq!(form.position, "Staff IT");
    }

    #[test]
    fn serializes_wire_names() {
        let form = FormApl01::new(AssessmentId::new(), Apl01Fields::default(), Utc::now());
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("id_asesmen").is_some());
        assert!(json.get("email_kantor").is_some());
        assert!(json["tanggal_lahir"].is_null());
    }
}
