//! APL01 and APL02 form services.
//!
//! Every operation resolves the parent assessment before anything else:
//! a missing form or assessment is `NotFound`, then the ownership check
//! runs, and only then is anything read back or persisted.

use chrono::Utc;
use tracing::{info, instrument};

use lsp_auth::Principal;
use lsp_core::{AssesseeId, AssessmentId, FormApl01Id, FormApl02Id};
use lsp_forms::{Apl01Fields, Apl02Patch, FormApl01, FormApl02, NewApl01, NewApl02};

use super::{Found, OwnershipResolver, ServiceError};
use crate::store::Stores;

#[derive(Clone)]
pub struct Apl01Service {
    stores: Stores,
    ownership: OwnershipResolver,
}

impl Apl01Service {
    pub fn new(stores: Stores, ownership: OwnershipResolver) -> Self {
        Self { stores, ownership }
    }

    /// File the APL01 for an assessment. Each assessment has at most one.
    #[instrument(skip(self, principal, input), fields(id_asesmen = %input.assessment_id))]
    pub async fn create(&self, principal: &Principal, input: NewApl01) -> Result<FormApl01, ServiceError> {
        let assessment = self.ownership.assessment(principal, input.assessment_id).await?;

        if self
            .stores
            .apl01
            .find_apl01_by_assessment(assessment.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict("form APL01 already exists for this asesmen"));
        }

        let form = FormApl01::new(assessment.id, input.fields, Utc::now());
        self.stores.apl01.insert_apl01(&form).await?;
        info!(form_id = %form.id, "APL01 created");
        Ok(form)
    }

    pub async fn get(&self, principal: &Principal, id: FormApl01Id) -> Result<FormApl01, ServiceError> {
        let form = self.stores.apl01.find_apl01(id).await.or_not_found("form APL01")?;
        self.ownership.assessment(principal, form.assessment_id).await?;
        Ok(form)
    }

    pub async fn get_by_assessment(&self, principal: &Principal, id: AssessmentId) -> Result<FormApl01, ServiceError> {
        let assessment = self.ownership.assessment(principal, id).await?;
        self.stores
            .apl01
            .find_apl01_by_assessment(assessment.id)
            .await
            .or_not_found("form APL01")
    }

    pub async fn list_by_assessee(&self, principal: &Principal, id: AssesseeId) -> Result<Vec<FormApl01>, ServiceError> {
        let profile = self.ownership.assessee(principal, id).await?;
        Ok(self.stores.apl01.list_apl01_by_assessee(profile.id).await?)
    }

    pub async fn list_mine(&self, principal: &Principal) -> Result<Vec<FormApl01>, ServiceError> {
        let profile = self.ownership.own_profile(principal).await?;
        Ok(self.stores.apl01.list_apl01_by_assessee(profile.id).await?)
    }

    /// Merge the supplied fields; absent or blank ones keep their value.
    #[instrument(skip(self, principal, fields))]
    pub async fn update(&self, principal: &Principal, id: FormApl01Id, fields: Apl01Fields) -> Result<FormApl01, ServiceError> {
        let mut form = self.get(principal, id).await?;
        form.apply(fields, Utc::now());
        self.stores.apl01.update_apl01(&form).await?;
        info!(form_id = %form.id, "APL01 updated");
        Ok(form)
    }

    #[instrument(skip(self, principal))]
    pub async fn delete(&self, principal: &Principal, id: FormApl01Id) -> Result<(), ServiceError> {
        let form = self.get(principal, id).await?;
        self.stores.apl01.delete_apl01(form.id).await?;
        info!(form_id = %form.id, "APL01 deleted");
        Ok(())
    }
}

#[derive(Clone)]
pub struct Apl02Service {
    stores: Stores,
    ownership: OwnershipResolver,
}

impl Apl02Service {
    pub fn new(stores: Stores, ownership: OwnershipResolver) -> Self {
        Self { stores, ownership }
    }

    #[instrument(skip(self, principal, input))]
    pub async fn create(&self, principal: &Principal, input: NewApl02) -> Result<FormApl02, ServiceError> {
        let assessment_id = input.assessment()?;
        self.ownership.assessment(principal, assessment_id).await?;

        let form = FormApl02::new(input, Utc::now())?;
        self.stores.apl02.insert_apl02(&form).await?;
        info!(form_id = %form.id, id_asesmen = %assessment_id, "APL02 created");
        Ok(form)
    }

    pub async fn get(&self, principal: &Principal, id: FormApl02Id) -> Result<FormApl02, ServiceError> {
        let form = self.stores.apl02.find_apl02(id).await.or_not_found("form APL02")?;
        self.ownership.assessment(principal, form.assessment_id).await?;
        Ok(form)
    }

    pub async fn list_by_assessment(&self, principal: &Principal, id: AssessmentId) -> Result<Vec<FormApl02>, ServiceError> {
        let assessment = self.ownership.assessment(principal, id).await?;
        Ok(self.stores.apl02.list_apl02_by_assessment(assessment.id).await?)
    }

    pub async fn list_by_assessee(&self, principal: &Principal, id: AssesseeId) -> Result<Vec<FormApl02>, ServiceError> {
        let profile = self.ownership.assessee(principal, id).await?;
        Ok(self.stores.apl02.list_apl02_by_assessee(profile.id).await?)
    }

    pub async fn list_mine(&self, principal: &Principal) -> Result<Vec<FormApl02>, ServiceError> {
        let profile = self.ownership.own_profile(principal).await?;
        Ok(self.stores.apl02.list_apl02_by_assessee(profile.id).await?)
    }

    #[instrument(skip(self, principal, patch))]
    pub async fn update(&self, principal: &Principal, id: FormApl02Id, patch: Apl02Patch) -> Result<FormApl02, ServiceError> {
        let mut form = self.get(principal, id).await?;
        form.apply(patch, Utc::now());
        self.stores.apl02.update_apl02(&form).await?;
        info!(form_id = %form.id, status = %form.status, "APL02 updated");
        Ok(form)
    }

    #[instrument(skip(self, principal))]
    pub async fn delete(&self, principal: &Principal, id: FormApl02Id) -> Result<(), ServiceError> {
        let form = self.get(principal, id).await?;
        self.stores.apl02.delete_apl02(form.id).await?;
        info!(form_id = %form.id, "APL02 deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use lsp_forms::Apl02Status;

    fn apl01(assessment_id: AssessmentId, name: &str) -> NewApl01 {
        NewApl01 {
            assessment_id,
            fields: Apl01Fields {
                full_name: Some(name.to_string()),
                nationality: Some("Indonesia".to_string()),
                ..Default::default()
            },
        }
    }

    fn apl02(assessment_id: AssessmentId) -> NewApl02 {
        NewApl02 {
            assessment_id: Some(assessment_id),
            unit_code: Some("J.620100.004.02".to_string()),
            unit_title: Some("Menggunakan Struktur Data".to_string()),
            element: Some("Mengidentifikasi konsep data".to_string()),
            criteria: Some("Konsep data diidentifikasi".to_string()),
            status: Some(Apl02Status::K),
            evidence: Some("Sertifikat".to_string()),
        }
    }

    #[tokio::test]
    async fn second_apl01_for_same_assessment_conflicts() {
        let (services, stores) = testing::services();
        let (owner, profile) = testing::assessee(&stores, "maya").await;
        let assessment = testing::assessment_for(&stores, &profile).await;

        services.apl01.create(&owner, apl01(assessment.id, "Maya")).await.unwrap();
        assert!(matches!(
            services.apl01.create(&owner, apl01(assessment.id, "Maya Lagi")).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            services.apl01.create(&testing::admin(), apl01(assessment.id, "Admin")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn foreign_assessee_is_forbidden_on_every_form_operation() {
        let (services, stores) = testing::services();
        let (owner, profile) = testing::assessee(&stores, "nina").await;
        let (intruder, _) = testing::assessee(&stores, "oscar").await;
        let assessment = testing::assessment_for(&stores, &profile).await;
        let form1 = services.apl01.create(&owner, apl01(assessment.id, "Nina")).await.unwrap();
        let form2 = services.apl02.create(&owner, apl02(assessment.id)).await.unwrap();

        let forbidden = |r: Result<(), ServiceError>| matches!(r, Err(ServiceError::Forbidden(_)));
        assert!(forbidden(services.apl01.create(&intruder, apl01(assessment.id, "x")).await.map(drop)));
        assert!(forbidden(services.apl01.get(&intruder, form1.id).await.map(drop)));
        assert!(forbidden(services.apl01.update(&intruder, form1.id, Apl01Fields::default()).await.map(drop)));
        assert!(forbidden(services.apl01.delete(&intruder, form1.id).await));
        assert!(forbidden(services.apl02.create(&intruder, apl02(assessment.id)).await.map(drop)));
        assert!(forbidden(services.apl02.get(&intruder, form2.id).await.map(drop)));
        assert!(forbidden(services.apl02.list_by_assessment(&intruder, assessment.id).await.map(drop)));
        assert!(forbidden(services.apl02.update(&intruder, form2.id, Apl02Patch::default()).await.map(drop)));
        assert!(forbidden(services.apl02.delete(&intruder, form2.id).await));

        // Nothing changed for the owner.
        assert_eq!(services.apl01.get(&owner, form1.id).await.unwrap(), form1);
        assert_eq!(services.apl02.get(&owner, form2.id).await.unwrap(), form2);
    }

    #[tokio::test]
    async fn staff_access_any_form() {
        let (services, stores) = testing::services();
        let (owner, profile) = testing::assessee(&stores, "putri").await;
        let assessment = testing::assessment_for(&stores, &profile).await;
        let form = services.apl02.create(&owner, apl02(assessment.id)).await.unwrap();

        for staff in [testing::admin(), testing::assessor()] {
            assert!(services.apl02.get(&staff, form.id).await.is_ok());
            assert_eq!(services.apl02.list_by_assessee(&staff, profile.id).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() {
        let (services, stores) = testing::services();
        let (owner, _) = testing::assessee(&stores, "rudi").await;

        assert!(matches!(
            services.apl01.create(&owner, apl01(AssessmentId::new(), "Rudi")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            services.apl02.create(&owner, apl02(AssessmentId::new())).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            services.apl01.get(&owner, FormApl01Id::new()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn apl01_update_merges_present_fields_only() {
        let (services, stores) = testing::services();
        let (owner, profile) = testing::assessee(&stores, "sari").await;
        let assessment = testing::assessment_for(&stores, &profile).await;
        let form = services.apl01.create(&owner, apl01(assessment.id, "Sari")).await.unwrap();

        let patch: Apl01Fields =
            serde_json::from_str(r#"{"jabatan": "Programmer", "nama_lengkap": ""}"#).unwrap();
        let updated = services.apl01.update(&owner, form.id, patch).await.unwrap();
        assert_eq!(updated.position, "Programmer");
        assert_eq!(updated.full_name, "Sari");
        assert_eq!(updated.nationality, "Indonesia");
    }

    #[tokio::test]
    async fn apl02_status_update_keeps_unit_code() {
        let (services, stores) = testing::services();
        let (owner, profile) = testing::assessee(&stores, "tono").await;
        let assessment = testing::assessment_for(&stores, &profile).await;
        let form = services.apl02.create(&owner, apl02(assessment.id)).await.unwrap();

        let patch = Apl02Patch {
            status: Some(Apl02Status::Bk),
            ..Default::default()
        };
        let updated = services.apl02.update(&owner, form.id, patch).await.unwrap();
        assert_eq!(updated.status, Apl02Status::Bk);
        assert_eq!(updated.unit_code, form.unit_code);
        assert_eq!(updated.evidence, form.evidence);
    }

    #[tokio::test]
    async fn list_mine_returns_own_forms_and_rejects_staff() {
        let (services, stores) = testing::services();
        let (owner, profile) = testing::assessee(&stores, "umi").await;
        let (other, other_profile) = testing::assessee(&stores, "vino").await;
        let mine = testing::assessment_for(&stores, &profile).await;
        let theirs = testing::assessment_for(&stores, &other_profile).await;
        services.apl02.create(&owner, apl02(mine.id)).await.unwrap();
        services.apl02.create(&other, apl02(theirs.id)).await.unwrap();

        let listed = services.apl02.list_mine(&owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].assessment_id, mine.id);

        assert!(matches!(
            services.apl02.list_mine(&testing::admin()).await,
            Err(ServiceError::Forbidden(_))
        ));
    }
}
