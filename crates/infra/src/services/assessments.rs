//! Assessment records: who is assessed, by whom, against which schema.

use chrono::Utc;
use tracing::{info, instrument};

use lsp_assessment::{Assessment, AssessmentPatch, NewAssessment};
use lsp_auth::{Principal, Role, require_role};
use lsp_core::{AssesseeId, AssessmentId, AssessorId};

use super::{Found, OwnershipResolver, ServiceError};
use crate::store::Stores;

#[derive(Clone)]
pub struct AssessmentService {
    stores: Stores,
    ownership: OwnershipResolver,
}

impl AssessmentService {
    pub fn new(stores: Stores, ownership: OwnershipResolver) -> Self {
        Self { stores, ownership }
    }

    /// Open a new assessment. Every referenced record must exist.
    #[instrument(skip(self, principal, input), fields(id_asesi = %input.assessee_id))]
    pub async fn create(&self, principal: &Principal, input: NewAssessment) -> Result<Assessment, ServiceError> {
        require_role(principal, &[Role::Admin])?;

        self.stores
            .assessees
            .find_assessee(input.assessee_id)
            .await
            .or_not_found("asesi")?;
        self.stores
            .assessors
            .find_assessor(input.assessor_id)
            .await
            .or_not_found("asesor")?;
        self.stores
            .catalog
            .find_schema(input.schema_id)
            .await
            .or_not_found("skema")?;

        let assessment = Assessment::new(input, Utc::now());
        self.stores.assessments.insert_assessment(&assessment).await?;
        info!(assessment_id = %assessment.id, "assessment created");
        Ok(assessment)
    }

    #[instrument(skip(self, principal, patch))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: AssessmentId,
        patch: AssessmentPatch,
    ) -> Result<Assessment, ServiceError> {
        require_role(principal, &[Role::Admin, Role::Assessor])?;
        let mut assessment = self
            .stores
            .assessments
            .find_assessment(id)
            .await
            .or_not_found("asesmen")?;

        assessment.apply(patch, Utc::now());
        self.stores.assessments.update_assessment(&assessment).await?;
        info!(
            assessment_id = %assessment.id,
            status = %assessment.status,
            hasil = %assessment.result,
            "assessment updated"
        );
        Ok(assessment)
    }

    /// Delete an assessment and its forms.
    #[instrument(skip(self, principal))]
    pub async fn delete(&self, principal: &Principal, id: AssessmentId) -> Result<(), ServiceError> {
        require_role(principal, &[Role::Admin])?;
        self.stores.assessments.delete_assessment(id).await?;
        info!(assessment_id = %id, "assessment deleted");
        Ok(())
    }

    pub async fn get(&self, principal: &Principal, id: AssessmentId) -> Result<Assessment, ServiceError> {
        self.ownership.assessment(principal, id).await
    }

    pub async fn list_by_assessee(&self, principal: &Principal, id: AssesseeId) -> Result<Vec<Assessment>, ServiceError> {
        let profile = self.ownership.assessee(principal, id).await?;
        Ok(self.stores.assessments.list_assessments_by_assessee(profile.id).await?)
    }

    pub async fn list_by_assessor(&self, principal: &Principal, id: AssessorId) -> Result<Vec<Assessment>, ServiceError> {
        require_role(principal, &[Role::Admin, Role::Assessor])?;
        Ok(self.stores.assessments.list_assessments_by_assessor(id).await?)
    }

    /// The calling assessee's own assessments.
    pub async fn list_mine(&self, principal: &Principal) -> Result<Vec<Assessment>, ServiceError> {
        let profile = self.ownership.own_profile(principal).await?;
        Ok(self.stores.assessments.list_assessments_by_assessee(profile.id).await?)
    }
}
