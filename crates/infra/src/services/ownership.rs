//! Ownership resolution.
//!
//! Forms and assessments are owned transitively: form -> assessment ->
//! assessee profile -> user. The resolver walks that chain through the
//! stores and hands the owner's user id to the pure decision in `lsp-auth`.
//! A missing link anywhere after the assessment yields no owner, which the
//! decision denies for assessees.

use tracing::instrument;

use lsp_assessment::{Assessee, Assessment};
use lsp_auth::{Principal, Role, ensure_access, require_role};
use lsp_core::{AssesseeId, AssessmentId, UserId};

use super::{Found, ServiceError};
use crate::store::Stores;

#[derive(Clone)]
pub struct OwnershipResolver {
    stores: Stores,
}

impl OwnershipResolver {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// The user behind an assessee reference, if both exist.
    pub async fn owner_of(&self, assessee: Option<AssesseeId>) -> Result<Option<UserId>, ServiceError> {
        let Some(id) = assessee else {
            return Ok(None);
        };
        Ok(self.stores.assessees.find_assessee(id).await?.map(|a| a.user_id))
    }

    /// Check `principal` against an already loaded assessment.
    pub async fn authorize(&self, principal: &Principal, assessment: &Assessment) -> Result<(), ServiceError> {
        let owner = self.owner_of(assessment.assessee_id).await?;
        ensure_access(principal, owner)?;
        Ok(())
    }

    /// Load an assessment (`NotFound` first) and check ownership.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id, role = %principal.role))]
    pub async fn assessment(&self, principal: &Principal, id: AssessmentId) -> Result<Assessment, ServiceError> {
        let assessment = self
            .stores
            .assessments
            .find_assessment(id)
            .await
            .or_not_found("asesmen")?;
        self.authorize(principal, &assessment).await?;
        Ok(assessment)
    }

    /// Gate a query filtered by assessee.
    ///
    /// Staff asking about an unknown assessee get `NotFound`; an assessee
    /// asking about one is denied like any other foreign owner.
    pub async fn assessee(&self, principal: &Principal, id: AssesseeId) -> Result<Assessee, ServiceError> {
        match self.stores.assessees.find_assessee(id).await? {
            Some(profile) => {
                ensure_access(principal, Some(profile.user_id))?;
                Ok(profile)
            }
            None => {
                ensure_access(principal, None)?;
                Err(ServiceError::not_found("asesi"))
            }
        }
    }

    /// The caller's own assessee profile.
    pub async fn own_profile(&self, principal: &Principal) -> Result<Assessee, ServiceError> {
        require_role(principal, &[Role::Assessee])?;
        self.stores
            .assessees
            .find_assessee_by_user(principal.user_id)
            .await
            .or_not_found("asesi profile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    #[tokio::test]
    async fn owner_passes_and_other_assessee_is_forbidden() {
        let (_services, stores) = testing::services();
        let resolver = OwnershipResolver::new(stores.clone());
        let (alice, alice_profile) = testing::assessee(&stores, "alice").await;
        let (bob, _) = testing::assessee(&stores, "bob").await;
        let assessment = testing::assessment_for(&stores, &alice_profile).await;

        assert!(resolver.assessment(&alice, assessment.id).await.is_ok());
        assert!(matches!(
            resolver.assessment(&bob, assessment.id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn staff_pass_for_any_owner() {
        let (_services, stores) = testing::services();
        let resolver = OwnershipResolver::new(stores.clone());
        let (_, profile) = testing::assessee(&stores, "carol").await;
        let assessment = testing::assessment_for(&stores, &profile).await;

        for staff in [testing::admin(), testing::assessor()] {
            assert!(resolver.assessment(&staff, assessment.id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn missing_assessment_is_not_found_before_ownership() {
        let (_services, stores) = testing::services();
        let resolver = OwnershipResolver::new(stores.clone());
        let (alice, _) = testing::assessee(&stores, "alice").await;

        assert!(matches!(
            resolver.assessment(&alice, AssessmentId::new()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn dangling_assessee_link_fails_closed() {
        let (_services, stores) = testing::services();
        let resolver = OwnershipResolver::new(stores.clone());
        let (alice, _) = testing::assessee(&stores, "alice").await;
        let orphan = Assessee::new(UserId::new(), "ghost", "ghost@example.com", chrono::Utc::now());
        let assessment = testing::assessment_for(&stores, &orphan).await;

        assert!(matches!(
            resolver.assessment(&alice, assessment.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(resolver.assessment(&testing::admin(), assessment.id).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_assessee_filter() {
        let (_services, stores) = testing::services();
        let resolver = OwnershipResolver::new(stores.clone());
        let (alice, _) = testing::assessee(&stores, "alice").await;
        let unknown = AssesseeId::new();

        assert!(matches!(
            resolver.assessee(&alice, unknown).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            resolver.assessee(&testing::admin(), unknown).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
