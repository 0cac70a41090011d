//! Assessor profiles and their login accounts (admin-managed).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use lsp_assessment::{Assessor, AssessorPatch, NewAssessor};
use lsp_auth::{
    Principal, Role, User, hash_password, normalize_email, require_role, validate_email,
    validate_registration,
};
use lsp_core::{AssessorId, CompetencyId};

use super::{Found, ServiceError, discard_account};
use crate::store::{StoreError, Stores};

const STAFF: &[Role] = &[Role::Admin, Role::Assessor];

#[derive(Clone)]
pub struct AssessorService {
    stores: Stores,
}

impl AssessorService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Resolve competency ids to their codes, keeping the caller's order.
    /// Every id must exist.
    async fn competency_codes(&self, ids: &[CompetencyId]) -> Result<Vec<String>, ServiceError> {
        let mut seen = HashSet::new();
        let unique: Vec<CompetencyId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let found: HashMap<CompetencyId, String> = self
            .stores
            .catalog
            .find_competencies(&unique)
            .await?
            .into_iter()
            .map(|c| (c.id, c.code))
            .collect();
        if found.len() != unique.len() {
            return Err(ServiceError::validation("one or more kompetensi not found"));
        }
        Ok(unique.iter().filter_map(|id| found.get(id).cloned()).collect())
    }

    /// Create the assessor's user account and profile.
    #[instrument(skip(self, principal, input), fields(no_registrasi = %input.registration_number))]
    pub async fn create(&self, principal: &Principal, input: NewAssessor) -> Result<Assessor, ServiceError> {
        require_role(principal, &[Role::Admin])?;
        input.validate()?;
        let login_name = input.login_name();
        validate_registration(&login_name, &input.email, &input.password)?;

        if self
            .stores
            .assessors
            .find_assessor_by_registration(&input.registration_number)
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict(
                "asesor with this registration number already exists",
            ));
        }
        let competencies = self.competency_codes(&input.competency_ids).await?;

        let now = Utc::now();
        let mut user = User::new(login_name, &input.email, hash_password(&input.password)?, Role::Assessor, now);
        self.stores.users.insert_user(&user).await?;

        let assessor = Assessor::new(user.id, &input, competencies, now);
        if let Err(err) = self.stores.assessors.insert_assessor(&assessor).await {
            discard_account(&self.stores, user.id).await;
            return Err(err.into());
        }

        user.link_assessor(assessor.id, now);
        if let Err(err) = self.stores.users.update_user(&user).await {
            discard_account(&self.stores, user.id).await;
            return Err(err.into());
        }

        info!(assessor_id = %assessor.id, user_id = %user.id, "assessor created");
        Ok(assessor)
    }

    #[instrument(skip(self, principal, patch))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: AssessorId,
        patch: AssessorPatch,
    ) -> Result<Assessor, ServiceError> {
        require_role(principal, &[Role::Admin])?;
        let mut assessor = self.stores.assessors.find_assessor(id).await.or_not_found("asesor")?;

        if let Some(number) = patch.registration_number.as_deref() {
            if let Some(other) = self.stores.assessors.find_assessor_by_registration(number).await? {
                if other.id != assessor.id {
                    return Err(ServiceError::conflict(
                        "registration number already used by another asesor",
                    ));
                }
            }
        }
        let competencies = match patch.competency_ids.as_deref() {
            Some(ids) => Some(self.competency_codes(ids).await?),
            None => None,
        };

        let mut patch = patch;
        patch.email = patch.email.as_deref().map(normalize_email);
        let now = Utc::now();
        if let Some(email) = patch.email.as_deref().filter(|e| *e != assessor.email) {
            validate_email(email)?;
            self.move_login_email(&assessor, email, now).await?;
        }

        assessor.apply(patch, competencies, now);
        self.stores.assessors.update_assessor(&assessor).await?;
        info!(assessor_id = %assessor.id, "assessor updated");
        Ok(assessor)
    }

    /// Keep the account's login email in step with the profile.
    async fn move_login_email(&self, assessor: &Assessor, email: &str, now: DateTime<Utc>) -> Result<(), ServiceError> {
        if let Some(other) = self.stores.users.find_user_by_email(email).await? {
            if other.id != assessor.user_id {
                return Err(ServiceError::conflict("user with this email already exists"));
            }
        }
        let Some(mut user) = self.stores.users.find_user(assessor.user_id).await? else {
            warn!(assessor_id = %assessor.id, user_id = %assessor.user_id, "asesor has no login account");
            return Ok(());
        };
        user.email = email.to_string();
        user.updated_at = now;
        self.stores.users.update_user(&user).await?;
        Ok(())
    }

    /// Remove the profile and the account behind it.
    #[instrument(skip(self, principal))]
    pub async fn delete(&self, principal: &Principal, id: AssessorId) -> Result<(), ServiceError> {
        require_role(principal, &[Role::Admin])?;
        let assessor = self.stores.assessors.find_assessor(id).await.or_not_found("asesor")?;

        self.stores.assessors.delete_assessor(id).await?;
        match self.stores.users.delete_user(assessor.user_id).await {
            Ok(()) | Err(StoreError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }
        info!(assessor_id = %id, "assessor deleted");
        Ok(())
    }

    pub async fn get(&self, principal: &Principal, id: AssessorId) -> Result<Assessor, ServiceError> {
        require_role(principal, STAFF)?;
        self.stores.assessors.find_assessor(id).await.or_not_found("asesor")
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<Assessor>, ServiceError> {
        require_role(principal, STAFF)?;
        Ok(self.stores.assessors.list_assessors().await?)
    }

    pub async fn by_registration(&self, principal: &Principal, number: &str) -> Result<Assessor, ServiceError> {
        require_role(principal, STAFF)?;
        self.stores
            .assessors
            .find_assessor_by_registration(number)
            .await
            .or_not_found("asesor")
    }
}
