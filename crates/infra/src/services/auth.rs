//! Registration, login and profile lookup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use lsp_assessment::{Assessee, Assessor};
use lsp_auth::{
    ProfileRef, Principal, Role, TokenIssuer, User, hash_password, normalize_email,
    validate_email, validate_registration,
};

use super::{Found, ServiceError, discard_account};
use crate::store::Stores;

/// Self-service sign-up request. New accounts are always assessees.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// A user together with the profile its back-reference points at.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asesi: Option<Assessee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asesor: Option<Assessor>,
}

#[derive(Clone)]
pub struct AuthService {
    stores: Stores,
    tokens: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(stores: Stores, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { stores, tokens }
    }

    /// Create an assessee account and its (mostly empty) profile.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: Registration) -> Result<User, ServiceError> {
        validate_registration(&input.username, &input.email, &input.password)?;

        if self.stores.users.find_user_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::conflict("user with this email already exists"));
        }
        if self
            .stores
            .users
            .find_user_by_username(input.username.trim())
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict("username already taken"));
        }

        let now = Utc::now();
        let hash = hash_password(&input.password)?;
        let mut user = User::new(&input.username, &input.email, hash, Role::Assessee, now);
        self.stores.users.insert_user(&user).await?;

        let profile = Assessee::new(user.id, user.username.clone(), user.email.clone(), now);
        if let Err(err) = self.stores.assessees.insert_assessee(&profile).await {
            discard_account(&self.stores, user.id).await;
            return Err(err.into());
        }

        user.link_assessee(profile.id, now);
        if let Err(err) = self.stores.users.update_user(&user).await {
            discard_account(&self.stores, user.id).await;
            return Err(err.into());
        }

        info!(user_id = %user.id, assessee_id = %profile.id, "assessee registered");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// `expected` restricts the login to one role; a mismatch is reported
    /// separately from bad credentials.
    #[instrument(skip(self, password), fields(email = %normalize_email(email)))]
    pub async fn login(&self, email: &str, password: &str, expected: Option<Role>) -> Result<Session, ServiceError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::validation("email and password are required"));
        }

        let Some(mut user) = self.stores.users.verify_credentials(email, password).await? else {
            warn!("login rejected: invalid credentials");
            return Err(ServiceError::unauthorized("invalid email or password"));
        };

        if let Some(role) = expected {
            if user.role != role {
                warn!(user_id = %user.id, role = %user.role, expected = %role, "login rejected: role mismatch");
                return Err(ServiceError::unauthorized("unauthorized access"));
            }
        }
        if !user.is_active() {
            warn!(user_id = %user.id, "login rejected: inactive account");
            return Err(ServiceError::unauthorized("account is inactive"));
        }

        let now = Utc::now();
        user.record_login(now);
        self.stores.users.update_user(&user).await?;

        let issued = self.tokens.issue(&user, now)?;
        info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok(Session {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    /// The caller's account and linked profile.
    pub async fn profile(&self, principal: &Principal) -> Result<Profile, ServiceError> {
        let user = self
            .stores
            .users
            .find_user(principal.user_id)
            .await
            .or_not_found("user")?;

        let (asesi, asesor) = match user.profile() {
            Some(ProfileRef::Assessee(id)) => (self.stores.assessees.find_assessee(id).await?, None),
            Some(ProfileRef::Assessor(id)) => (None, self.stores.assessors.find_assessor(id).await?),
            None => (None, None),
        };
        Ok(Profile { user, asesi, asesor })
    }

    /// Make sure an admin account with `email` exists. Returns the account
    /// only when it was created by this call.
    #[instrument(skip(self, password))]
    pub async fn seed_admin(&self, username: &str, email: &str, password: &str) -> Result<Option<User>, ServiceError> {
        validate_email(email)?;
        if self.stores.users.find_user_by_email(email).await?.is_some() {
            return Ok(None);
        }
        validate_registration(username, email, password)?;

        let user = User::new(username, email, hash_password(password)?, Role::Admin, Utc::now());
        self.stores.users.insert_user(&user).await?;
        info!(user_id = %user.id, "admin account seeded");
        Ok(Some(user))
    }
}
