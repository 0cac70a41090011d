//! User account record.
//!
//! A user carries one role and, for assessors and assessees, a back-reference
//! to the profile record describing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lsp_core::{AssesseeId, AssessorId, DomainError, UserId};

use crate::Role;

/// Minimum accepted password length on registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// User is active and can authenticate.
    #[default]
    Active,
    /// User is deactivated and cannot authenticate.
    Inactive,
}

impl UserStatus {
    pub fn from_active_flag(is_active: bool) -> Self {
        if is_active { Self::Active } else { Self::Inactive }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, UserStatus::Active)
    }
}

/// Typed view of a user's profile back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileRef {
    Assessor(AssessorId),
    Assessee(AssesseeId),
}

/// User account.
///
/// # Invariants
/// - `email` is trimmed and lower-cased.
/// - `password_hash` is never serialized.
/// - `related_id` points at an assessor profile for `Role::Assessor` and an
///   assessee profile for `Role::Assessee`; admins have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    #[serde(rename = "id_related", skip_serializing_if = "Option::is_none")]
    pub related_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(rename = "is_active", serialize_with = "serialize_status")]
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn serialize_status<S: serde::Serializer>(status: &UserStatus, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_bool(status.is_active())
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into().trim().to_string(),
            email: normalize_email(&email.into()),
            password_hash: password_hash.into(),
            role,
            related_id: None,
            last_login: None,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> Option<ProfileRef> {
        let id = self.related_id?;
        match self.role {
            Role::Assessor => Some(ProfileRef::Assessor(AssessorId::from_uuid(id))),
            Role::Assessee => Some(ProfileRef::Assessee(AssesseeId::from_uuid(id))),
            Role::Admin => None,
        }
    }

    pub fn link_assessee(&mut self, id: AssesseeId, now: DateTime<Utc>) {
        self.related_id = Some(*id.as_uuid());
        self.updated_at = now;
    }

    pub fn link_assessor(&mut self, id: AssessorId, now: DateTime<Utc>) {
        self.related_id = Some(*id.as_uuid());
        self.updated_at = now;
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
        self.updated_at = now;
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check a registration triple before anything is hashed or stored.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::validation("username is required"));
    }
    validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Basic shape check: one `@` with non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation("invalid email format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_email() {
        let user = User::new(" alice ", " Alice@Example.COM ", "h", Role::Assessee, Utc::now());
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.username, "alice");
        assert!(user.is_active());
    }

    #[test]
    fn profile_follows_role() {
        let now = Utc::now();
        let mut assessee = User::new("a", "a@example.com", "h", Role::Assessee, now);
        assert_eq!(assessee.profile(), None);

        let profile = AssesseeId::new();
        assessee.link_assessee(profile, now);
        assert_eq!(assessee.profile(), Some(ProfileRef::Assessee(profile)));

        let mut admin = User::new("root", "root@example.com", "h", Role::Admin, now);
        admin.related_id = Some(Uuid::now_v7());
        assert_eq!(admin.profile(), None);
    }

    #[test]
    fn serialization_hides_password_hash() {
        let user = User::new("a", "a@example.com", "secret-hash", Role::Assessee, Utc::now());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["is_active"], true);
        assert_eq!(json["role"], "Asesi");
    }

    #[test]
    fn registration_validation() {
        assert!(validate_registration("budi", "budi@example.com", "123456").is_ok());
        assert!(validate_registration("", "budi@example.com", "123456").is_err());
        assert!(validate_registration("budi", "budi.example.com", "123456").is_err());
        assert!(validate_registration("budi", "budi@example", "123456").is_err());
        assert!(validate_registration("budi", "budi@example.com", "12345").is_err());
    }
}
