//! Ownership and role checks.
//!
//! Every assessment and form is owned, through its assessment's assessee, by
//! exactly one user account. Staff roles (admin, assessor) act on any record;
//! an assessee acts only on records they own.
//!
//! - No IO
//! - No panics
//! - Pure decisions over [`Role`] and [`UserId`]

use serde::Serialize;
use thiserror::Error;

use lsp_core::UserId;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller is an assessee and does not own the resource.
    #[error("forbidden: resource belongs to another user")]
    NotOwner,

    /// The resource has no linked assessee, so nobody can be proven to own it.
    #[error("forbidden: resource has no owner")]
    NoOwner,

    #[error("forbidden: role '{role}' may not perform this action")]
    InsufficientRole { role: Role },
}

/// Outcome of an ownership check, with the reason attached for audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Admin or assessor; ownership is not consulted.
    GrantedStaff,
    /// The caller is the assessee who owns the resource.
    GrantedOwner,
    /// The resource belongs to a different user.
    DeniedNotOwner,
    /// The ownership chain is broken (no linked assessee).
    DeniedNoOwner,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::GrantedStaff | AccessDecision::GrantedOwner)
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            AccessDecision::GrantedStaff | AccessDecision::GrantedOwner => Ok(()),
            AccessDecision::DeniedNotOwner => Err(AuthzError::NotOwner),
            AccessDecision::DeniedNoOwner => Err(AuthzError::NoOwner),
        }
    }
}

/// Decide whether `actor` (acting as `role`) may act on a resource owned by `owner`.
///
/// `owner` is `None` when the resource's assessee relation is absent; an
/// assessee is denied in that case.
pub fn decide_access(actor: UserId, role: Role, owner: Option<UserId>) -> AccessDecision {
    if role.is_staff() {
        return AccessDecision::GrantedStaff;
    }

    match owner {
        Some(owner) if owner == actor => AccessDecision::GrantedOwner,
        Some(_) => AccessDecision::DeniedNotOwner,
        None => AccessDecision::DeniedNoOwner,
    }
}

/// Boolean form of [`decide_access`].
pub fn can_access(actor: UserId, role: Role, owner: Option<UserId>) -> bool {
    decide_access(actor, role, owner).is_granted()
}

/// Ownership check for an authenticated principal.
pub fn ensure_access(principal: &Principal, owner: Option<UserId>) -> Result<(), AuthzError> {
    let decision = decide_access(principal.user_id, principal.role, owner);
    if !decision.is_granted() {
        tracing::warn!(
            user_id = %principal.user_id,
            role = %principal.role,
            decision = ?decision,
            "ownership check denied"
        );
    }
    decision.into_result()
}

/// Role gate for staff-only operations.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole { role: principal.role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn user(n: u128) -> UserId {
        UserId::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn assessee_owner_is_granted() {
        let me = user(1);
        assert_eq!(decide_access(me, Role::Assessee, Some(me)), AccessDecision::GrantedOwner);
    }

    #[test]
    fn assessee_without_owner_is_denied() {
        assert_eq!(
            decide_access(user(1), Role::Assessee, None),
            AccessDecision::DeniedNoOwner
        );
        assert!(!can_access(user(1), Role::Assessee, None));
    }

    #[test]
    fn staff_pass_even_without_owner() {
        assert!(can_access(user(1), Role::Admin, None));
        assert!(can_access(user(1), Role::Assessor, None));
    }

    #[test]
    fn ensure_access_maps_denials_to_errors() {
        let principal = Principal::new(user(1), Role::Assessee);
        assert_eq!(ensure_access(&principal, Some(user(2))), Err(AuthzError::NotOwner));
        assert_eq!(ensure_access(&principal, None), Err(AuthzError::NoOwner));
        assert_eq!(ensure_access(&principal, Some(user(1))), Ok(()));
    }

    #[test]
    fn require_role_rejects_roles_outside_the_list() {
        let assessor = Principal::new(user(3), Role::Assessor);
        assert!(require_role(&assessor, &[Role::Admin, Role::Assessor]).is_ok());
        assert_eq!(
            require_role(&assessor, &[Role::Admin]),
            Err(AuthzError::InsufficientRole { role: Role::Assessor })
        );
    }

    proptest! {
        #[test]
        fn assessee_denied_for_foreign_owner(actor in any::<u128>(), owner in any::<u128>()) {
            prop_assume!(actor != owner);
            prop_assert!(!can_access(user(actor), Role::Assessee, Some(user(owner))));
        }

        #[test]
        fn staff_always_granted(actor in any::<u128>(), owner in proptest::option::of(any::<u128>()), admin in any::<bool>()) {
            let role = if admin { Role::Admin } else { Role::Assessor };
            prop_assert!(can_access(user(actor), role, owner.map(user)));
        }
    }
}
