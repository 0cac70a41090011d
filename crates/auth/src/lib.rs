//! `lsp-auth`: authentication/authorization boundary.
//!
//! Roles, the ownership decision, session-token claims and signing, password
//! hashing and the user account record. This crate is decoupled from HTTP
//! and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{AccessDecision, AuthzError, can_access, decide_access, ensure_access, require_role};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use roles::Role;
pub use token::{Hs256TokenService, IssuedToken, JwtValidator, TokenError, TokenIssuer};
pub use user::{
    MIN_PASSWORD_LEN, ProfileRef, User, UserStatus, normalize_email, validate_email,
    validate_registration,
};
