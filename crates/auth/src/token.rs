//! HS256 session tokens.
//!
//! Issuing and validation sit behind two small traits so the HTTP layer can
//! hold an `Arc<dyn JwtValidator>` and services an `Arc<dyn TokenIssuer>`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use thiserror::Error;

use crate::{TokenClaims, TokenValidationError, User, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("token lifetime overflows the expiry timestamp")]
    ExpiryOverflow,
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs session tokens for authenticated users.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenValidationError>;
}

/// Shared-secret HS256 implementation of both token traits.
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn validation() -> Validation {
        // Only HS256 is accepted; expiry is checked by `validate_claims`
        // against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl TokenIssuer for Hs256TokenService {
    fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or(TokenError::ExpiryOverflow)?;
        let claims = TokenClaims {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            issued_at: now,
            expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at,
        })
    }
}

impl JwtValidator for Hs256TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenValidationError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &Self::validation()).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidAlgorithm => TokenValidationError::UnexpectedAlgorithm,
                ErrorKind::InvalidSignature => TokenValidationError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenValidationError::Expired,
                _ => TokenValidationError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    const SECRET: &[u8] = b"token-test-secret";

    fn service() -> Hs256TokenService {
        Hs256TokenService::new(SECRET, Duration::hours(24))
    }

    fn user() -> User {
        User::new("budi", "budi@example.com", "hash", Role::Assessee, Utc::now())
    }

    #[test]
    fn issued_token_validates_with_same_claims() {
        let svc = service();
        let u = user();
        let now = Utc::now();
        let issued = svc.issue(&u, now).unwrap();

        let claims = svc.validate(&issued.token, now).unwrap();
        assert_eq!(claims.user_id, u.id);
        assert_eq!(claims.email, "budi@example.com");
        assert_eq!(claims.username, "budi");
        assert_eq!(claims.role, Role::Assessee);
    }

    #[test]
    fn expired_token_rejected() {
        let svc = service();
        let now = Utc::now();
        let issued = svc.issue(&user(), now).unwrap();

        let later = now + Duration::hours(25);
        assert_eq!(svc.validate(&issued.token, later), Err(TokenValidationError::Expired));
    }

    #[test]
    fn unexpected_algorithm_rejected() {
        let svc = service();
        let now = Utc::now();
        let claims = TokenClaims {
            user_id: lsp_core::UserId::new(),
            email: "x@example.com".to_string(),
            username: "x".to_string(),
            role: Role::Admin,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            svc.validate(&token, now),
            Err(TokenValidationError::UnexpectedAlgorithm)
        );
    }

    #[test]
    fn unsigned_token_rejected() {
        // {"alg":"none","typ":"JWT"} . {"sub":"x"} . (no signature)
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiJ4In0.";
        assert!(service().validate(token, Utc::now()).is_err());
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let other = Hs256TokenService::new(b"another-secret", Duration::hours(1));
        let now = Utc::now();
        let issued = other.issue(&user(), now).unwrap();

        assert_eq!(
            service().validate(&issued.token, now),
            Err(TokenValidationError::InvalidSignature)
        );
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let svc = Hs256TokenService::new(SECRET, Duration::MAX);
        assert!(matches!(svc.issue(&user(), Utc::now()), Err(TokenError::ExpiryOverflow)));
    }
}
