use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lsp_core::UserId;

use crate::Role;

/// Session-token claims.
///
/// Timestamps travel as the registered `iat` / `exp` claims (seconds since
/// the epoch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
    pub role: Role,

    /// Issued-at timestamp.
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token signed with an unexpected algorithm")]
    UnexpectedAlgorithm,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature and algorithm checks happen in [`crate::token`]; this only
/// looks at the claims against the supplied clock.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims(iat: DateTime<Utc>, exp: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            user_id: UserId::new(),
            email: "a@example.com".to_string(),
            username: "a".to_string(),
            role: Role::Assessee,
            issued_at: iat,
            expires_at: exp,
        }
    }

    #[test]
    fn window_checks() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = claims(t0, t0 + Duration::hours(1));

        assert_eq!(validate_claims(&c, t0 + Duration::minutes(5)), Ok(()));
        assert_eq!(
            validate_claims(&c, t0 - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&c, t0 + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims(t0, t0), t0),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn serializes_registered_claim_names() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(claims(t0, t0 + Duration::hours(1))).unwrap();
        assert_eq!(json["iat"], t0.timestamp());
        assert_eq!(json["exp"], (t0 + Duration::hours(1)).timestamp());
        assert_eq!(json["role"], "Asesi");
        assert!(json["user_id"].is_string());
    }
}
