use serde::{Deserialize, Serialize};

use lsp_core::UserId;

use crate::{Role, TokenClaims};

/// An authenticated caller, as established from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub email: String,
    pub username: String,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            email: String::new(),
            username: String::new(),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
            email: claims.email,
            username: claims.username,
        }
    }
}
