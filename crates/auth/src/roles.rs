use core::str::FromStr;

use serde::{Deserialize, Serialize};

use lsp_core::DomainError;

/// Role of a user account.
///
/// Wire names follow the stored enum (`Admin`, `Asesor`, `Asesi`); the English
/// spellings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Asesor", alias = "Assessor")]
    Assessor,
    #[serde(rename = "Asesi", alias = "Assessee")]
    Assessee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Assessor => "Asesor",
            Role::Assessee => "Asesi",
        }
    }

    /// Staff roles act on any assessment or form.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Assessor)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Admin" | "admin" => Ok(Role::Admin),
            "Asesor" | "asesor" | "Assessor" | "assessor" => Ok(Role::Assessor),
            "Asesi" | "asesi" | "Assessee" | "assessee" => Ok(Role::Assessee),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_round_trip() {
        for role in [Role::Admin, Role::Assessor, Role::Assessee] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn english_alias_accepted_in_json() {
        let role: Role = serde_json::from_str("\"Assessee\"").unwrap();
        assert_eq!(role, Role::Assessee);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"Asesi\"");
    }

    #[test]
    fn unknown_role_rejected() {
        assert!("Root".parse::<Role>().is_err());
    }
}
