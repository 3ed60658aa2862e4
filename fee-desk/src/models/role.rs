use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of the operator collecting the fee, as asserted by the auth context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Center,
    Incharge,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Center => "center",
            Role::Incharge => "incharge",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "center" => Ok(Role::Center),
            "incharge" => Ok(Role::Incharge),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
