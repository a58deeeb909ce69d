use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AccessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    EditTournament,
    UpdateMatch,
    ViewScores,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            Role::Admin => true,
            Role::Viewer => permission == Permission::ViewScores,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Whoever is calling into the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn admin() -> Self {
        Self::new("admin", Role::Admin)
    }

    pub fn viewer() -> Self {
        Self::new("viewer", Role::Viewer)
    }

    /// Admin when the bearer token equals the configured admin token.
    pub fn from_bearer(token: Option<&str>, admin_token: Option<&str>) -> Self {
        match (token, admin_token) {
            (Some(token), Some(expected)) if token == expected => Self::admin(),
            _ => Self::viewer(),
        }
    }
}

pub fn require(principal: &Principal, permission: Permission, action: &str) -> Result<(), AccessError> {
    if principal.role.allows(permission) {
        Ok(())
    } else {
        log::warn!("{} ({}) denied: {}", principal.name, principal.role, action);
        Err(AccessError::Forbidden {
            role: principal.role.to_string(),
            action: action.to_string(),
        })
    }
}
