//! Role entity and the fixed set of system roles.

use super::normalize_key;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable role identifier (UUID v4 text).
pub type RoleId = String;

pub const SUPER_ADMIN_ROLE: &str = "SuperAdmin";
pub const ADMIN_ROLE: &str = "Admin";
pub const STAFF_ROLE: &str = "Staff";

const DEFAULT_ROLES: &[&str] = &[SUPER_ADMIN_ROLE, ADMIN_ROLE, STAFF_ROLE];
const ROLE_NAME_MAX_CHARS: usize = 256;

/// Named permission bundle assigned to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    /// Upper-cased, trimmed `name`; unique across roles.
    pub normalized_name: String,
    pub description: Option<String>,
}

impl Role {
    /// Creates a role with a freshly generated id.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, description)
    }

    pub fn with_id(id: RoleId, name: impl Into<String>, description: Option<String>) -> Self {
        let name = name.into().trim().to_string();
        Self {
            id,
            normalized_name: normalize_key(&name),
            name,
            description,
        }
    }

    /// Renames the role, keeping `normalized_name` in step.
    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.normalized_name = normalize_key(&self.name);
    }

    pub fn validate(&self) -> Result<(), RoleValidationError> {
        if self.name.trim().is_empty() {
            return Err(RoleValidationError::BlankName);
        }
        let chars = self.name.chars().count();
        if chars > ROLE_NAME_MAX_CHARS {
            return Err(RoleValidationError::NameTooLong { chars });
        }
        Ok(())
    }

    /// Whether this is one of the system roles that cannot be renamed or deleted.
    pub fn is_default(&self) -> bool {
        is_default_role(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleValidationError {
    BlankName,
    NameTooLong { chars: usize },
}

impl Display for RoleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "Role name is required."),
            Self::NameTooLong { chars } => write!(
                f,
                "Role name must be at most {ROLE_NAME_MAX_CHARS} characters, got {chars}."
            ),
        }
    }
}

impl Error for RoleValidationError {}

/// System roles seeded on first start.
pub fn default_roles() -> &'static [&'static str] {
    DEFAULT_ROLES
}

pub fn is_default_role(name: &str) -> bool {
    let key = normalize_key(name);
    DEFAULT_ROLES.iter().any(|role| normalize_key(role) == key)
}

pub fn is_super_admin(name: &str) -> bool {
    normalize_key(name) == normalize_key(SUPER_ADMIN_ROLE)
}
