//! Role claims: key/value permission grants attached to a role.

use super::role::RoleId;
use serde::{Deserialize, Serialize};

/// Claim type string used for permission grants.
pub const PERMISSION_CLAIM_TYPE: &str = "Permission";

/// Stored role claim row.
///
/// A role holds at most one claim per `(claim_type, claim_value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaim {
    /// Storage-assigned id; `0` until persisted.
    pub id: i64,
    pub role_id: RoleId,
    pub claim_type: String,
    pub claim_value: String,
    pub description: Option<String>,
    pub group: Option<String>,
}

impl RoleClaim {
    /// Unsaved permission claim for `role_id`.
    pub fn permission(role_id: impl Into<RoleId>, value: impl Into<String>) -> Self {
        Self {
            id: 0,
            role_id: role_id.into(),
            claim_type: PERMISSION_CLAIM_TYPE.to_string(),
            claim_value: value.into(),
            description: None,
            group: None,
        }
    }

    pub fn matches(&self, claim_type: &str, claim_value: &str) -> bool {
        self.claim_type == claim_type && self.claim_value == claim_value
    }
}
