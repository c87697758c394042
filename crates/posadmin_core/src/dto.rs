//! Request and response shapes exchanged with the admin console.
//!
//! All shapes serialize as camelCase JSON.

use crate::model::claim::{RoleClaim, PERMISSION_CLAIM_TYPE};
use crate::model::role::Role;
use crate::model::user::User;
use serde::{Deserialize, Serialize};

/// Create (no `id`) or update (with `id`) a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl RoleRequest {
    /// Blank ids count as absent.
    pub fn existing_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleClaimRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub role_id: String,
    #[serde(rename = "type", default = "permission_type")]
    pub claim_type: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

fn permission_type() -> String {
    PERMISSION_CLAIM_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleClaimResponse {
    pub id: i64,
    pub role_id: String,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub selected: bool,
}

impl From<RoleClaim> for RoleClaimResponse {
    fn from(claim: RoleClaim) -> Self {
        Self {
            id: claim.id,
            role_id: claim.role_id,
            claim_type: claim.claim_type,
            value: claim.claim_value,
            description: claim.description,
            group: claim.group,
            selected: true,
        }
    }
}

/// Full permission selection for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    pub role_id: String,
    #[serde(default)]
    pub role_claims: Vec<RoleClaimRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub role_id: String,
    pub role_name: String,
    pub role_claims: Vec<RoleClaimResponse>,
}

/// Create (no `id`) or update (with `id`) a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub email_confirmed: bool,
}

fn active_by_default() -> bool {
    true
}

impl UserRequest {
    pub fn new(user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            user_name: user_name.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            is_active: true,
            email_confirmed: false,
        }
    }

    /// Blank ids count as absent.
    pub fn existing_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Copies every editable field onto `user`.
    pub fn apply_to(&self, user: &mut User) {
        user.set_user_name(&self.user_name);
        user.set_email(&self.email);
        user.first_name = non_blank(self.first_name.as_deref());
        user.last_name = non_blank(self.last_name.as_deref());
        user.phone_number = non_blank(self.phone_number.as_deref());
        user.is_active = self.is_active;
        user.email_confirmed = self.email_confirmed;
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub created_on: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            is_active: user.is_active,
            email_confirmed: user.email_confirmed,
            created_on: user.created_on_ms,
        }
    }
}

/// List/filter parameters, as sent in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    #[serde(default)]
    pub search_string: Option<String>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Comma-separated `<field> [asc|desc]` list.
    #[serde(default)]
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleModel {
    #[serde(default)]
    pub role_id: String,
    pub role_name: String,
    #[serde(default)]
    pub role_description: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRolesRequest {
    pub user_roles: Vec<UserRoleModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRolesResponse {
    pub user_roles: Vec<UserRoleModel>,
}

#[cfg(test)]
mod tests {
    use super::{PermissionRequest, RoleRequest, UserRequest};
    use crate::model::user::User;

    #[test]
    fn blank_ids_are_treated_as_absent() {
        let request = RoleRequest {
            id: Some("  ".to_string()),
            name: "Cashier".to_string(),
            description: None,
        };
        assert_eq!(request.existing_id(), None);
    }

    #[test]
    fn permission_request_defaults_claim_type() {
        let request: PermissionRequest = serde_json::from_str(
            r#"{"roleId":"r1","roleClaims":[{"value":"Permissions.Roles.View","selected":true}]}"#,
        )
        .unwrap();
        assert_eq!(request.role_claims[0].claim_type, "Permission");
        assert_eq!(request.role_claims[0].id, 0);
    }

    #[test]
    fn apply_to_drops_blank_optional_fields() {
        let mut request = UserRequest::new("jdoe", "jdoe@example.com");
        request.first_name = Some("  ".to_string());
        request.last_name = Some(" Doe ".to_string());
        let mut user = User::new("old", "old@example.com");
        request.apply_to(&mut user);
        assert_eq!(user.user_name, "jdoe");
        assert_eq!(user.first_name, None);
        assert_eq!(user.last_name.as_deref(), Some("Doe"));
    }
}
