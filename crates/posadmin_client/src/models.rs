//! Wire models of the identity REST surface, as the console sees them.

use serde::{Deserialize, Serialize};

/// Success/failure envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult<T> {
    pub succeeded: bool,
    #[serde(default)]
    pub messages: Vec<String>,
    pub data: Option<T>,
}

/// One page of items plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub succeeded: bool,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// List/filter parameters for `get_users`; unset, blank and zero values are
/// left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserParams {
    pub search_string: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
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
    /// Unix epoch milliseconds; server-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<i64>,
}

fn active_by_default() -> bool {
    true
}

impl User {
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
            created_on: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleClaim {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub role_id: String,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

/// Permission selection of one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub role_id: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(default)]
    pub role_claims: Vec<RoleClaim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    #[serde(default)]
    pub role_id: String,
    pub role_name: String,
    #[serde(default)]
    pub role_description: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoles {
    pub user_roles: Vec<UserRole>,
}
