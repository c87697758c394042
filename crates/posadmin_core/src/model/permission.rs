//! Static permission catalog.
//!
//! Every permission is a `Permission` claim whose value follows
//! `Permissions.<Module>.<Action>`. The catalog order is module-major and
//! action-minor, and stays stable across releases so clients can render it
//! as-is.

use super::claim::PERMISSION_CLAIM_TYPE;

const MODULES: &[&str] = &[
    "Brands",
    "Categories",
    "Products",
    "Customers",
    "Carts",
    "Sales",
    "Stocks",
    "Users",
    "Roles",
    "RoleClaims",
];

const ACTIONS: &[&str] = &["View", "Create", "Edit", "Delete", "Search"];

pub const ROLES_VIEW: &str = "Permissions.Roles.View";
pub const ROLE_CLAIMS_VIEW: &str = "Permissions.RoleClaims.View";
pub const ROLE_CLAIMS_EDIT: &str = "Permissions.RoleClaims.Edit";

/// Permissions the super-administrator role may never lose.
pub const SUPER_ADMIN_REQUIRED: [&str; 3] = [ROLES_VIEW, ROLE_CLAIMS_VIEW, ROLE_CLAIMS_EDIT];

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDefinition {
    pub claim_type: &'static str,
    pub value: String,
    pub group: &'static str,
    pub description: String,
}

/// Full catalog in display order.
pub fn all_permissions() -> Vec<PermissionDefinition> {
    MODULES
        .iter()
        .flat_map(|&module| {
            ACTIONS.iter().map(move |&action| PermissionDefinition {
                claim_type: PERMISSION_CLAIM_TYPE,
                value: permission_value(module, action),
                group: module,
                description: format!("{action} {}", humanize(module)),
            })
        })
        .collect()
}

pub fn is_known_permission(value: &str) -> bool {
    let mut parts = value.split('.');
    matches!(
        (parts.next(), parts.next(), parts.next(), parts.next()),
        (Some("Permissions"), Some(module), Some(action), None)
            if MODULES.contains(&module) && ACTIONS.contains(&action)
    )
}

fn permission_value(module: &str, action: &str) -> String {
    format!("Permissions.{module}.{action}")
}

// "RoleClaims" -> "role claims"
fn humanize(module: &str) -> String {
    let mut out = String::with_capacity(module.len() + 4);
    for (idx, ch) in module.chars().enumerate() {
        if ch.is_uppercase() && idx > 0 {
            out.push(' ');
        }
        out.extend(ch.to_lowercase());
    }
    out
}
