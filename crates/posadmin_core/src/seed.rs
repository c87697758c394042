//! Idempotent bootstrap data: system roles, SuperAdmin grants and the first
//! administrator account.

use crate::model::claim::RoleClaim;
use crate::model::permission::all_permissions;
use crate::model::role::{default_roles, Role, SUPER_ADMIN_ROLE};
use crate::model::user::User;
use crate::repo::role_repo::{RoleRepository, SqliteRoleRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

/// Initial administrator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub user_name: String,
    pub email: String,
}

/// What a seeding pass actually inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub claims_created: usize,
    pub admin_created: bool,
}

/// Creates whatever bootstrap data is missing; running it twice is a no-op.
pub fn seed_defaults(conn: &Connection, admin: Option<&AdminSeed>) -> RepoResult<SeedReport> {
    let tx = conn.unchecked_transaction()?;
    let report = seed_in(&tx, admin)?;
    tx.commit()?;
    info!(
        "event=seed module=seed status=ok roles_created={} claims_created={} admin_created={}",
        report.roles_created, report.claims_created, report.admin_created
    );
    Ok(report)
}

fn seed_in(conn: &Connection, admin: Option<&AdminSeed>) -> RepoResult<SeedReport> {
    let roles = SqliteRoleRepository::try_new(conn)?;
    let users = SqliteUserRepository::try_new(conn)?;
    let mut report = SeedReport::default();

    for name in default_roles() {
        if roles.find_role_by_name(name)?.is_none() {
            roles.create_role(&Role::new(*name, Some(format!("{name} role"))))?;
            report.roles_created += 1;
        }
    }

    let super_admin = roles
        .find_role_by_name(SUPER_ADMIN_ROLE)?
        .ok_or_else(|| RepoError::RoleNotFound(SUPER_ADMIN_ROLE.to_string()))?;
    let held = roles.list_claims_for_role(&super_admin.id)?;
    for permission in all_permissions() {
        if held
            .iter()
            .any(|claim| claim.matches(permission.claim_type, &permission.value))
        {
            continue;
        }
        let mut claim = RoleClaim::permission(super_admin.id.as_str(), permission.value);
        claim.description = Some(permission.description);
        claim.group = Some(permission.group.to_string());
        roles.create_claim(&claim)?;
        report.claims_created += 1;
    }

    if let Some(seed) = admin {
        let user = match users.find_user_by_name(&seed.user_name)? {
            Some(existing) => existing,
            None => {
                let mut user = User::new(&seed.user_name, &seed.email);
                user.email_confirmed = true;
                users.create_user(&user)?;
                report.admin_created = true;
                user
            }
        };
        users.add_user_to_role(&user.id, &super_admin.id)?;
    }

    Ok(report)
}
