//! Role and role-claim persistence.
//!
//! # Invariants
//! - Role names are unique on `normalized_name`.
//! - Deleting a role removes its claims and memberships (FK cascade).
//! - `replace_permission_claims` swaps the whole permission set atomically.

use super::{ensure_tables, RepoError, RepoResult};
use crate::model::claim::{RoleClaim, PERMISSION_CLAIM_TYPE};
use crate::model::normalize_key;
use crate::model::role::{Role, RoleId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ROLE_SELECT_SQL: &str = "SELECT id, name, normalized_name, description FROM roles";

const CLAIM_SELECT_SQL: &str = "SELECT
    id,
    role_id,
    claim_type,
    claim_value,
    description,
    claim_group
FROM role_claims";

/// Role and role-claim data access.
pub trait RoleRepository {
    fn find_role_by_id(&self, id: &str) -> RepoResult<Option<Role>>;
    /// Looks a role up by its normalized name.
    fn find_role_by_name(&self, name: &str) -> RepoResult<Option<Role>>;
    /// All roles ordered by name.
    fn list_roles(&self) -> RepoResult<Vec<Role>>;
    fn count_roles(&self) -> RepoResult<i64>;
    fn create_role(&self, role: &Role) -> RepoResult<RoleId>;
    fn update_role(&self, role: &Role) -> RepoResult<()>;
    fn delete_role(&self, id: &str) -> RepoResult<()>;

    fn list_claims(&self) -> RepoResult<Vec<RoleClaim>>;
    fn list_claims_for_role(&self, role_id: &str) -> RepoResult<Vec<RoleClaim>>;
    fn get_claim(&self, id: i64) -> RepoResult<Option<RoleClaim>>;
    fn create_claim(&self, claim: &RoleClaim) -> RepoResult<i64>;
    /// Updates description and group of an existing claim.
    fn update_claim(&self, claim: &RoleClaim) -> RepoResult<()>;
    fn delete_claim(&self, id: i64) -> RepoResult<()>;
    /// Replaces every `Permission` claim of `role_id` with `claims`.
    fn replace_permission_claims(&self, role_id: &str, claims: &[RoleClaim]) -> RepoResult<()>;
}

/// SQLite-backed role repository.
pub struct SqliteRoleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoleRepository<'conn> {
    /// Wraps a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["roles", "role_claims"])?;
        Ok(Self { conn })
    }
}

impl RoleRepository for SqliteRoleRepository<'_> {
    fn find_role_by_id(&self, id: &str) -> RepoResult<Option<Role>> {
        let role = self
            .conn
            .query_row(
                &format!("{ROLE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_role_row,
            )
            .optional()?;
        Ok(role)
    }

    fn find_role_by_name(&self, name: &str) -> RepoResult<Option<Role>> {
        let role = self
            .conn
            .query_row(
                &format!("{ROLE_SELECT_SQL} WHERE normalized_name = ?1;"),
                [normalize_key(name)],
                parse_role_row,
            )
            .optional()?;
        Ok(role)
    }

    fn list_roles(&self) -> RepoResult<Vec<Role>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROLE_SELECT_SQL} ORDER BY normalized_name ASC, id ASC;"
        ))?;
        let roles = stmt
            .query_map([], parse_role_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    fn count_roles(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM roles;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn create_role(&self, role: &Role) -> RepoResult<RoleId> {
        role.validate()?;
        self.conn.execute(
            "INSERT INTO roles (id, name, normalized_name, description)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                role.id.as_str(),
                role.name.as_str(),
                role.normalized_name.as_str(),
                role.description.as_deref(),
            ],
        )?;
        Ok(role.id.clone())
    }

    fn update_role(&self, role: &Role) -> RepoResult<()> {
        role.validate()?;
        let changed = self.conn.execute(
            "UPDATE roles
             SET
                name = ?2,
                normalized_name = ?3,
                description = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                role.id.as_str(),
                role.name.as_str(),
                role.normalized_name.as_str(),
                role.description.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::RoleNotFound(role.id.clone()));
        }
        Ok(())
    }

    fn delete_role(&self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM roles WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::RoleNotFound(id.to_string()));
        }
        Ok(())
    }

    fn list_claims(&self) -> RepoResult<Vec<RoleClaim>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLAIM_SELECT_SQL} ORDER BY role_id ASC, id ASC;"))?;
        let claims = stmt
            .query_map([], parse_claim_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims)
    }

    fn list_claims_for_role(&self, role_id: &str) -> RepoResult<Vec<RoleClaim>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLAIM_SELECT_SQL} WHERE role_id = ?1 ORDER BY id ASC;"))?;
        let claims = stmt
            .query_map([role_id], parse_claim_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims)
    }

    fn get_claim(&self, id: i64) -> RepoResult<Option<RoleClaim>> {
        let claim = self
            .conn
            .query_row(
                &format!("{CLAIM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_claim_row,
            )
            .optional()?;
        Ok(claim)
    }

    fn create_claim(&self, claim: &RoleClaim) -> RepoResult<i64> {
        if claim.claim_value.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "role claim value must not be blank".to_string(),
            ));
        }
        insert_claim(self.conn, claim)
    }

    fn update_claim(&self, claim: &RoleClaim) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE role_claims
             SET description = ?2, claim_group = ?3
             WHERE id = ?1;",
            params![claim.id, claim.description.as_deref(), claim.group.as_deref()],
        )?;
        if changed == 0 {
            return Err(RepoError::ClaimNotFound(claim.id));
        }
        Ok(())
    }

    fn delete_claim(&self, id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM role_claims WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::ClaimNotFound(id));
        }
        Ok(())
    }

    fn replace_permission_claims(&self, role_id: &str, claims: &[RoleClaim]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM roles WHERE id = ?1);",
            [role_id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::RoleNotFound(role_id.to_string()));
        }

        tx.execute(
            "DELETE FROM role_claims WHERE role_id = ?1 AND claim_type = ?2;",
            params![role_id, PERMISSION_CLAIM_TYPE],
        )?;
        for claim in claims {
            let mut scoped = claim.clone();
            scoped.role_id = role_id.to_string();
            scoped.claim_type = PERMISSION_CLAIM_TYPE.to_string();
            insert_claim(&tx, &scoped)?;
        }
        tx.execute(
            "UPDATE roles SET updated_at = (strftime('%s', 'now') * 1000) WHERE id = ?1;",
            [role_id],
        )?;

        tx.commit()?;
        Ok(())
    }
}

fn insert_claim(conn: &Connection, claim: &RoleClaim) -> RepoResult<i64> {
    conn.execute(
        "INSERT INTO role_claims (role_id, claim_type, claim_value, description, claim_group)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            claim.role_id.as_str(),
            claim.claim_type.as_str(),
            claim.claim_value.as_str(),
            claim.description.as_deref(),
            claim.group.as_deref(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_role_row(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get("id")?,
        name: row.get("name")?,
        normalized_name: row.get("normalized_name")?,
        description: row.get("description")?,
    })
}

fn parse_claim_row(row: &Row<'_>) -> rusqlite::Result<RoleClaim> {
    Ok(RoleClaim {
        id: row.get("id")?,
        role_id: row.get("role_id")?,
        claim_type: row.get("claim_type")?,
        claim_value: row.get("claim_value")?,
        description: row.get("description")?,
        group: row.get("claim_group")?,
    })
}
