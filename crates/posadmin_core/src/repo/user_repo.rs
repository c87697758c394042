//! User and user-role membership persistence.
//!
//! # Invariants
//! - User names and emails are unique on their normalized form.
//! - Listing is deterministic: requested sort keys, then `user_name ASC, id ASC`.
//! - Page size defaults to 10 and clamps to 100; page number starts at 1.

use super::{bool_to_int, ensure_tables, int_to_bool, RepoError, RepoResult};
use crate::dto::UserListQuery;
use crate::model::normalize_key;
use crate::model::role::RoleId;
use crate::model::user::{User, UserId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const USERS_DEFAULT_PAGE_SIZE: u32 = 10;
const USERS_PAGE_SIZE_MAX: u32 = 100;

const USER_SELECT_SQL: &str = "SELECT
    id,
    user_name,
    normalized_user_name,
    email,
    normalized_email,
    first_name,
    last_name,
    phone_number,
    is_active,
    email_confirmed,
    created_on
FROM users";

/// Sortable user columns accepted in `orderBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    UserName,
    Email,
    FirstName,
    LastName,
    CreatedOn,
}

impl UserSortField {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "username" => Some(Self::UserName),
            "email" => Some(Self::Email),
            "firstname" => Some(Self::FirstName),
            "lastname" => Some(Self::LastName),
            "createdon" => Some(Self::CreatedOn),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::UserName => "normalized_user_name",
            Self::Email => "normalized_email",
            Self::FirstName => "first_name COLLATE NOCASE",
            Self::LastName => "last_name COLLATE NOCASE",
            Self::CreatedOn => "created_on",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Normalized, SQL-ready form of [`UserListQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPageQuery {
    pub search: Option<String>,
    pub page_number: u32,
    pub page_size: u32,
    pub order: Vec<(UserSortField, SortDirection)>,
}

impl Default for UserPageQuery {
    fn default() -> Self {
        Self {
            search: None,
            page_number: 1,
            page_size: USERS_DEFAULT_PAGE_SIZE,
            order: Vec::new(),
        }
    }
}

impl From<&UserListQuery> for UserPageQuery {
    fn from(query: &UserListQuery) -> Self {
        Self {
            search: query
                .search_string
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            page_number: query.page_number.filter(|&n| n > 0).unwrap_or(1),
            page_size: normalize_page_size(query.page_size),
            order: query.order_by.as_deref().map(parse_order_by).unwrap_or_default(),
        }
    }
}

/// One page of users plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total_count: u64,
}

/// User and membership data access.
pub trait UserRepository {
    fn find_user_by_id(&self, id: &str) -> RepoResult<Option<User>>;
    fn find_user_by_name(&self, user_name: &str) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self, query: &UserPageQuery) -> RepoResult<UserPage>;
    fn count_users(&self) -> RepoResult<i64>;
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn delete_user(&self, id: &str) -> RepoResult<()>;
    /// Whether `user_id` is a member of the role named `role_name`.
    fn is_in_role(&self, user_id: &str, role_name: &str) -> RepoResult<bool>;
    fn count_users_in_role(&self, role_id: &str) -> RepoResult<i64>;
    fn role_ids_for_user(&self, user_id: &str) -> RepoResult<Vec<RoleId>>;
    /// Adds one membership; an existing membership is left as is.
    fn add_user_to_role(&self, user_id: &str, role_id: &str) -> RepoResult<()>;
    /// Replaces all memberships of `user_id` in one transaction.
    fn replace_user_roles(&self, user_id: &str, role_ids: &[RoleId]) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Wraps a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "user_roles", "roles"])?;
        Ok(Self { conn })
    }

    fn find_one(&self, column: &str, value: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn find_user_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        self.find_one("id", id)
    }

    fn find_user_by_name(&self, user_name: &str) -> RepoResult<Option<User>> {
        self.find_one("normalized_user_name", &normalize_key(user_name))
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("normalized_email", &normalize_key(email))
    }

    fn list_users(&self, query: &UserPageQuery) -> RepoResult<UserPage> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref() {
            where_sql.push_str(
                " AND (user_name LIKE ? ESCAPE '\\'
                    OR email LIKE ? ESCAPE '\\'
                    OR first_name LIKE ? ESCAPE '\\'
                    OR last_name LIKE ? ESCAPE '\\'
                    OR phone_number LIKE ? ESCAPE '\\')",
            );
            let pattern = format!("%{}%", escape_like(search));
            for _ in 0..5 {
                bind_values.push(Value::Text(pattern.clone()));
            }
        }

        let total_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM users{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let mut sql = format!("{USER_SELECT_SQL}{where_sql} ORDER BY ");
        for (field, direction) in &query.order {
            sql.push_str(field.column());
            sql.push_str(match direction {
                SortDirection::Asc => " ASC, ",
                SortDirection::Desc => " DESC, ",
            });
        }
        sql.push_str("normalized_user_name ASC, id ASC LIMIT ? OFFSET ?");

        let page_size = normalize_page_size(Some(query.page_size));
        let offset = u64::from(query.page_number.max(1) - 1) * u64::from(page_size);
        bind_values.push(Value::Integer(i64::from(page_size)));
        bind_values.push(Value::Integer(offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_user_row(row)?);
        }

        Ok(UserPage {
            items,
            total_count: total_count.max(0) as u64,
        })
    }

    fn count_users(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;
        self.conn.execute(
            "INSERT INTO users (
                id,
                user_name,
                normalized_user_name,
                email,
                normalized_email,
                first_name,
                last_name,
                phone_number,
                is_active,
                email_confirmed,
                created_on
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                COALESCE(NULLIF(?11, 0), strftime('%s', 'now') * 1000)
            );",
            params![
                user.id.as_str(),
                user.user_name.as_str(),
                user.normalized_user_name.as_str(),
                user.email.as_str(),
                user.normalized_email.as_str(),
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                user.phone_number.as_deref(),
                bool_to_int(user.is_active),
                bool_to_int(user.email_confirmed),
                user.created_on_ms,
            ],
        )?;
        Ok(user.id.clone())
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;
        let changed = self.conn.execute(
            "UPDATE users
             SET
                user_name = ?2,
                normalized_user_name = ?3,
                email = ?4,
                normalized_email = ?5,
                first_name = ?6,
                last_name = ?7,
                phone_number = ?8,
                is_active = ?9,
                email_confirmed = ?10
             WHERE id = ?1;",
            params![
                user.id.as_str(),
                user.user_name.as_str(),
                user.normalized_user_name.as_str(),
                user.email.as_str(),
                user.normalized_email.as_str(),
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                user.phone_number.as_deref(),
                bool_to_int(user.is_active),
                bool_to_int(user.email_confirmed),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(user.id.clone()));
        }
        Ok(())
    }

    fn delete_user(&self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(id.to_string()));
        }
        Ok(())
    }

    fn is_in_role(&self, user_id: &str, role_name: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM user_roles ur
                INNER JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = ?1
                  AND r.normalized_name = ?2
            );",
            params![user_id, normalize_key(role_name)],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_users_in_role(&self, role_id: &str) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM user_roles WHERE role_id = ?1;",
            [role_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn role_ids_for_user(&self, user_id: &str) -> RepoResult<Vec<RoleId>> {
        let mut stmt = self.conn.prepare(
            "SELECT role_id FROM user_roles WHERE user_id = ?1 ORDER BY role_id ASC;",
        )?;
        let ids = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn add_user_to_role(&self, user_id: &str, role_id: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2);",
            params![user_id, role_id],
        )?;
        Ok(())
    }

    fn replace_user_roles(&self, user_id: &str, role_ids: &[RoleId]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let exists = tx
            .query_row("SELECT 1 FROM users WHERE id = ?1;", [user_id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(RepoError::UserNotFound(user_id.to_string()));
        }

        tx.execute("DELETE FROM user_roles WHERE user_id = ?1;", [user_id])?;
        for role_id in role_ids {
            tx.execute(
                "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2);",
                params![user_id, role_id.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Applies the default and the upper bound to a requested page size.
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(0) | None => USERS_DEFAULT_PAGE_SIZE,
        Some(value) if value > USERS_PAGE_SIZE_MAX => USERS_PAGE_SIZE_MAX,
        Some(value) => value,
    }
}

/// Parses `"userName desc, email"` into sort keys; unknown fields are skipped.
pub fn parse_order_by(order_by: &str) -> Vec<(UserSortField, SortDirection)> {
    let mut order: Vec<(UserSortField, SortDirection)> = Vec::new();
    for clause in order_by.split(',') {
        let mut parts = clause.split_whitespace();
        let Some(field) = parts.next().and_then(UserSortField::parse) else {
            continue;
        };
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("desc") | Some("descending") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        if order.iter().all(|(existing, _)| *existing != field) {
            order.push((field, direction));
        }
    }
    order
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get("id")?,
        user_name: row.get("user_name")?,
        normalized_user_name: row.get("normalized_user_name")?,
        email: row.get("email")?,
        normalized_email: row.get("normalized_email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        phone_number: row.get("phone_number")?,
        is_active: int_to_bool(row.get("is_active")?, "users.is_active")?,
        email_confirmed: int_to_bool(row.get("email_confirmed")?, "users.email_confirmed")?,
        created_on_ms: row.get("created_on")?,
    };
    user.validate().map_err(|err| {
        RepoError::InvalidData(format!("user `{}` failed validation: {err}", user.id))
    })?;
    Ok(user)
}
