//! Repository contracts and SQLite implementations for the identity store.
//!
//! # Responsibility
//! - Keep SQL inside the persistence boundary.
//! - Report semantic failures (`*NotFound`, `Conflict`) separately from
//!   transport errors.
//!
//! # Invariants
//! - Write paths validate entities before touching SQL.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Multi-row replacements run in one transaction.

pub mod role_repo;
pub mod user_repo;

use crate::db::DbError;
use crate::model::role::RoleValidationError;
use crate::model::user::UserValidationError;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    RoleValidation(RoleValidationError),
    UserValidation(UserValidationError),
    RoleNotFound(String),
    UserNotFound(String),
    ClaimNotFound(i64),
    /// A uniqueness or foreign-key constraint rejected the write.
    Conflict(String),
    /// Connection was not bootstrapped through `db::open_db*`.
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RoleValidation(err) => write!(f, "{err}"),
            Self::UserValidation(err) => write!(f, "{err}"),
            Self::RoleNotFound(id) => write!(f, "role not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::ClaimNotFound(id) => write!(f, "role claim not found: {id}"),
            Self::Conflict(details) => write!(f, "constraint violation: {details}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "identity repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted identity data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::RoleValidation(err) => Some(err),
            Self::UserValidation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(message.clone().unwrap_or_else(|| err.to_string()))
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

impl From<RoleValidationError> for RepoError {
    fn from(value: RoleValidationError) -> Self {
        Self::RoleValidation(value)
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::UserValidation(value)
    }
}

fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}
