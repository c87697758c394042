//! Identity administration use-cases.
//!
//! # Responsibility
//! - Enforce role, permission and membership business rules above the
//!   repository layer.
//! - Translate outcomes into result envelopes for the REST surface.
//!
//! # Error policy
//! - Missing entities and duplicate names are `IdentityError` values carrying
//!   an HTTP status code.
//! - Validation and business-rule refusals are `Ok(ApiResult::fail(..))`.
//! - Storage failures surface as `IdentityError::Repo` (status 500), except in
//!   the permission-update path where they become failure envelopes.

pub mod role_claim_service;
pub mod role_service;
pub mod user_service;

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, IdentityError>;

#[derive(Debug)]
pub enum IdentityError {
    /// 404.
    NotFound(String),
    /// 400.
    BadRequest(String),
    /// 500.
    Repo(RepoError),
}

impl IdentityError {
    /// HTTP status code carried by this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::BadRequest(_) => 400,
            Self::Repo(_) => 500,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(message) | Self::BadRequest(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IdentityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for IdentityError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::RoleNotFound(_) => Self::NotFound("Role Not Found".to_string()),
            RepoError::UserNotFound(_) => Self::NotFound("User Not Found".to_string()),
            RepoError::ClaimNotFound(_) => Self::NotFound("Role Claim Not Found".to_string()),
            RepoError::RoleValidation(err) => Self::BadRequest(err.to_string()),
            RepoError::UserValidation(err) => Self::BadRequest(err.to_string()),
            RepoError::Conflict(details) => Self::BadRequest(details),
            other => Self::Repo(other),
        }
    }
}
