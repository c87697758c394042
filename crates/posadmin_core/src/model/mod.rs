//! Identity domain model.
//!
//! # Responsibility
//! - Define roles, role claims, users and the static permission catalog.
//! - Own name normalization and field validation rules shared by all layers.
//!
//! # Invariants
//! - Role and user identifiers are UUID v4 text and never reused.
//! - Uniqueness of role names, user names and emails is judged on their
//!   normalized (trimmed, upper-cased) form.

pub mod claim;
pub mod permission;
pub mod role;
pub mod user;

use serde::{Deserialize, Serialize};

/// Identity of the caller on whose behalf a service operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: String,
}

impl CurrentUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Canonical comparison key for names and emails.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}
