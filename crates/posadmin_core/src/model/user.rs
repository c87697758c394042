//! User entity managed by the admin console.

use super::normalize_key;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable user identifier (UUID v4 text).
pub type UserId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub normalized_email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub email_confirmed: bool,
    /// Unix epoch milliseconds; assigned by storage on insert.
    pub created_on_ms: i64,
}

impl User {
    /// Creates an active, unconfirmed user with a fresh id.
    pub fn new(user_name: &str, email: &str) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), user_name, email)
    }

    pub fn with_id(id: UserId, user_name: &str, email: &str) -> Self {
        let mut user = Self {
            id,
            user_name: String::new(),
            normalized_user_name: String::new(),
            email: String::new(),
            normalized_email: String::new(),
            first_name: None,
            last_name: None,
            phone_number: None,
            is_active: true,
            email_confirmed: false,
            created_on_ms: 0,
        };
        user.set_user_name(user_name);
        user.set_email(email);
        user
    }

    pub fn set_user_name(&mut self, user_name: &str) {
        self.user_name = user_name.trim().to_string();
        self.normalized_user_name = normalize_key(&self.user_name);
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.trim().to_string();
        self.normalized_email = normalize_key(&self.email);
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.user_name.is_empty() {
            return Err(UserValidationError::BlankUserName);
        }
        if self.user_name.chars().any(char::is_whitespace) {
            return Err(UserValidationError::UserNameContainsWhitespace);
        }
        if self.email.is_empty() {
            return Err(UserValidationError::BlankEmail);
        }
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(UserValidationError::InvalidEmail(self.email.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    BlankUserName,
    UserNameContainsWhitespace,
    BlankEmail,
    InvalidEmail(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUserName => write!(f, "User name is required."),
            Self::UserNameContainsWhitespace => {
                write!(f, "User name must not contain whitespace.")
            }
            Self::BlankEmail => write!(f, "Email is required."),
            Self::InvalidEmail(value) => write!(f, "Email {value} is not valid."),
        }
    }
}

impl Error for UserValidationError {}
