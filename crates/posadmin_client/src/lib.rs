//! # posadmin client
//!
//! Typed HTTP client for the `/api/identity` REST surface.
//!
//! ```rust,ignore
//! use posadmin_client::{UserApiClient, UserParams};
//!
//! let users = UserApiClient::new("http://localhost:5050")?;
//! let page = users
//!     .get_users(&UserParams {
//!         search_string: Some("jdoe".to_string()),
//!         page_number: Some(1),
//!         ..UserParams::default()
//!     })
//!     .await?;
//! println!("{} users", page.total_count);
//! ```
//!
//! Failure envelopes (`succeeded == false`) come back as `Ok`; only
//! transport failures and non-2xx statuses become [`Error`].

mod http;
pub mod models;
mod roles;
mod users;

pub use models::{
    ApiResult, PaginatedResult, Permission, Role, RoleClaim, User, UserParams, UserRole,
    UserRoles,
};
pub use roles::RoleApiClient;
pub use users::{user_query_params, UserApiClient};

use thiserror::Error;

/// Errors from the posadmin client.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Base URL cannot carry the `/api/identity` path.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Caller id cannot be sent as a header value.
    #[error("Invalid user id header: {0}")]
    InvalidUserId(String),
}
