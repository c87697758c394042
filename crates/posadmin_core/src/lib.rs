//! Identity administration core for the posadmin console.
//! Owns the role, permission and user rules; outer layers only adapt transport.

pub mod db;
pub mod dto;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod wrapper;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_console_logging, init_logging, logging_status, LogTarget};
pub use model::claim::{RoleClaim, PERMISSION_CLAIM_TYPE};
pub use model::permission::{all_permissions, PermissionDefinition};
pub use model::role::{Role, RoleId, SUPER_ADMIN_ROLE};
pub use model::user::{User, UserId};
pub use model::CurrentUser;
pub use repo::role_repo::{RoleRepository, SqliteRoleRepository};
pub use repo::user_repo::{SqliteUserRepository, UserPageQuery, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use seed::{seed_defaults, AdminSeed, SeedReport};
pub use service::role_claim_service::RoleClaimService;
pub use service::role_service::RoleService;
pub use service::user_service::UserService;
pub use service::{IdentityError, ServiceResult};
pub use wrapper::{ApiResult, PaginatedResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
