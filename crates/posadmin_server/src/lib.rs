//! axum REST surface over `posadmin_core`.
//!
//! # Responsibility
//! - Translate HTTP requests into identity service calls.
//! - Map `IdentityError` onto status codes with result-envelope bodies.
//!
//! # Invariants
//! - Handlers never hold the database lock across an `.await`.
//! - Service calls run on the blocking pool.

pub mod api;
pub mod config;
pub mod state;

pub use api::router;
pub use config::ServerConfig;
pub use state::AppState;
