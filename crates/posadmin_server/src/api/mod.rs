//! Route table for `/api/identity`.

pub mod current_user;
pub mod error;
mod role_claims;
mod roles;
mod users;

use crate::state::AppState;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

pub const BASE_PATH: &str = "/api/identity";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: posadmin_core::core_version(),
    })
}

/// Builds the full application router over `state`.
pub fn router(state: AppState) -> Router {
    let identity = Router::new()
        .route("/health", get(health))
        .route("/roles", get(roles::get_all).post(roles::save))
        .route("/roles/count", get(roles::get_count))
        .route("/roles/permissions", put(roles::update_permissions))
        .route("/roles/permissions/{role_id}", get(roles::get_permissions))
        .route("/roles/{id}", get(roles::get_by_id).delete(roles::delete))
        .route("/roleclaims", get(role_claims::get_all).post(role_claims::save))
        .route(
            "/roleclaims/{id}",
            get(role_claims::get_by_role_id).delete(role_claims::delete),
        )
        .route(
            "/users",
            get(users::get_all).post(users::create).put(users::update),
        )
        .route("/users/roles/{id}", get(users::get_roles).put(users::update_roles))
        .route("/users/{id}", get(users::get_by_id).delete(users::delete));

    Router::new()
        .nest(BASE_PATH, identity)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

