//! `/roleclaims` handlers.

use super::current_user::Caller;
use super::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use posadmin_core::dto::{RoleClaimRequest, RoleClaimResponse};
use posadmin_core::{
    ApiResult, IdentityError, RoleClaimService, SqliteRoleRepository, SqliteUserRepository,
};
use rusqlite::Connection;

fn claim_service(
    conn: &Connection,
) -> Result<RoleClaimService<SqliteRoleRepository<'_>, SqliteUserRepository<'_>>, IdentityError> {
    Ok(RoleClaimService::new(
        SqliteRoleRepository::try_new(conn)?,
        SqliteUserRepository::try_new(conn)?,
    ))
}

pub(super) async fn get_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResult<Vec<RoleClaimResponse>>>, ApiError> {
    let result = state.run(|conn| claim_service(conn)?.get_all()).await?;
    Ok(Json(result))
}

pub(super) async fn get_by_role_id(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> Result<Json<ApiResult<Vec<RoleClaimResponse>>>, ApiError> {
    let result = state
        .run(move |conn| claim_service(conn)?.get_all_by_role_id(&role_id))
        .await?;
    Ok(Json(result))
}

pub(super) async fn save(
    State(state): State<AppState>,
    Caller(current_user): Caller,
    Json(request): Json<RoleClaimRequest>,
) -> Result<Json<ApiResult<String>>, ApiError> {
    let result = state
        .run(move |conn| claim_service(conn)?.save(&request, &current_user))
        .await?;
    Ok(Json(result))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Caller(current_user): Caller,
    Path(id): Path<i64>,
) -> Result<Json<ApiResult<String>>, ApiError> {
    let result = state
        .run(move |conn| claim_service(conn)?.delete(id, &current_user))
        .await?;
    Ok(Json(result))
}
