//! `/roles` handlers.

use super::current_user::Caller;
use super::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use posadmin_core::dto::{PermissionRequest, PermissionResponse, RoleRequest, RoleResponse};
use posadmin_core::{
    ApiResult, IdentityError, RoleService, SqliteRoleRepository, SqliteUserRepository,
};
use rusqlite::Connection;

type SqliteRoleService<'conn> =
    RoleService<SqliteRoleRepository<'conn>, SqliteUserRepository<'conn>>;

fn role_service(conn: &Connection) -> Result<SqliteRoleService<'_>, IdentityError> {
    Ok(RoleService::new(
        SqliteRoleRepository::try_new(conn)?,
        SqliteUserRepository::try_new(conn)?,
    ))
}

pub(super) async fn get_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResult<Vec<RoleResponse>>>, ApiError> {
    let result = state.run(|conn| role_service(conn)?.get_all()).await?;
    Ok(Json(result))
}

pub(super) async fn get_count(
    State(state): State<AppState>,
) -> Result<Json<ApiResult<i64>>, ApiError> {
    let count = state.run(|conn| role_service(conn)?.get_count()).await?;
    Ok(Json(ApiResult::success(count)))
}

pub(super) async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResult<RoleResponse>>, ApiError> {
    let result = state
        .run(move |conn| role_service(conn)?.get_by_id(&id))
        .await?;
    Ok(Json(result))
}

pub(super) async fn save(
    State(state): State<AppState>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<ApiResult<String>>, ApiError> {
    let result = state
        .run(move |conn| role_service(conn)?.save(&request))
        .await?;
    Ok(Json(result))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResult<String>>, ApiError> {
    let result = state
        .run(move |conn| role_service(conn)?.delete(&id))
        .await?;
    Ok(Json(result))
}

pub(super) async fn get_permissions(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> Result<Json<ApiResult<PermissionResponse>>, ApiError> {
    let result = state
        .run(move |conn| role_service(conn)?.get_all_permissions(&role_id))
        .await?;
    Ok(Json(result))
}

pub(super) async fn update_permissions(
    State(state): State<AppState>,
    Caller(current_user): Caller,
    Json(request): Json<PermissionRequest>,
) -> Result<Json<ApiResult<String>>, ApiError> {
    let result = state
        .run(move |conn| Ok(role_service(conn)?.update_permissions(&request, &current_user)))
        .await?;
    Ok(Json(result))
}
