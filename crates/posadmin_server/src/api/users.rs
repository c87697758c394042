//! `/users` handlers.

use super::current_user::Caller;
use super::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use posadmin_core::dto::{
    UserListQuery, UserRequest, UserResponse, UserRolesRequest, UserRolesResponse,
};
use posadmin_core::{
    ApiResult, IdentityError, PaginatedResult, SqliteRoleRepository, SqliteUserRepository,
    UserService,
};
use rusqlite::Connection;

type SqliteUserService<'conn> =
    UserService<SqliteUserRepository<'conn>, SqliteRoleRepository<'conn>>;

fn user_service(conn: &Connection) -> Result<SqliteUserService<'_>, IdentityError> {
    Ok(UserService::new(
        SqliteUserRepository::try_new(conn)?,
        SqliteRoleRepository::try_new(conn)?,
    ))
}

pub(super) async fn get_all(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<PaginatedResult<UserResponse>>, ApiError> {
    let page = state
        .run(move |conn| user_service(conn)?.get_all(&query))
        .await?;
    Ok(Json(page))
}

pub(super) async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .run(move |conn| user_service(conn)?.get_by_id(&id))
        .await?;
    Ok(Json(user))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> Result<Json<ApiResult<UserResponse>>, ApiError> {
    let result = state
        .run(move |conn| user_service(conn)?.create(&request))
        .await?;
    Ok(Json(result))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> Result<Json<ApiResult<UserResponse>>, ApiError> {
    let result = state
        .run(move |conn| user_service(conn)?.update(&request))
        .await?;
    Ok(Json(result))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Caller(current_user): Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResult<String>>, ApiError> {
    let result = state
        .run(move |conn| user_service(conn)?.delete(&id, &current_user))
        .await?;
    Ok(Json(result))
}

pub(super) async fn get_roles(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResult<UserRolesResponse>>, ApiError> {
    let result = state
        .run(move |conn| user_service(conn)?.get_roles(&id))
        .await?;
    Ok(Json(result))
}

pub(super) async fn update_roles(
    State(state): State<AppState>,
    Caller(current_user): Caller,
    Path(id): Path<String>,
    Json(request): Json<UserRolesRequest>,
) -> Result<Json<ApiResult<String>>, ApiError> {
    let result = state
        .run(move |conn| user_service(conn)?.update_roles(&id, &request, &current_user))
        .await?;
    Ok(Json(result))
}
