//! User administration and role membership.
//!
//! # Invariants
//! - User names and emails stay unique (normalized comparison).
//! - At least one SuperAdmin member remains once one exists.
//! - Only SuperAdmin members grant or revoke SuperAdmin membership.

use super::{IdentityError, ServiceResult};
use crate::dto::{
    UserListQuery, UserRequest, UserResponse, UserRoleModel, UserRolesRequest, UserRolesResponse,
};
use crate::model::role::{is_super_admin, RoleId, SUPER_ADMIN_ROLE};
use crate::model::user::User;
use crate::model::CurrentUser;
use crate::repo::role_repo::RoleRepository;
use crate::repo::user_repo::{UserPageQuery, UserRepository};
use crate::repo::RepoError;
use crate::wrapper::{ApiResult, PaginatedResult};
use log::{info, warn};

pub struct UserService<U: UserRepository, R: RoleRepository> {
    users: U,
    roles: R,
}

impl<U: UserRepository, R: RoleRepository> UserService<U, R> {
    pub fn new(users: U, roles: R) -> Self {
        Self { users, roles }
    }

    pub fn get_all(&self, query: &UserListQuery) -> ServiceResult<PaginatedResult<UserResponse>> {
        let page_query = UserPageQuery::from(query);
        let page = self.users.list_users(&page_query)?;
        Ok(PaginatedResult::success(
            page.items.into_iter().map(UserResponse::from).collect(),
            page.total_count,
            page_query.page_number,
            page_query.page_size,
        ))
    }

    pub fn get_by_id(&self, id: &str) -> ServiceResult<UserResponse> {
        Ok(self.require_user(id)?.into())
    }

    pub fn create(&self, request: &UserRequest) -> ServiceResult<ApiResult<UserResponse>> {
        let mut user = User::new(&request.user_name, &request.email);
        request.apply_to(&mut user);
        if let Err(err) = user.validate() {
            return Ok(ApiResult::fail(err.to_string()));
        }
        self.ensure_unique(&user)?;

        self.users.create_user(&user)?;
        info!(
            "event=user_create module=user_service status=ok user_id={}",
            user.id
        );
        let created = self.read_back(&user.id)?;
        let message = format!("User {} Registered.", created.user_name);
        Ok(ApiResult::success_with_message(created.into(), message))
    }

    pub fn update(&self, request: &UserRequest) -> ServiceResult<ApiResult<UserResponse>> {
        let Some(id) = request.existing_id() else {
            return Ok(ApiResult::fail("User id is required."));
        };
        let mut user = self.require_user(id)?;
        request.apply_to(&mut user);
        if let Err(err) = user.validate() {
            return Ok(ApiResult::fail(err.to_string()));
        }
        self.ensure_unique(&user)?;

        self.users.update_user(&user)?;
        info!("event=user_update module=user_service status=ok user_id={id}");
        let updated = self.read_back(id)?;
        let message = format!("User {} Updated.", updated.user_name);
        Ok(ApiResult::success_with_message(updated.into(), message))
    }

    pub fn delete(&self, id: &str, current_user: &CurrentUser) -> ServiceResult<ApiResult<String>> {
        let user = self.require_user(id)?;
        if user.id == current_user.user_id {
            return Ok(ApiResult::fail("You cannot delete your own account."));
        }
        if self.users.is_in_role(&user.id, SUPER_ADMIN_ROLE)? && self.super_admin_count()? <= 1 {
            warn!("event=user_delete module=user_service status=refused reason=last_super_admin user_id={id}");
            return Ok(ApiResult::fail("Not allowed to delete the last SuperAdmin user."));
        }

        self.users.delete_user(&user.id)?;
        info!("event=user_delete module=user_service status=ok user_id={id}");
        Ok(ApiResult::message(format!("User {} Deleted.", user.user_name)))
    }

    /// Every role, flagged with whether `user_id` holds it.
    pub fn get_roles(&self, user_id: &str) -> ServiceResult<ApiResult<UserRolesResponse>> {
        let user = self.require_user(user_id)?;
        let held = self.users.role_ids_for_user(&user.id)?;
        let user_roles = self
            .roles
            .list_roles()?
            .into_iter()
            .map(|role| UserRoleModel {
                selected: held.contains(&role.id),
                role_id: role.id,
                role_name: role.name,
                role_description: role.description,
            })
            .collect();
        Ok(ApiResult::success(UserRolesResponse { user_roles }))
    }

    /// Replaces the memberships of `user_id` with the selected roles.
    pub fn update_roles(
        &self,
        user_id: &str,
        request: &UserRolesRequest,
        current_user: &CurrentUser,
    ) -> ServiceResult<ApiResult<String>> {
        let user = self.require_user(user_id)?;

        let mut role_ids: Vec<RoleId> = Vec::new();
        let mut grants_super_admin = false;
        for requested in request.user_roles.iter().filter(|model| model.selected) {
            let role = if requested.role_id.trim().is_empty() {
                self.roles.find_role_by_name(&requested.role_name)?
            } else {
                self.roles.find_role_by_id(requested.role_id.trim())?
            };
            let Some(role) = role else {
                return Ok(ApiResult::fail(format!(
                    "Role {} does not exist.",
                    requested.role_name
                )));
            };
            grants_super_admin |= is_super_admin(&role.name);
            if !role_ids.contains(&role.id) {
                role_ids.push(role.id);
            }
        }

        let holds_super_admin = self.users.is_in_role(&user.id, SUPER_ADMIN_ROLE)?;
        if holds_super_admin != grants_super_admin {
            if !self
                .users
                .is_in_role(&current_user.user_id, SUPER_ADMIN_ROLE)?
            {
                warn!(
                    "event=user_roles_update module=user_service status=refused reason=not_super_admin user_id={} actor_id={}",
                    user.id, current_user.user_id
                );
                return Ok(ApiResult::fail(
                    "Not allowed to change SuperAdmin membership.",
                ));
            }
            if holds_super_admin && self.super_admin_count()? <= 1 {
                return Ok(ApiResult::fail(
                    "Not allowed to remove the last SuperAdmin user.",
                ));
            }
        }

        self.users.replace_user_roles(&user.id, &role_ids)?;
        info!(
            "event=user_roles_update module=user_service status=ok user_id={} role_count={}",
            user.id,
            role_ids.len()
        );
        Ok(ApiResult::message("Roles Updated."))
    }

    fn require_user(&self, id: &str) -> ServiceResult<User> {
        self.users
            .find_user_by_id(id)?
            .ok_or_else(|| IdentityError::not_found("User Not Found"))
    }

    fn read_back(&self, id: &str) -> ServiceResult<User> {
        self.users.find_user_by_id(id)?.ok_or_else(|| {
            IdentityError::Repo(RepoError::InvalidData(format!(
                "user `{id}` missing in read-back"
            )))
        })
    }

    fn ensure_unique(&self, user: &User) -> ServiceResult<()> {
        if let Some(other) = self.users.find_user_by_name(&user.user_name)? {
            if other.id != user.id {
                return Err(IdentityError::bad_request(format!(
                    "Username {} is already taken.",
                    user.user_name
                )));
            }
        }
        if let Some(other) = self.users.find_user_by_email(&user.email)? {
            if other.id != user.id {
                return Err(IdentityError::bad_request(format!(
                    "Email {} is already registered.",
                    user.email
                )));
            }
        }
        Ok(())
    }

    fn super_admin_count(&self) -> ServiceResult<i64> {
        match self.roles.find_role_by_name(SUPER_ADMIN_ROLE)? {
            Some(role) => Ok(self.users.count_users_in_role(&role.id)?),
            None => Ok(0),
        }
    }
}
