//! Role administration: CRUD over roles and their permission claims.
//!
//! # Invariants
//! - Default roles are never renamed, edited or deleted.
//! - A role that any user holds is never deleted.
//! - Only SuperAdmin members edit SuperAdmin permissions, and the
//!   SuperAdmin role always keeps `SUPER_ADMIN_REQUIRED`.

use super::{IdentityError, ServiceResult};
use crate::dto::{
    non_blank, PermissionRequest, PermissionResponse, RoleClaimResponse, RoleRequest, RoleResponse,
};
use crate::model::claim::RoleClaim;
use crate::model::permission::{all_permissions, is_known_permission, SUPER_ADMIN_REQUIRED};
use crate::model::role::{is_super_admin, Role, SUPER_ADMIN_ROLE};
use crate::model::CurrentUser;
use crate::repo::role_repo::RoleRepository;
use crate::repo::user_repo::UserRepository;
use crate::wrapper::ApiResult;
use log::{info, warn};

pub struct RoleService<R: RoleRepository, U: UserRepository> {
    roles: R,
    users: U,
}

impl<R: RoleRepository, U: UserRepository> RoleService<R, U> {
    pub fn new(roles: R, users: U) -> Self {
        Self { roles, users }
    }

    /// Deletes an unused, non-default role together with its claims.
    pub fn delete(&self, id: &str) -> ServiceResult<ApiResult<String>> {
        let role = self
            .roles
            .find_role_by_id(id)?
            .ok_or_else(|| IdentityError::not_found("Role Not Found"))?;

        // Refusing a default role is a failure envelope, never a success notice.
        if role.is_default() {
            warn!("event=role_delete module=role_service status=refused reason=default_role role_id={id}");
            return Ok(ApiResult::fail(format!(
                "Not allowed to delete {} Role.",
                role.name
            )));
        }

        if self.users.count_users_in_role(&role.id)? > 0 {
            warn!("event=role_delete module=role_service status=refused reason=in_use role_id={id}");
            return Ok(ApiResult::fail(format!(
                "Not allowed to delete {} Role as it is being used.",
                role.name
            )));
        }

        self.roles.delete_role(&role.id)?;
        info!("event=role_delete module=role_service status=ok role_id={id}");
        Ok(ApiResult::message(format!("Role {} Deleted.", role.name)))
    }

    pub fn get_all(&self) -> ServiceResult<ApiResult<Vec<RoleResponse>>> {
        let roles = self.roles.list_roles()?;
        Ok(ApiResult::success(
            roles.into_iter().map(RoleResponse::from).collect(),
        ))
    }

    /// Projects the whole permission catalog onto `role_id`.
    ///
    /// Entries the role holds are `selected` and carry the stored claim id,
    /// description and group. An unknown role yields the bare catalog.
    pub fn get_all_permissions(&self, role_id: &str) -> ServiceResult<ApiResult<PermissionResponse>> {
        let catalog = all_permissions();
        let Some(role) = self.roles.find_role_by_id(role_id)? else {
            let role_claims = catalog
                .into_iter()
                .map(|permission| RoleClaimResponse {
                    id: 0,
                    role_id: String::new(),
                    claim_type: permission.claim_type.to_string(),
                    value: permission.value,
                    description: Some(permission.description),
                    group: Some(permission.group.to_string()),
                    selected: false,
                })
                .collect();
            return Ok(ApiResult::success(PermissionResponse {
                role_claims,
                ..PermissionResponse::default()
            }));
        };

        let held = self.roles.list_claims_for_role(&role.id)?;
        let role_claims = catalog
            .into_iter()
            .map(|permission| {
                let stored = held
                    .iter()
                    .find(|claim| claim.matches(permission.claim_type, &permission.value));
                RoleClaimResponse {
                    id: stored.map_or(0, |claim| claim.id),
                    role_id: role.id.clone(),
                    claim_type: permission.claim_type.to_string(),
                    description: stored
                        .and_then(|claim| claim.description.clone())
                        .or(Some(permission.description)),
                    group: stored
                        .and_then(|claim| claim.group.clone())
                        .or_else(|| Some(permission.group.to_string())),
                    selected: stored.is_some(),
                    value: permission.value,
                }
            })
            .collect();

        Ok(ApiResult::success(PermissionResponse {
            role_id: role.id,
            role_name: role.name,
            role_claims,
        }))
    }

    pub fn get_by_id(&self, id: &str) -> ServiceResult<ApiResult<RoleResponse>> {
        let role = self
            .roles
            .find_role_by_id(id)?
            .ok_or_else(|| IdentityError::not_found("Role Not Found"))?;
        Ok(ApiResult::success(role.into()))
    }

    /// Creates a role when `request` has no id, otherwise updates it.
    pub fn save(&self, request: &RoleRequest) -> ServiceResult<ApiResult<String>> {
        let description = non_blank(request.description.as_deref());

        let Some(id) = request.existing_id() else {
            let role = Role::new(request.name.as_str(), description);
            if let Err(err) = role.validate() {
                return Ok(ApiResult::fail(err.to_string()));
            }
            if self.roles.find_role_by_name(&role.name)?.is_some() {
                return Err(IdentityError::bad_request("Similar Role already exists."));
            }
            self.roles.create_role(&role)?;
            info!(
                "event=role_create module=role_service status=ok role_id={}",
                role.id
            );
            return Ok(ApiResult::message(format!("Role {} Created.", role.name)));
        };

        let Some(mut role) = self.roles.find_role_by_id(id)? else {
            return Ok(ApiResult::fail("Role does not exist."));
        };
        // Same as delete: a default role edit answers with a failure envelope.
        if role.is_default() {
            warn!("event=role_update module=role_service status=refused reason=default_role role_id={id}");
            return Ok(ApiResult::fail(format!(
                "Not allowed to modify {} Role.",
                role.name
            )));
        }

        role.rename(&request.name);
        role.description = description;
        if let Err(err) = role.validate() {
            return Ok(ApiResult::fail(err.to_string()));
        }
        if let Some(other) = self.roles.find_role_by_name(&role.name)? {
            if other.id != role.id {
                return Err(IdentityError::bad_request("Similar Role already exists."));
            }
        }

        self.roles.update_role(&role)?;
        info!("event=role_update module=role_service status=ok role_id={id}");
        Ok(ApiResult::message(format!("Role {} Updated.", role.name)))
    }

    /// Replaces the permission claims of a role with the selected entries.
    ///
    /// Never returns an error: storage failures become failure envelopes.
    pub fn update_permissions(
        &self,
        request: &PermissionRequest,
        current_user: &CurrentUser,
    ) -> ApiResult<String> {
        match self.try_update_permissions(request, current_user) {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    "event=permissions_update module=role_service status=error role_id={} error={}",
                    request.role_id, err
                );
                ApiResult::fail(err.to_string())
            }
        }
    }

    fn try_update_permissions(
        &self,
        request: &PermissionRequest,
        current_user: &CurrentUser,
    ) -> ServiceResult<ApiResult<String>> {
        let role_id = request.role_id.trim();
        if role_id.is_empty() {
            return Ok(ApiResult::fail("Role is required."));
        }
        let Some(role) = self.roles.find_role_by_id(role_id)? else {
            return Ok(ApiResult::fail("Role does not exist."));
        };

        let selected: Vec<_> = request
            .role_claims
            .iter()
            .filter(|claim| claim.selected)
            .collect();

        if is_super_admin(&role.name) {
            if !self
                .users
                .is_in_role(&current_user.user_id, SUPER_ADMIN_ROLE)?
            {
                warn!(
                    "event=permissions_update module=role_service status=refused reason=not_super_admin user_id={}",
                    current_user.user_id
                );
                return Ok(ApiResult::fail(
                    "Not allowed to modify Permissions for this Role.",
                ));
            }
            let keeps_floor = SUPER_ADMIN_REQUIRED
                .iter()
                .all(|required| selected.iter().any(|claim| claim.value == *required));
            if !keeps_floor {
                return Ok(ApiResult::fail(format!(
                    "Not allowed to deselect {} or {} or {} for this Role.",
                    SUPER_ADMIN_REQUIRED[0], SUPER_ADMIN_REQUIRED[1], SUPER_ADMIN_REQUIRED[2]
                )));
            }
        }

        let unknown: Vec<String> = selected
            .iter()
            .filter(|claim| !is_known_permission(&claim.value))
            .map(|claim| format!("Permission {} is not recognized.", claim.value))
            .collect();
        if !unknown.is_empty() {
            return Ok(ApiResult::fail_many(unknown));
        }

        let mut claims: Vec<RoleClaim> = Vec::with_capacity(selected.len());
        for requested in selected {
            if claims.iter().any(|claim| claim.claim_value == requested.value) {
                continue;
            }
            let mut claim = RoleClaim::permission(role.id.as_str(), requested.value.as_str());
            claim.description = non_blank(requested.description.as_deref());
            claim.group = non_blank(requested.group.as_deref());
            claims.push(claim);
        }

        self.roles.replace_permission_claims(&role.id, &claims)?;
        info!(
            "event=permissions_update module=role_service status=ok role_id={} claim_count={}",
            role.id,
            claims.len()
        );
        Ok(ApiResult::message("Permissions Updated."))
    }

    pub fn get_count(&self) -> ServiceResult<i64> {
        Ok(self.roles.count_roles()?)
    }
}
