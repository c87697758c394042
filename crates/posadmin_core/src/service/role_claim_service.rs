//! Direct role-claim administration.
//!
//! # Invariants
//! - Claims on the SuperAdmin role are changed by SuperAdmin members only.
//! - The SuperAdmin role never loses a `SUPER_ADMIN_REQUIRED` claim.
//! - New `Permission` claims carry a catalog value.

use super::{IdentityError, ServiceResult};
use crate::dto::{non_blank, RoleClaimRequest, RoleClaimResponse};
use crate::model::claim::{RoleClaim, PERMISSION_CLAIM_TYPE};
use crate::model::permission::{is_known_permission, SUPER_ADMIN_REQUIRED};
use crate::model::role::{is_super_admin, Role, SUPER_ADMIN_ROLE};
use crate::model::CurrentUser;
use crate::repo::role_repo::RoleRepository;
use crate::repo::user_repo::UserRepository;
use crate::wrapper::ApiResult;
use log::{info, warn};

pub struct RoleClaimService<R: RoleRepository, U: UserRepository> {
    roles: R,
    users: U,
}

impl<R: RoleRepository, U: UserRepository> RoleClaimService<R, U> {
    pub fn new(roles: R, users: U) -> Self {
        Self { roles, users }
    }

    /// `Some(failure)` when `current_user` may not touch the claims of `role`.
    fn refuse_outsider(
        &self,
        role: &Role,
        current_user: &CurrentUser,
    ) -> ServiceResult<Option<ApiResult<String>>> {
        if is_super_admin(&role.name)
            && !self
                .users
                .is_in_role(&current_user.user_id, SUPER_ADMIN_ROLE)?
        {
            warn!(
                "event=role_claim_change module=role_claim_service status=refused reason=not_super_admin user_id={}",
                current_user.user_id
            );
            return Ok(Some(ApiResult::fail(
                "Not allowed to modify Permissions for this Role.",
            )));
        }
        Ok(None)
    }

    pub fn get_all(&self) -> ServiceResult<ApiResult<Vec<RoleClaimResponse>>> {
        let claims = self.roles.list_claims()?;
        Ok(ApiResult::success(
            claims.into_iter().map(RoleClaimResponse::from).collect(),
        ))
    }

    pub fn get_count(&self) -> ServiceResult<usize> {
        Ok(self.roles.list_claims()?.len())
    }

    pub fn get_by_id(&self, id: i64) -> ServiceResult<ApiResult<RoleClaimResponse>> {
        let claim = self
            .roles
            .get_claim(id)?
            .ok_or_else(|| IdentityError::not_found("Role Claim Not Found"))?;
        Ok(ApiResult::success(claim.into()))
    }

    pub fn get_all_by_role_id(
        &self,
        role_id: &str,
    ) -> ServiceResult<ApiResult<Vec<RoleClaimResponse>>> {
        if self.roles.find_role_by_id(role_id)?.is_none() {
            return Ok(ApiResult::fail("Role does not exist."));
        }
        let claims = self.roles.list_claims_for_role(role_id)?;
        Ok(ApiResult::success(
            claims.into_iter().map(RoleClaimResponse::from).collect(),
        ))
    }

    /// Creates a claim when `request.id == 0`, otherwise updates its
    /// description and group.
    pub fn save(
        &self,
        request: &RoleClaimRequest,
        current_user: &CurrentUser,
    ) -> ServiceResult<ApiResult<String>> {
        if request.role_id.trim().is_empty() {
            return Ok(ApiResult::fail("Role is required."));
        }
        let Some(role) = self.roles.find_role_by_id(request.role_id.trim())? else {
            return Ok(ApiResult::fail("Role does not exist."));
        };
        if let Some(refused) = self.refuse_outsider(&role, current_user)? {
            return Ok(refused);
        }

        if request.id == 0 {
            let claim_type = request.claim_type.trim();
            let value = request.value.trim();
            if claim_type == PERMISSION_CLAIM_TYPE && !is_known_permission(value) {
                return Ok(ApiResult::fail(format!(
                    "Permission {value} is not recognized."
                )));
            }
            let held = self.roles.list_claims_for_role(&role.id)?;
            if held.iter().any(|claim| claim.matches(claim_type, value)) {
                return Err(IdentityError::bad_request(
                    "Similar Role Claim already exists.",
                ));
            }
            let claim = RoleClaim {
                id: 0,
                role_id: role.id.clone(),
                claim_type: claim_type.to_string(),
                claim_value: value.to_string(),
                description: non_blank(request.description.as_deref()),
                group: non_blank(request.group.as_deref()),
            };
            let id = self.roles.create_claim(&claim)?;
            info!("event=role_claim_create module=role_claim_service status=ok claim_id={id} role_id={}", role.id);
            return Ok(ApiResult::message("Role Claim Created."));
        }

        let mut claim = self
            .roles
            .get_claim(request.id)?
            .ok_or_else(|| IdentityError::not_found("Role Claim Not Found"))?;
        if claim.role_id != role.id {
            return Ok(ApiResult::fail("Role Claim belongs to a different Role."));
        }
        claim.description = non_blank(request.description.as_deref());
        claim.group = non_blank(request.group.as_deref());
        self.roles.update_claim(&claim)?;
        info!(
            "event=role_claim_update module=role_claim_service status=ok claim_id={}",
            claim.id
        );
        Ok(ApiResult::message("Role Claim Updated."))
    }

    pub fn delete(
        &self,
        id: i64,
        current_user: &CurrentUser,
    ) -> ServiceResult<ApiResult<String>> {
        let claim = self
            .roles
            .get_claim(id)?
            .ok_or_else(|| IdentityError::not_found("Role Claim Not Found"))?;
        if let Some(role) = self.roles.find_role_by_id(&claim.role_id)? {
            if let Some(refused) = self.refuse_outsider(&role, current_user)? {
                return Ok(refused);
            }
            if is_super_admin(&role.name)
                && claim.claim_type == PERMISSION_CLAIM_TYPE
                && SUPER_ADMIN_REQUIRED.contains(&claim.claim_value.as_str())
            {
                warn!("event=role_claim_delete module=role_claim_service status=refused reason=super_admin_floor claim_id={id}");
                return Ok(ApiResult::fail(format!(
                    "Not allowed to deselect {} or {} or {} for this Role.",
                    SUPER_ADMIN_REQUIRED[0], SUPER_ADMIN_REQUIRED[1], SUPER_ADMIN_REQUIRED[2]
                )));
            }
        }
        self.roles.delete_claim(claim.id)?;
        info!("event=role_claim_delete module=role_claim_service status=ok claim_id={id}");
        Ok(ApiResult::message(format!(
            "Role Claim {} Deleted.",
            claim.claim_value
        )))
    }
}
