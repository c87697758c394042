//! Role and permission calls used by the console.

use crate::http::HttpClient;
use crate::models::{ApiResult, Permission, Role};
use crate::Error;

#[derive(Debug, Clone)]
pub struct RoleApiClient {
    http: HttpClient,
}

impl RoleApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(base_url, None)?,
        })
    }

    /// Client that identifies as `user_id`; required for permission updates.
    pub fn as_user(base_url: impl Into<String>, user_id: &str) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(base_url, Some(user_id))?,
        })
    }

    pub async fn get_roles(&self) -> Result<ApiResult<Vec<Role>>, Error> {
        self.http.send(self.http.get(&["roles"])?).await
    }

    /// Creates `role` when it has no id, otherwise updates it.
    pub async fn save_role(&self, role: &Role) -> Result<ApiResult<String>, Error> {
        self.http.send(self.http.post(&["roles"])?.json(role)).await
    }

    pub async fn delete_role(&self, id: &str) -> Result<ApiResult<String>, Error> {
        self.http.send(self.http.delete(&["roles", id])?).await
    }

    pub async fn get_permissions(&self, role_id: &str) -> Result<ApiResult<Permission>, Error> {
        self.http
            .send(self.http.get(&["roles", "permissions", role_id])?)
            .await
    }

    pub async fn update_permissions(
        &self,
        permission: &Permission,
    ) -> Result<ApiResult<String>, Error> {
        self.http
            .send(self.http.put(&["roles", "permissions"])?.json(permission))
            .await
    }
}
