//! User administration calls.

use crate::http::HttpClient;
use crate::models::{ApiResult, PaginatedResult, User, UserParams, UserRoles};
use crate::Error;

/// Query-string pairs for `params`, in `searchString`, `pageNumber`,
/// `pageSize`, `orderBy` order.
pub fn user_query_params(params: &UserParams) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(search) = params.search_string.as_deref().filter(|s| !s.is_empty()) {
        query.push(("searchString", search.to_string()));
    }
    if let Some(page_number) = params.page_number.filter(|&n| n != 0) {
        query.push(("pageNumber", page_number.to_string()));
    }
    if let Some(page_size) = params.page_size.filter(|&n| n != 0) {
        query.push(("pageSize", page_size.to_string()));
    }
    if let Some(order_by) = params.order_by.as_deref().filter(|s| !s.is_empty()) {
        query.push(("orderBy", order_by.to_string()));
    }
    query
}

#[derive(Debug, Clone)]
pub struct UserApiClient {
    http: HttpClient,
}

impl UserApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(base_url, None)?,
        })
    }

    /// Client that identifies as `user_id`; required for deletes and
    /// membership changes.
    pub fn as_user(base_url: impl Into<String>, user_id: &str) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(base_url, Some(user_id))?,
        })
    }

    pub async fn get_users(&self, params: &UserParams) -> Result<PaginatedResult<User>, Error> {
        let request = self.http.get(&["users"])?.query(&user_query_params(params));
        self.http.send(request).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<User, Error> {
        self.http.send(self.http.get(&["users", id])?).await
    }

    pub async fn create_user(&self, user: &User) -> Result<ApiResult<User>, Error> {
        self.http.send(self.http.post(&["users"])?.json(user)).await
    }

    pub async fn update_user(&self, user: &User) -> Result<ApiResult<User>, Error> {
        self.http.send(self.http.put(&["users"])?.json(user)).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<ApiResult<String>, Error> {
        self.http.send(self.http.delete(&["users", id])?).await
    }

    pub async fn get_user_roles(&self, id: &str) -> Result<ApiResult<UserRoles>, Error> {
        self.http
            .send(self.http.get(&["users", "roles", id])?)
            .await
    }

    pub async fn update_user_roles(
        &self,
        id: &str,
        roles: &UserRoles,
    ) -> Result<ApiResult<String>, Error> {
        self.http
            .send(self.http.put(&["users", "roles", id])?.json(roles))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::user_query_params;
    use crate::models::UserParams;

    #[test]
    fn empty_params_produce_no_query() {
        assert!(user_query_params(&UserParams::default()).is_empty());
        let blank = UserParams {
            search_string: Some(String::new()),
            page_number: Some(0),
            page_size: Some(0),
            order_by: Some(String::new()),
        };
        assert!(user_query_params(&blank).is_empty());
    }

    #[test]
    fn present_params_keep_wire_names_and_order() {
        let params = UserParams {
            search_string: Some("doe".to_string()),
            page_number: Some(2),
            page_size: None,
            order_by: Some("email desc".to_string()),
        };
        assert_eq!(
            user_query_params(&params),
            vec![
                ("searchString", "doe".to_string()),
                ("pageNumber", "2".to_string()),
                ("orderBy", "email desc".to_string()),
            ]
        );
    }
}
