//! `X-User-Id` request header extractor.

use super::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use posadmin_core::CurrentUser;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller named by `X-User-Id`; rejects with 401 when absent or blank.
pub struct Caller(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ApiError::new(StatusCode::UNAUTHORIZED, "X-User-Id header is required.")
            })?;
        Ok(Self(CurrentUser::new(user_id)))
    }
}
