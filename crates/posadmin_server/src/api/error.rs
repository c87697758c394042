//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use posadmin_core::{ApiResult, IdentityError};

const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// A status code plus the failure messages sent in an `ApiResult` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Logs `detail` and answers with a generic 500.
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!("event=request_failed module=api status=error error={detail}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<IdentityError> for ApiError {
    fn from(value: IdentityError) -> Self {
        match value {
            IdentityError::Repo(err) => Self::internal(err.to_string()),
            other => {
                let status = StatusCode::from_u16(other.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Self::new(status, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResult<()> = ApiResult::fail(self.message);
        (self.status, Json(body)).into_response()
    }
}
