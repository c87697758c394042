//! Result envelopes returned by every service call and REST endpoint.
//!
//! # Invariants
//! - `succeeded == false` envelopes never carry `data`.
//! - Paginated envelopes report `total_pages >= 1` only when `total_count > 0`.

use serde::{Deserialize, Serialize};

/// Success/failure wrapper with human-readable messages and optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult<T> {
    pub succeeded: bool,
    #[serde(default)]
    pub messages: Vec<String>,
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            succeeded: true,
            messages: Vec::new(),
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            messages: vec![message.into()],
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::fail_many(vec![message.into()])
    }

    pub fn fail_many(messages: Vec<String>) -> Self {
        Self {
            succeeded: false,
            messages,
            data: None,
        }
    }
}

impl ApiResult<String> {
    /// Success whose payload is the message itself.
    pub fn message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::success_with_message(message.clone(), message)
    }
}

/// One page of items plus paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub succeeded: bool,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl<T> PaginatedResult<T> {
    pub fn success(data: Vec<T>, total_count: u64, page_number: u32, page_size: u32) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(u64::from(page_size)) as u32
        };
        Self {
            data,
            total_count,
            page_number,
            page_size,
            total_pages,
            has_previous_page: page_number > 1,
            has_next_page: page_number < total_pages,
            succeeded: true,
            messages: Vec::new(),
        }
    }
}
