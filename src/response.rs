use serde::Serialize;
use utoipa::ToSchema;

use crate::routes::params::Page;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub total: Option<u64>,
    pub total_pages: Option<u64>,
}

impl Meta {
    pub fn new(page: Page, total: u64) -> Self {
        Self {
            page: Some(page.page),
            per_page: Some(page.per_page),
            total: Some(total),
            total_pages: Some(total.div_ceil(page.per_page)),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
            total_pages: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    pub fn paged(message: impl Into<String>, data: T, page: Page, total: u64) -> Self {
        Self::success(message, data, Some(Meta::new(page, total)))
    }
}
