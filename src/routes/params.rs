use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;
/// Highest page number accepted; larger requests land here and come back empty.
pub const MAX_PAGE: u64 = 1_000_000_000;

/// Raw paging input. Values are accepted as signed so that `page=0` or
/// `per_page=-5` are clamped instead of rejected by the extractor.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Normalized paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
}

impl Page {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn normalize(&self) -> Page {
        let page = (self.page.unwrap_or(1).max(1) as u64).min(MAX_PAGE);
        let per_page = match self.per_page {
            Some(n) if n >= 1 => (n as u64).min(MAX_PER_PAGE),
            _ => DEFAULT_PER_PAGE,
        };
        Page { page, per_page }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SoldStatus {
    Available,
    Sold,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImeiListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Matches IMEI, purchase name, brand or model.
    pub q: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub status: Option<SoldStatus>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SoldListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Matches buyer name or store.
    pub q: Option<String>,
    pub store: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrandListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Matches name or email.
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub user_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImeiCheckQuery {
    pub imei: String,
}

macro_rules! paged_query {
    ($($ty:ty),+ $(,)?) => {
        $(impl $ty {
            pub fn window(&self) -> Page {
                Pagination {
                    page: self.page,
                    per_page: self.per_page,
                }
                .normalize()
            }
        })+
    };
}

paged_query!(
    ImeiListQuery,
    SoldListQuery,
    BrandListQuery,
    UserListQuery,
    ActivityListQuery,
);
