use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::stats::StockStatistics,
    models::{ImeiRecord, SoldRecord, User},
    permissions::Permissions,
};

/// Account creation payload, shared by the admin and staff endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub permissions: Option<Permissions>,
    /// Company to attach a new staff account to. Only the superadmin sets this;
    /// an admin always creates staff under their own company.
    pub admin_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub permissions: Option<Permissions>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyStats {
    pub staff_count: u64,
    pub imei_count: u64,
    pub sold_count: u64,
    pub stock_stats: StockStatistics,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyRecent {
    pub staff: Vec<User>,
    pub imei: Vec<ImeiRecord>,
    pub sold: Vec<SoldRecord>,
}

/// Superadmin rollup of one company.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyDetail {
    pub admin: User,
    pub stats: CompanyStats,
    pub recent: CompanyRecent,
}
