use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ImeiRecord, SoldRecord};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSoldRequest {
    pub imei_id: Uuid,
    #[serde(default)]
    pub sold_name: String,
    #[serde(default)]
    pub sold_amount: i64,
    pub sold_date: Option<NaiveDate>,
    #[serde(default)]
    pub store: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSoldRequest {
    pub sold_name: Option<String>,
    pub sold_amount: Option<i64>,
    pub sold_date: Option<NaiveDate>,
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SoldWithImei {
    #[serde(flatten)]
    pub sold: SoldRecord,
    pub imei: Option<ImeiRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SoldList {
    #[schema(value_type = Vec<SoldWithImei>)]
    pub items: Vec<SoldWithImei>,
}
