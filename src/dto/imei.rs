use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ImeiRecord, SoldRecord};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateImeiRequest {
    pub imei: String,
    #[serde(default)]
    pub purchase: String,
    #[serde(default)]
    pub amount: i64,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub ram: String,
    #[serde(default)]
    pub storage: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateImeiRequest {
    pub imei: Option<String>,
    pub purchase: Option<String>,
    pub amount: Option<i64>,
    pub date: Option<NaiveDate>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImeiStatus {
    Available,
    Sold,
}

/// An IMEI record with its derived status and sale, if any.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImeiWithSale {
    #[serde(flatten)]
    pub record: ImeiRecord,
    pub status: ImeiStatus,
    pub sold: Option<SoldRecord>,
}

impl ImeiWithSale {
    pub fn new(record: ImeiRecord, sold: Option<SoldRecord>) -> Self {
        let status = if sold.is_some() {
            ImeiStatus::Sold
        } else {
            ImeiStatus::Available
        };
        Self {
            record,
            status,
            sold,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ImeiList {
    #[schema(value_type = Vec<ImeiWithSale>)]
    pub items: Vec<ImeiWithSale>,
}

/// Attached to a duplicate-IMEI conflict so the caller can offer "edit existing".
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImeiConflict {
    pub existing_id: Uuid,
    pub can_edit: bool,
}

/// Existence probe result. Foreign-company records report `access_denied`
/// without any field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ImeiCheckResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ImeiRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_denied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_sold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_record: Option<SoldRecord>,
}
