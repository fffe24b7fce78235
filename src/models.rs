use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{activity_logs, brands, imei_records, sold_records, users},
    permissions::{Permissions, Role, normalize_permissions},
};

/// Public view of an account. The password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Permissions,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImeiRecord {
    pub id: Uuid,
    pub imei: String,
    pub purchase: String,
    pub amount: i64,
    pub date: Option<NaiveDate>,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub ram: String,
    pub storage: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SoldRecord {
    pub id: Uuid,
    pub imei_id: Uuid,
    pub sold_name: String,
    pub sold_amount: i64,
    pub sold_date: Option<NaiveDate>,
    pub store: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub metadata: Option<Value>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: model.id,
            // The users_role_check constraint keeps this parse total in practice.
            role: model.role.parse().unwrap_or(Role::Staff),
            permissions: normalize_permissions(model.permissions.as_ref()),
            name: model.name,
            email: model.email,
            created_by: model.created_by,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<brands::Model> for Brand {
    fn from(model: brands::Model) -> Self {
        Brand {
            id: model.id,
            name: model.name,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<imei_records::Model> for ImeiRecord {
    fn from(model: imei_records::Model) -> Self {
        ImeiRecord {
            id: model.id,
            imei: model.imei,
            purchase: model.purchase,
            amount: model.amount,
            date: model.date,
            brand: model.brand,
            model: model.model,
            color: model.color,
            ram: model.ram,
            storage: model.storage,
            created_by: model.created_by,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<sold_records::Model> for SoldRecord {
    fn from(model: sold_records::Model) -> Self {
        SoldRecord {
            id: model.id,
            imei_id: model.imei_id,
            sold_name: model.sold_name,
            sold_amount: model.sold_amount,
            sold_date: model.sold_date,
            store: model.store,
            created_by: model.created_by,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<activity_logs::Model> for ActivityLog {
    fn from(model: activity_logs::Model) -> Self {
        ActivityLog {
            id: model.id,
            user_id: model.user_id,
            user_name: model.user_name,
            action: model.action,
            entity_type: model.entity_type,
            entity_id: model.entity_id,
            description: model.description,
            metadata: model.metadata,
            ip_address: model.ip_address,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
