use std::fmt;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::{DbPool, pg_pool},
    error::AppResult,
    middleware::auth::Principal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Imei,
    Sold,
    Brand,
    Staff,
    Admin,
    Profile,
    Auth,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Login => "login",
        }
    }
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Imei => "imei",
            EntityType::Sold => "sold",
            EntityType::Brand => "brand",
            EntityType::Staff => "staff",
            EntityType::Admin => "admin",
            EntityType::Profile => "profile",
            EntityType::Auth => "auth",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub action: ActivityAction,
    pub entity_type: EntityType,
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub metadata: Option<Value>,
}

impl ActivityEntry {
    pub fn new(
        action: ActivityAction,
        entity_type: EntityType,
        entity_id: Option<Uuid>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action,
            entity_type,
            entity_id,
            description: description.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Append an activity row. Superadmin principals are never audited.
///
/// Failures are logged and swallowed; the caller's operation has already succeeded.
pub async fn record(orm: &DatabaseConnection, principal: &Principal, entry: ActivityEntry) {
    if principal.is_superadmin() {
        return;
    }
    if let Err(err) = log_activity(pg_pool(orm), principal, &entry).await {
        tracing::warn!(
            error = %err,
            action = %entry.action,
            entity_type = %entry.entity_type,
            "audit log failed"
        );
    }
}

pub async fn log_activity(
    pool: &DbPool,
    principal: &Principal,
    entry: &ActivityEntry,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO activity_logs
            (id, user_id, user_name, action, entity_type, entity_id, description, metadata, ip_address)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(principal.user_id)
    .bind(principal.name.as_str())
    .bind(entry.action.as_str())
    .bind(entry.entity_type.as_str())
    .bind(entry.entity_id)
    .bind(entry.description.as_str())
    .bind(entry.metadata.as_ref())
    .bind(principal.ip_address.as_deref())
    .execute(pool)
    .await?;

    Ok(())
}

/// Per-field `{from, to}` for every key whose value differs between two snapshots.
///
/// Both sides are expected to be JSON objects; keys missing on one side count as `null`.
pub fn field_changes(before: &Value, after: &Value) -> Map<String, Value> {
    let empty = Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let mut keys: Vec<&String> = before.keys().chain(after.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut changes = Map::new();
    for key in keys {
        let from = before.get(key).unwrap_or(&Value::Null);
        let to = after.get(key).unwrap_or(&Value::Null);
        if from != to {
            changes.insert(
                key.clone(),
                serde_json::json!({ "from": from, "to": to }),
            );
        }
    }
    changes
}

/// [`field_changes`] over two serializable snapshots, ignoring `updated_at`.
pub fn snapshot_changes<T: Serialize>(before: &T, after: &T) -> Map<String, Value> {
    let before = serde_json::to_value(before).unwrap_or_default();
    let after = serde_json::to_value(after).unwrap_or_default();
    let mut changes = field_changes(&before, &after);
    changes.remove("updated_at");
    changes
}
