use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, Query, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit::{self, ActivityAction, ActivityEntry, EntityType, snapshot_changes},
    company::Scope,
    dto::imei::{
        CreateImeiRequest, ImeiCheckResponse, ImeiConflict, ImeiList, ImeiWithSale,
        UpdateImeiRequest,
    },
    entity::{
        imei_records::{ActiveModel, Column, Entity as ImeiRecords, Model as ImeiModel},
        sold_records::{Column as SoldCol, Entity as SoldRecords},
    },
    error::{AppError, AppResult, is_unique_violation},
    export,
    guard::{self, Operation},
    middleware::auth::{Principal, ensure_menu},
    models::{ImeiRecord, SoldRecord},
    permissions::MenuPermission,
    response::{ApiResponse, Meta},
    routes::params::{ImeiListQuery, SoldStatus, SortOrder},
    state::AppState,
};

pub async fn list_imei(
    state: &AppState,
    principal: &Principal,
    query: ImeiListQuery,
) -> AppResult<ApiResponse<ImeiList>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let window = query.window();
    let scope = Scope::for_principal(&state.orm, principal).await?;

    let mut finder = ImeiRecords::find().filter(list_condition(&scope, &query));
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await?;

    let records = finder
        .limit(window.per_page)
        .offset(window.offset())
        .all(&state.orm)
        .await?;
    let items = attach_sales(&state.orm, records).await?;

    Ok(ApiResponse::paged("IMEI records", ImeiList { items }, window, total))
}

/// Number of IMEI records visible to the principal.
pub async fn count_imei_records<C: ConnectionTrait>(
    conn: &C,
    principal: &Principal,
) -> AppResult<u64> {
    let scope = Scope::for_principal(conn, principal).await?;
    let total = ImeiRecords::find()
        .filter(scope.condition(Column::CreatedBy))
        .count(conn)
        .await?;
    Ok(total)
}

fn list_condition(scope: &Scope, query: &ImeiListQuery) -> Condition {
    let mut condition = Condition::all().add(scope.condition(Column::CreatedBy));

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Imei).ilike(pattern.clone()))
                .add(Expr::col(Column::Purchase).ilike(pattern.clone()))
                .add(Expr::col(Column::Brand).ilike(pattern.clone()))
                .add(Expr::col(Column::Model).ilike(pattern)),
        );
    }

    let equals = [
        (Column::Brand, &query.brand),
        (Column::Model, &query.model),
        (Column::Color, &query.color),
        (Column::Ram, &query.ram),
        (Column::Storage, &query.storage),
    ];
    for (col, value) in equals {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            condition = condition.add(col.eq(v));
        }
    }

    if let Some(from) = query.date_from {
        condition = condition.add(Column::Date.gte(from));
    }
    if let Some(to) = query.date_to {
        condition = condition.add(Column::Date.lte(to));
    }
    if let Some(min) = query.min_amount {
        condition = condition.add(Column::Amount.gte(min));
    }
    if let Some(max) = query.max_amount {
        condition = condition.add(Column::Amount.lte(max));
    }

    if let Some(status) = query.status {
        let sold_ids = Query::select()
            .column(SoldCol::ImeiId)
            .from(SoldRecords)
            .to_owned();
        condition = condition.add(match status {
            SoldStatus::Sold => Column::Id.in_subquery(sold_ids),
            SoldStatus::Available => Column::Id.not_in_subquery(sold_ids),
        });
    }

    condition
}

/// Most recent sale per IMEI id.
pub async fn latest_sales<C: ConnectionTrait>(
    conn: &C,
    imei_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, SoldRecord>> {
    if imei_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = SoldRecords::find()
        .filter(SoldCol::ImeiId.is_in(imei_ids))
        .order_by_desc(SoldCol::CreatedAt)
        .all(conn)
        .await?;

    let mut latest = HashMap::new();
    for row in rows {
        latest.entry(row.imei_id).or_insert_with(|| SoldRecord::from(row));
    }
    Ok(latest)
}

pub async fn attach_sales<C: ConnectionTrait>(
    conn: &C,
    records: Vec<ImeiModel>,
) -> AppResult<Vec<ImeiWithSale>> {
    let mut sales = latest_sales(conn, records.iter().map(|r| r.id).collect()).await?;
    Ok(records
        .into_iter()
        .map(|r| {
            let sold = sales.remove(&r.id);
            ImeiWithSale::new(ImeiRecord::from(r), sold)
        })
        .collect())
}

pub async fn get_imei(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<ImeiWithSale>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let record = find_imei(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Read, record.created_by).await?;

    let item = attach_sales(&state.orm, vec![record])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("IMEI record", item, Some(Meta::empty())))
}

async fn find_imei<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ImeiModel> {
    ImeiRecords::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn create_imei(
    state: &AppState,
    principal: &Principal,
    payload: CreateImeiRequest,
) -> AppResult<ApiResponse<ImeiRecord>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let imei = payload.imei.trim().to_string();
    if imei.is_empty() {
        return Err(AppError::BadRequest("imei is required".into()));
    }

    let now = Utc::now();
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        imei: Set(imei.clone()),
        purchase: Set(payload.purchase.trim().to_string()),
        amount: Set(payload.amount),
        date: Set(payload.date),
        brand: Set(payload.brand.trim().to_string()),
        model: Set(payload.model.trim().to_string()),
        color: Set(payload.color.trim().to_string()),
        ram: Set(payload.ram.trim().to_string()),
        storage: Set(payload.storage.trim().to_string()),
        created_by: Set(principal.owner_id()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    // The unique index is the only duplicate check; no lookup before the insert.
    let record = match active.insert(&state.orm).await {
        Ok(record) => record,
        Err(err) if is_unique_violation(&err) => {
            return Err(duplicate_imei(&state.orm, principal, &imei).await);
        }
        Err(err) => return Err(err.into()),
    };

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Create,
            EntityType::Imei,
            Some(record.id),
            format!("Added IMEI {}", record.imei),
        )
        .with_metadata(serde_json::json!({
            "imei": record.imei,
            "brand": record.brand,
            "model": record.model,
            "amount": record.amount,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "IMEI record created",
        ImeiRecord::from(record),
        Some(Meta::empty()),
    ))
}

/// Build the CONFLICT for an IMEI that already exists, telling the caller
/// whether "edit existing" is an option for them.
async fn duplicate_imei(conn: &DatabaseConnection, principal: &Principal, imei: &str) -> AppError {
    let existing = ImeiRecords::find()
        .filter(Column::Imei.eq(imei))
        .one(conn)
        .await;
    let details = match existing {
        Ok(Some(existing)) => {
            let can_edit = guard::check(conn, principal, Operation::Update, existing.created_by)
                .await
                .map(|d| d.is_allowed())
                .unwrap_or(false);
            serde_json::to_value(ImeiConflict {
                existing_id: existing.id,
                can_edit,
            })
            .ok()
        }
        _ => None,
    };
    AppError::Conflict {
        message: format!("IMEI {imei} already exists"),
        details,
    }
}

pub async fn update_imei(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateImeiRequest,
) -> AppResult<ApiResponse<ImeiRecord>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let existing = find_imei(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Update, existing.created_by).await?;

    let before = ImeiRecord::from(existing.clone());
    let mut active: ActiveModel = existing.into();
    let mut new_imei = None;
    if let Some(imei) = payload.imei {
        let imei = imei.trim().to_string();
        if imei.is_empty() {
            return Err(AppError::BadRequest("imei must not be empty".into()));
        }
        new_imei = Some(imei.clone());
        active.imei = Set(imei);
    }
    if let Some(purchase) = payload.purchase {
        active.purchase = Set(purchase.trim().to_string());
    }
    if let Some(amount) = payload.amount {
        active.amount = Set(amount);
    }
    if let Some(date) = payload.date {
        active.date = Set(Some(date));
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(brand.trim().to_string());
    }
    if let Some(model) = payload.model {
        active.model = Set(model.trim().to_string());
    }
    if let Some(color) = payload.color {
        active.color = Set(color.trim().to_string());
    }
    if let Some(ram) = payload.ram {
        active.ram = Set(ram.trim().to_string());
    }
    if let Some(storage) = payload.storage {
        active.storage = Set(storage.trim().to_string());
    }
    active.updated_at = Set(Utc::now().into());

    let record = match active.update(&state.orm).await {
        Ok(record) => record,
        Err(err) if is_unique_violation(&err) => {
            let imei = new_imei.unwrap_or_default();
            return Err(duplicate_imei(&state.orm, principal, &imei).await);
        }
        Err(err) => return Err(err.into()),
    };
    let after = ImeiRecord::from(record);

    let changes = snapshot_changes(&before, &after);
    if !changes.is_empty() {
        audit::record(
            &state.orm,
            principal,
            ActivityEntry::new(
                ActivityAction::Update,
                EntityType::Imei,
                Some(after.id),
                format!("Updated IMEI {}", after.imei),
            )
            .with_metadata(serde_json::json!({ "changes": changes })),
        )
        .await;
    }

    Ok(ApiResponse::success("Updated", after, Some(Meta::empty())))
}

pub async fn delete_imei(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let existing = find_imei(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Delete, existing.created_by).await?;

    let txn = state.orm.begin().await?;
    SoldRecords::delete_many()
        .filter(SoldCol::ImeiId.eq(id))
        .exec(&txn)
        .await?;
    let result = ImeiRecords::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Delete,
            EntityType::Imei,
            Some(id),
            format!("Deleted IMEI {}", existing.imei),
        )
        .with_metadata(serde_json::json!({ "imei": existing.imei })),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Existence probe used by the scanner flow.
///
/// A record owned by another company reports `access_denied` and nothing else.
pub async fn check_imei(
    state: &AppState,
    principal: &Principal,
    imei: &str,
) -> AppResult<ApiResponse<ImeiCheckResponse>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let imei = imei.trim();
    if imei.is_empty() {
        return Err(AppError::BadRequest("imei is required".into()));
    }

    let existing = ImeiRecords::find()
        .filter(Column::Imei.eq(imei))
        .one(&state.orm)
        .await?;
    let Some(existing) = existing else {
        return Ok(ApiResponse::success(
            "IMEI not found",
            ImeiCheckResponse::default(),
            Some(Meta::empty()),
        ));
    };

    let decision =
        guard::check(&state.orm, principal, Operation::Read, existing.created_by).await?;
    if !decision.is_allowed() {
        let data = ImeiCheckResponse {
            exists: true,
            access_denied: Some(true),
            message: Some("This IMEI belongs to another company".into()),
            ..Default::default()
        };
        return Ok(ApiResponse::success("IMEI exists", data, Some(Meta::empty())));
    }

    let sold = latest_sales(&state.orm, vec![existing.id])
        .await?
        .remove(&existing.id);
    let data = ImeiCheckResponse {
        exists: true,
        record: Some(ImeiRecord::from(existing)),
        access_denied: Some(false),
        message: None,
        already_sold: Some(sold.is_some()),
        sold_record: sold,
    };
    Ok(ApiResponse::success("IMEI exists", data, Some(Meta::empty())))
}

/// Every scoped IMEI record with its sale, rendered as CSV.
pub async fn export_csv(state: &AppState, principal: &Principal) -> AppResult<String> {
    ensure_menu(principal, MenuPermission::Reports)?;
    let scope = Scope::for_principal(&state.orm, principal).await?;

    let records = ImeiRecords::find()
        .filter(scope.condition(Column::CreatedBy))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = attach_sales(&state.orm, records).await?;

    Ok(export::to_csv(&items)?)
}

/// Newest IMEI records for a set of owners.
pub async fn recent_for_scope<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
    limit: u64,
) -> AppResult<Vec<ImeiRecord>> {
    Ok(ImeiRecords::find()
        .filter(scope.condition(Column::CreatedBy))
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(conn)
        .await?
        .into_iter()
        .map(ImeiRecord::from)
        .collect())
}
