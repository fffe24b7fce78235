use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, IntoCondition, Query, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit::{self, ActivityAction, ActivityEntry, EntityType, snapshot_changes},
    company::Scope,
    dto::sold::{CreateSoldRequest, SoldList, SoldWithImei, UpdateSoldRequest},
    entity::{
        imei_records::{Column as ImeiCol, Entity as ImeiRecords},
        sold_records::{ActiveModel, Column, Entity as SoldRecords, Model as SoldModel},
    },
    error::{AppError, AppResult, is_unique_violation},
    guard::{self, Operation},
    middleware::auth::{Principal, ensure_menu},
    models::{ImeiRecord, SoldRecord},
    permissions::MenuPermission,
    response::{ApiResponse, Meta},
    routes::params::{SoldListQuery, SortOrder},
    state::AppState,
};

/// Sales follow their IMEI: a sale is in scope when the IMEI's owner is.
/// Stats aggregate the same way.
fn scope_condition(scope: &Scope) -> Condition {
    match scope {
        Scope::All => Condition::all(),
        Scope::Owners(_) => Column::ImeiId
            .in_subquery(
                Query::select()
                    .column(ImeiCol::Id)
                    .from(ImeiRecords)
                    .cond_where(scope.condition(ImeiCol::CreatedBy))
                    .to_owned(),
            )
            .into_condition(),
    }
}

pub async fn list_sold(
    state: &AppState,
    principal: &Principal,
    query: SoldListQuery,
) -> AppResult<ApiResponse<SoldList>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let window = query.window();
    let scope = Scope::for_principal(&state.orm, principal).await?;

    let mut condition = Condition::all().add(scope_condition(&scope));
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::SoldName).ilike(pattern.clone()))
                .add(Expr::col(Column::Store).ilike(pattern)),
        );
    }
    if let Some(store) = query.store.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Store.eq(store));
    }
    if let Some(from) = query.date_from {
        condition = condition.add(Column::SoldDate.gte(from));
    }
    if let Some(to) = query.date_to {
        condition = condition.add(Column::SoldDate.lte(to));
    }
    if let Some(min) = query.min_amount {
        condition = condition.add(Column::SoldAmount.gte(min));
    }
    if let Some(max) = query.max_amount {
        condition = condition.add(Column::SoldAmount.lte(max));
    }

    let mut finder = SoldRecords::find().filter(condition);
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await?;
    let rows = finder
        .limit(window.per_page)
        .offset(window.offset())
        .all(&state.orm)
        .await?;
    let items = attach_imeis(&state.orm, rows).await?;

    Ok(ApiResponse::paged("Sold records", SoldList { items }, window, total))
}

async fn attach_imeis<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<SoldModel>,
) -> AppResult<Vec<SoldWithImei>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.imei_id).collect();
    let mut imeis: HashMap<Uuid, ImeiRecord> = if ids.is_empty() {
        HashMap::new()
    } else {
        ImeiRecords::find()
            .filter(ImeiCol::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|m| (m.id, ImeiRecord::from(m)))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|row| SoldWithImei {
            imei: imeis.remove(&row.imei_id),
            sold: SoldRecord::from(row),
        })
        .collect())
}

async fn find_sold<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<SoldModel> {
    SoldRecords::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_sold(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<SoldWithImei>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let row = find_sold(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Read, row.created_by).await?;

    let item = attach_imeis(&state.orm, vec![row])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Sold record", item, Some(Meta::empty())))
}

/// Mark an IMEI as sold. The IMEI must exist and be readable by the principal,
/// and an IMEI can only be sold once.
pub async fn create_sold(
    state: &AppState,
    principal: &Principal,
    payload: CreateSoldRequest,
) -> AppResult<ApiResponse<SoldRecord>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let imei = ImeiRecords::find_by_id(payload.imei_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    guard::authorize(&state.orm, principal, Operation::Read, imei.created_by).await?;

    let now = Utc::now();
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        imei_id: Set(imei.id),
        sold_name: Set(payload.sold_name.trim().to_string()),
        sold_amount: Set(payload.sold_amount),
        sold_date: Set(payload.sold_date),
        store: Set(payload.store.trim().to_string()),
        created_by: Set(principal.owner_id()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let sold = match active.insert(&state.orm).await {
        Ok(sold) => sold,
        Err(err) if is_unique_violation(&err) => {
            let existing = SoldRecords::find()
                .filter(Column::ImeiId.eq(imei.id))
                .one(&state.orm)
                .await?;
            return Err(AppError::Conflict {
                message: format!("IMEI {} is already sold", imei.imei),
                details: existing.map(|s| serde_json::json!({ "existing_id": s.id })),
            });
        }
        Err(err) => return Err(err.into()),
    };

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Create,
            EntityType::Sold,
            Some(sold.id),
            format!("Sold IMEI {}", imei.imei),
        )
        .with_metadata(serde_json::json!({
            "imei": imei.imei,
            "imei_id": imei.id,
            "sold_amount": sold.sold_amount,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Sold record created",
        SoldRecord::from(sold),
        Some(Meta::empty()),
    ))
}

pub async fn update_sold(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateSoldRequest,
) -> AppResult<ApiResponse<SoldRecord>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let existing = find_sold(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Update, existing.created_by).await?;

    let before = SoldRecord::from(existing.clone());
    let mut active: ActiveModel = existing.into();
    if let Some(sold_name) = payload.sold_name {
        active.sold_name = Set(sold_name.trim().to_string());
    }
    if let Some(sold_amount) = payload.sold_amount {
        active.sold_amount = Set(sold_amount);
    }
    if let Some(sold_date) = payload.sold_date {
        active.sold_date = Set(Some(sold_date));
    }
    if let Some(store) = payload.store {
        active.store = Set(store.trim().to_string());
    }
    active.updated_at = Set(Utc::now().into());
    let after = SoldRecord::from(active.update(&state.orm).await?);

    let changes = snapshot_changes(&before, &after);
    if !changes.is_empty() {
        audit::record(
            &state.orm,
            principal,
            ActivityEntry::new(
                ActivityAction::Update,
                EntityType::Sold,
                Some(after.id),
                "Updated sold record",
            )
            .with_metadata(serde_json::json!({ "imei_id": after.imei_id, "changes": changes })),
        )
        .await;
    }

    Ok(ApiResponse::success("Updated", after, Some(Meta::empty())))
}

/// Undo a sale. The IMEI goes back to available.
pub async fn delete_sold(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_menu(principal, MenuPermission::Stock)?;
    let existing = find_sold(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Delete, existing.created_by).await?;

    let result = SoldRecords::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Delete,
            EntityType::Sold,
            Some(id),
            "Deleted sold record",
        )
        .with_metadata(serde_json::json!({ "imei_id": existing.imei_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn recent_for_scope<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
    limit: u64,
) -> AppResult<Vec<SoldRecord>> {
    Ok(SoldRecords::find()
        .filter(scope_condition(scope))
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(conn)
        .await?
        .into_iter()
        .map(SoldRecord::from)
        .collect())
}
