use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit::{self, ActivityAction, ActivityEntry, EntityType},
    company::Scope,
    dto::brands::{BrandList, CreateBrandRequest, UpdateBrandRequest},
    entity::brands::{ActiveModel, Column, Entity as Brands, Model as BrandModel},
    error::{AppError, AppResult, is_unique_violation},
    guard::{self, Operation},
    middleware::auth::{Principal, ensure_menu},
    models::Brand,
    permissions::MenuPermission,
    response::{ApiResponse, Meta},
    routes::params::BrandListQuery,
    state::AppState,
};

/// Brands visible to the principal: shared ones plus the company's own.
///
/// Not menu-gated, since the stock forms need the brand list too.
pub async fn list_brands(
    state: &AppState,
    principal: &Principal,
    query: BrandListQuery,
) -> AppResult<ApiResponse<BrandList>> {
    let window = query.window();
    let scope = Scope::for_principal(&state.orm, principal).await?;

    let mut condition = Condition::all().add(scope.condition_with_shared(Column::CreatedBy));
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{search}%")));
    }
    if query.active_only.unwrap_or(false) {
        condition = condition.add(Column::IsActive.eq(true));
    }

    let finder = Brands::find().filter(condition).order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(window.per_page)
        .offset(window.offset())
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Brand::from)
        .collect();

    Ok(ApiResponse::paged("Brands", BrandList { items }, window, total))
}

async fn find_brand<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<BrandModel> {
    Brands::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_brand(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<Brand>> {
    let brand = find_brand(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Read, brand.created_by).await?;
    Ok(ApiResponse::success("Brand", Brand::from(brand), Some(Meta::empty())))
}

fn brand_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("brand name is required".into()));
    }
    Ok(name.to_string())
}

fn brand_conflict(name: &str) -> AppError {
    AppError::conflict(format!("Brand '{name}' already exists"))
}

pub async fn create_brand(
    state: &AppState,
    principal: &Principal,
    payload: CreateBrandRequest,
) -> AppResult<ApiResponse<Brand>> {
    ensure_menu(principal, MenuPermission::Brands)?;
    let name = brand_name(&payload.name)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_by: Set(principal.owner_id()),
        created_at: Set(Utc::now().into()),
    };
    let brand = match active.insert(&state.orm).await {
        Ok(brand) => brand,
        Err(err) if is_unique_violation(&err) => return Err(brand_conflict(&name)),
        Err(err) => return Err(err.into()),
    };

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Create,
            EntityType::Brand,
            Some(brand.id),
            format!("Added brand {}", brand.name),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Brand created",
        Brand::from(brand),
        Some(Meta::empty()),
    ))
}

pub async fn update_brand(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateBrandRequest,
) -> AppResult<ApiResponse<Brand>> {
    ensure_menu(principal, MenuPermission::Brands)?;
    let existing = find_brand(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Update, existing.created_by).await?;

    let before = Brand::from(existing.clone());
    let mut active: ActiveModel = existing.into();
    let mut name = before.name.clone();
    if let Some(raw) = payload.name.as_deref() {
        name = brand_name(raw)?;
        active.name = Set(name.clone());
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let brand = match active.update(&state.orm).await {
        Ok(brand) => brand,
        Err(err) if is_unique_violation(&err) => return Err(brand_conflict(&name)),
        Err(err) => return Err(err.into()),
    };
    let after = Brand::from(brand);

    let changes = audit::snapshot_changes(&before, &after);
    if !changes.is_empty() {
        audit::record(
            &state.orm,
            principal,
            ActivityEntry::new(
                ActivityAction::Update,
                EntityType::Brand,
                Some(after.id),
                format!("Updated brand {}", after.name),
            )
            .with_metadata(serde_json::json!({ "changes": changes })),
        )
        .await;
    }

    Ok(ApiResponse::success("Updated", after, Some(Meta::empty())))
}

/// IMEI records keep their brand text; there is no cascade.
pub async fn delete_brand(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_menu(principal, MenuPermission::Brands)?;
    let existing = find_brand(&state.orm, id).await?;
    guard::authorize(&state.orm, principal, Operation::Delete, existing.created_by).await?;

    let result = Brands::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Delete,
            EntityType::Brand,
            Some(id),
            format!("Deleted brand {}", existing.name),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
