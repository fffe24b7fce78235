use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit::{self, ActivityAction, ActivityEntry, EntityType},
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::{
        brands::{Column as BrandCol, Entity as Brands},
        imei_records::{Column as ImeiCol, Entity as ImeiRecords},
        sold_records::{Column as SoldCol, Entity as SoldRecords},
        users::{Column, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    guard::{self, Operation},
    middleware::auth::{Principal, ensure_manager, ensure_menu},
    models::User,
    permissions::{MenuPermission, Permissions, Role},
    response::{ApiResponse, Meta},
    routes::params::UserListQuery,
    services::accounts::{NewAccount, insert_account, update_account},
    state::AppState,
};

pub async fn list_staff(
    state: &AppState,
    principal: &Principal,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_manager(principal)?;
    ensure_menu(principal, MenuPermission::Staff)?;
    let window = query.window();

    let mut condition = Condition::all().add(Column::Role.eq(Role::Staff.as_str()));
    if principal.role == Role::Admin {
        condition = condition.add(Column::CreatedBy.eq(principal.user_id));
    }
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Email).ilike(pattern)),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(window.per_page)
        .offset(window.offset())
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::paged("Staff", UserList { items }, window, total))
}

/// Load a staff account and run the guard against the admin that owns it.
async fn load_staff(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    op: Operation,
) -> AppResult<UserModel> {
    ensure_manager(principal)?;
    ensure_menu(principal, MenuPermission::Staff)?;
    let staff = Users::find_by_id(id)
        .filter(Column::Role.eq(Role::Staff.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    // Accounts are never shared: a staff row without an admin is superadmin-only.
    if staff.created_by.is_none() && principal.role != Role::Superadmin {
        return Err(AppError::Forbidden(
            "Staff account is not assigned to an admin".into(),
        ));
    }
    guard::authorize(&state.orm, principal, op, staff.created_by).await?;
    Ok(staff)
}

pub async fn get_staff(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    let staff = load_staff(state, principal, id, Operation::Read).await?;
    Ok(ApiResponse::success("Staff", User::from(staff), Some(Meta::empty())))
}

pub async fn create_staff(
    state: &AppState,
    principal: &Principal,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_manager(principal)?;
    ensure_menu(principal, MenuPermission::Staff)?;

    let admin_id = match principal.role {
        Role::Admin => principal.user_id,
        _ => {
            let admin_id = payload
                .admin_id
                .ok_or_else(|| AppError::BadRequest("admin_id is required".into()))?;
            let is_admin = Users::find_by_id(admin_id)
                .filter(Column::Role.eq(Role::Admin.as_str()))
                .count(&state.orm)
                .await?
                > 0;
            if !is_admin {
                return Err(AppError::BadRequest("admin_id must reference an admin".into()));
            }
            admin_id
        }
    };

    let permissions = payload
        .permissions
        .filter(|p| !p.is_empty())
        .unwrap_or_else(Permissions::staff_default)
        .restrict_for_staff();

    let staff = insert_account(
        &state.orm,
        NewAccount {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: Role::Staff,
            permissions,
            created_by: Some(admin_id),
        },
    )
    .await?;

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Create,
            EntityType::Staff,
            Some(staff.id),
            format!("Added staff {}", staff.name),
        )
        .with_metadata(serde_json::json!({ "email": staff.email })),
    )
    .await;

    Ok(ApiResponse::success(
        "Staff created",
        User::from(staff),
        Some(Meta::empty()),
    ))
}

pub async fn update_staff(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let staff = load_staff(state, principal, id, Operation::Update).await?;
    let (staff, changed) = update_account(&state.orm, staff, payload).await?;

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Update,
            EntityType::Staff,
            Some(staff.id),
            format!("Updated staff {}", staff.name),
        )
        .with_metadata(serde_json::json!({ "fields": changed })),
    )
    .await;

    Ok(ApiResponse::success("Updated", User::from(staff), Some(Meta::empty())))
}

/// Remove a staff account. Their records move to the company admin so they
/// stay inside the company instead of becoming orphaned.
pub async fn delete_staff(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let staff = load_staff(state, principal, id, Operation::Delete).await?;

    let txn = state.orm.begin().await?;
    if let Some(admin_id) = staff.created_by {
        ImeiRecords::update_many()
            .col_expr(ImeiCol::CreatedBy, Expr::value(admin_id))
            .filter(ImeiCol::CreatedBy.eq(staff.id))
            .exec(&txn)
            .await?;
        SoldRecords::update_many()
            .col_expr(SoldCol::CreatedBy, Expr::value(admin_id))
            .filter(SoldCol::CreatedBy.eq(staff.id))
            .exec(&txn)
            .await?;
        Brands::update_many()
            .col_expr(BrandCol::CreatedBy, Expr::value(admin_id))
            .filter(BrandCol::CreatedBy.eq(staff.id))
            .exec(&txn)
            .await?;
    }
    Users::delete_by_id(staff.id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Delete,
            EntityType::Staff,
            Some(id),
            format!("Deleted staff {}", staff.name),
        )
        .with_metadata(serde_json::json!({ "email": staff.email })),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
