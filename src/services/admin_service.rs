use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    company::{Scope, company_user_ids},
    dto::users::{
        CompanyDetail, CompanyRecent, CompanyStats, CreateUserRequest, UpdateUserRequest, UserList,
    },
    entity::users::{Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{Principal, ensure_superadmin},
    models::User,
    permissions::{Permissions, Role},
    response::{ApiResponse, Meta},
    routes::params::UserListQuery,
    services::{
        accounts::{NewAccount, insert_account, update_account},
        imei_service, sold_service, stats_service,
    },
    state::AppState,
};

const RECENT_LIMIT: u64 = 5;

pub async fn list_admins(
    state: &AppState,
    principal: &Principal,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_superadmin(principal)?;
    let window = query.window();

    let mut condition = Condition::all().add(Column::Role.eq(Role::Admin.as_str()));
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

    Ok(ApiResponse::paged("Admins", UserList { items }, window, total))
}

async fn load_admin(state: &AppState, principal: &Principal, id: Uuid) -> AppResult<UserModel> {
    ensure_superadmin(principal)?;
    Users::find_by_id(id)
        .filter(Column::Role.eq(Role::Admin.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_admin(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    let admin = load_admin(state, principal, id).await?;
    Ok(ApiResponse::success("Admin", User::from(admin), Some(Meta::empty())))
}

/// Admin management is superadmin-only, so none of it reaches the activity log.
pub async fn create_admin(
    state: &AppState,
    principal: &Principal,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_superadmin(principal)?;
    let permissions = payload
        .permissions
        .filter(|p| !p.is_empty())
        .unwrap_or_else(Permissions::all);

    let admin = insert_account(
        &state.orm,
        NewAccount {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: Role::Admin,
            permissions,
            created_by: None,
        },
    )
    .await?;

    Ok(ApiResponse::success(
        "Admin created",
        User::from(admin),
        Some(Meta::empty()),
    ))
}

pub async fn update_admin(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let admin = load_admin(state, principal, id).await?;
    let (admin, _) = update_account(&state.orm, admin, payload).await?;

    Ok(ApiResponse::success("Updated", User::from(admin), Some(Meta::empty())))
}

/// Delete the admin account only. Staff and records are left in place and
/// remain visible to the superadmin.
pub async fn delete_admin(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let admin = load_admin(state, principal, id).await?;
    let result = Users::delete_by_id(admin.id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Company rollup: the admin, headline counts and the newest rows of each kind.
pub async fn company_detail(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<CompanyDetail>> {
    let admin = load_admin(state, principal, id).await?;
    let members = company_user_ids(&state.orm, admin.id).await?;
    let staff_count = members.len().saturating_sub(1) as u64;
    let scope = Scope::Owners(members);

    let stock_stats = stats_service::statistics_for_scope(&state.orm, &scope).await?;

    let staff = Users::find()
        .filter(Column::CreatedBy.eq(admin.id))
        .filter(Column::Role.eq(Role::Staff.as_str()))
        .order_by_desc(Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    let imei = imei_service::recent_for_scope(&state.orm, &scope, RECENT_LIMIT).await?;
    let sold = sold_service::recent_for_scope(&state.orm, &scope, RECENT_LIMIT).await?;

    let detail = CompanyDetail {
        admin: User::from(admin),
        stats: CompanyStats {
            staff_count,
            imei_count: stock_stats.total_count,
            sold_count: stock_stats.sold_count,
            stock_stats,
        },
        recent: CompanyRecent { staff, imei, sold },
    };

    Ok(ApiResponse::success("Company detail", detail, Some(Meta::empty())))
}
