use chrono::{Days, NaiveDate};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    company::Scope,
    dto::activity::ActivityList,
    entity::activity_logs::{Column, Entity as ActivityLogs},
    error::AppResult,
    middleware::auth::{Principal, ensure_menu},
    models::ActivityLog,
    permissions::MenuPermission,
    response::ApiResponse,
    routes::params::ActivityListQuery,
    state::AppState,
};

fn day_start(date: NaiveDate) -> chrono::DateTime<chrono::Utc> {
    date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

/// Company-scoped audit trail, newest first.
pub async fn list_activity(
    state: &AppState,
    principal: &Principal,
    query: ActivityListQuery,
) -> AppResult<ApiResponse<ActivityList>> {
    ensure_menu(principal, MenuPermission::Activity)?;
    let window = query.window();
    let scope = Scope::for_principal(&state.orm, principal).await?;

    let mut condition = Condition::all().add(scope.condition(Column::UserId));
    if let Some(action) = query.action.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Action.eq(action));
    }
    if let Some(entity_type) = query.entity_type.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::EntityType.eq(entity_type));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(Column::UserId.eq(user_id));
    }
    if let Some(from) = query.date_from {
        condition = condition.add(Column::CreatedAt.gte(day_start(from)));
    }
    // Inclusive of the whole end day.
    if let Some(to) = query.date_to.and_then(|d| d.checked_add_days(Days::new(1))) {
        condition = condition.add(Column::CreatedAt.lt(day_start(to)));
    }

    let finder = ActivityLogs::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(window.per_page)
        .offset(window.offset())
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ActivityLog::from)
        .collect();

    Ok(ApiResponse::paged("Activity", ActivityList { items }, window, total))
}
