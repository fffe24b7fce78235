use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::activity::ActivityList,
    error::AppResult,
    middleware::auth::Principal,
    response::ApiResponse,
    routes::params::ActivityListQuery,
    services::activity_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_activity))
}

#[utoipa::path(
    get,
    path = "/api/activity",
    params(ActivityListQuery),
    responses(
        (status = 200, description = "Company activity log, newest first", body = ApiResponse<ActivityList>),
        (status = 403, description = "Missing activity permission"),
    ),
    security(("bearer_auth" = [])),
    tag = "Activity"
)]
pub async fn list_activity(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ActivityListQuery>,
) -> AppResult<Json<ApiResponse<ActivityList>>> {
    let resp = activity_service::list_activity(&state, &principal, query).await?;
    Ok(Json(resp))
}
