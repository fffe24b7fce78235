use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::stats::StockStatistics,
    error::AppResult,
    middleware::auth::Principal,
    response::ApiResponse,
    services::stats_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(stock_statistics))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Stock counts and amounts", body = ApiResponse<StockStatistics>),
        (status = 403, description = "Missing dashboard permission"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn stock_statistics(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<StockStatistics>>> {
    let resp = stats_service::stock_statistics(&state, &principal).await?;
    Ok(Json(resp))
}
