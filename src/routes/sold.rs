use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::sold::{CreateSoldRequest, SoldList, SoldWithImei, UpdateSoldRequest},
    error::AppResult,
    middleware::auth::Principal,
    models::SoldRecord,
    response::ApiResponse,
    routes::params::SoldListQuery,
    services::sold_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sold).post(create_sold))
        .route("/{id}", get(get_sold).put(update_sold).delete(delete_sold))
}

#[utoipa::path(
    get,
    path = "/api/sold",
    params(SoldListQuery),
    responses(
        (status = 200, description = "Scoped sold records", body = ApiResponse<SoldList>),
        (status = 403, description = "Missing stock permission"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sold"
)]
pub async fn list_sold(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<SoldListQuery>,
) -> AppResult<Json<ApiResponse<SoldList>>> {
    let resp = sold_service::list_sold(&state, &principal, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sold/{id}",
    params(
        ("id" = Uuid, Path, description = "Sold record ID")
    ),
    responses(
        (status = 200, description = "Sold record", body = ApiResponse<SoldWithImei>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Sold record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sold"
)]
pub async fn get_sold(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SoldWithImei>>> {
    let resp = sold_service::get_sold(&state, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/sold",
    request_body = CreateSoldRequest,
    responses(
        (status = 201, description = "Mark an IMEI as sold", body = ApiResponse<SoldRecord>),
        (status = 404, description = "IMEI record not found"),
        (status = 409, description = "IMEI already sold"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sold"
)]
pub async fn create_sold(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateSoldRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SoldRecord>>)> {
    let resp = sold_service::create_sold(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/sold/{id}",
    params(
        ("id" = Uuid, Path, description = "Sold record ID")
    ),
    request_body = UpdateSoldRequest,
    responses(
        (status = 200, description = "Updated sold record", body = ApiResponse<SoldRecord>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Sold record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sold"
)]
pub async fn update_sold(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSoldRequest>,
) -> AppResult<Json<ApiResponse<SoldRecord>>> {
    let resp = sold_service::update_sold(&state, &principal, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/sold/{id}",
    params(
        ("id" = Uuid, Path, description = "Sold record ID")
    ),
    responses(
        (status = 200, description = "Deleted sold record"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Sold record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sold"
)]
pub async fn delete_sold(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = sold_service::delete_sold(&state, &principal, id).await?;
    Ok(Json(resp))
}
