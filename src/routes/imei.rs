use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::imei::{CreateImeiRequest, ImeiCheckResponse, ImeiList, ImeiWithSale, UpdateImeiRequest},
    error::AppResult,
    middleware::auth::Principal,
    models::ImeiRecord,
    response::ApiResponse,
    routes::params::{ImeiCheckQuery, ImeiListQuery},
    services::imei_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_imei).post(create_imei))
        .route("/check", get(check_imei))
        .route("/{id}", get(get_imei).put(update_imei).delete(delete_imei))
}

#[utoipa::path(
    get,
    path = "/api/imei",
    params(ImeiListQuery),
    responses(
        (status = 200, description = "Scoped IMEI records with sale status", body = ApiResponse<ImeiList>),
        (status = 403, description = "Missing stock permission"),
    ),
    security(("bearer_auth" = [])),
    tag = "IMEI"
)]
pub async fn list_imei(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ImeiListQuery>,
) -> AppResult<Json<ApiResponse<ImeiList>>> {
    let resp = imei_service::list_imei(&state, &principal, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/imei/check",
    params(ImeiCheckQuery),
    responses(
        (status = 200, description = "Existence check", body = ApiResponse<ImeiCheckResponse>),
        (status = 400, description = "Missing imei"),
    ),
    security(("bearer_auth" = [])),
    tag = "IMEI"
)]
pub async fn check_imei(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ImeiCheckQuery>,
) -> AppResult<Json<ApiResponse<ImeiCheckResponse>>> {
    let resp = imei_service::check_imei(&state, &principal, &query.imei).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/imei/{id}",
    params(
        ("id" = Uuid, Path, description = "IMEI record ID")
    ),
    responses(
        (status = 200, description = "IMEI record", body = ApiResponse<ImeiWithSale>),
        (status = 403, description = "Record belongs to another company"),
        (status = 404, description = "IMEI record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "IMEI"
)]
pub async fn get_imei(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ImeiWithSale>>> {
    let resp = imei_service::get_imei(&state, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/imei",
    request_body = CreateImeiRequest,
    responses(
        (status = 201, description = "Create IMEI record", body = ApiResponse<ImeiRecord>),
        (status = 409, description = "IMEI already registered"),
    ),
    security(("bearer_auth" = [])),
    tag = "IMEI"
)]
pub async fn create_imei(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateImeiRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ImeiRecord>>)> {
    let resp = imei_service::create_imei(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/imei/{id}",
    params(
        ("id" = Uuid, Path, description = "IMEI record ID")
    ),
    request_body = UpdateImeiRequest,
    responses(
        (status = 200, description = "Updated IMEI record", body = ApiResponse<ImeiRecord>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "IMEI record not found"),
        (status = 409, description = "IMEI already registered"),
    ),
    security(("bearer_auth" = [])),
    tag = "IMEI"
)]
pub async fn update_imei(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateImeiRequest>,
) -> AppResult<Json<ApiResponse<ImeiRecord>>> {
    let resp = imei_service::update_imei(&state, &principal, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/imei/{id}",
    params(
        ("id" = Uuid, Path, description = "IMEI record ID")
    ),
    responses(
        (status = 200, description = "Deleted IMEI record and its sale"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "IMEI record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "IMEI"
)]
pub async fn delete_imei(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = imei_service::delete_imei(&state, &principal, id).await?;
    Ok(Json(resp))
}
