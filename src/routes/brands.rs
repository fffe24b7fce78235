use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::brands::{BrandList, CreateBrandRequest, UpdateBrandRequest},
    error::AppResult,
    middleware::auth::Principal,
    models::Brand,
    response::ApiResponse,
    routes::params::BrandListQuery,
    services::brand_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/{id}", get(get_brand).put(update_brand).delete(delete_brand))
}

#[utoipa::path(
    get,
    path = "/api/brands",
    params(BrandListQuery),
    responses(
        (status = 200, description = "Shared and company brands", body = ApiResponse<BrandList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Brands"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<BrandListQuery>,
) -> AppResult<Json<ApiResponse<BrandList>>> {
    let resp = brand_service::list_brands(&state, &principal, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand", body = ApiResponse<Brand>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Brand not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Brands"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    let resp = brand_service::get_brand(&state, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/brands",
    request_body = CreateBrandRequest,
    responses(
        (status = 201, description = "Create brand", body = ApiResponse<Brand>),
        (status = 409, description = "Brand name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Brands"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateBrandRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Brand>>)> {
    let resp = brand_service::create_brand(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body = UpdateBrandRequest,
    responses(
        (status = 200, description = "Updated brand", body = ApiResponse<Brand>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Brand not found"),
        (status = 409, description = "Brand name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Brands"
)]
pub async fn update_brand(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBrandRequest>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    let resp = brand_service::update_brand(&state, &principal, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Deleted brand"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Brand not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Brands"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = brand_service::delete_brand(&state, &principal, id).await?;
    Ok(Json(resp))
}
