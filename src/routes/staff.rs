use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    error::AppResult,
    middleware::auth::Principal,
    models::User,
    response::ApiResponse,
    routes::params::UserListQuery,
    services::staff_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/{id}", get(get_staff).put(update_staff).delete(delete_staff))
}

#[utoipa::path(
    get,
    path = "/api/staff",
    params(UserListQuery),
    responses(
        (status = 200, description = "Staff of the caller's company", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = staff_service::list_staff(&state, &principal, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/staff/{id}",
    params(
        ("id" = Uuid, Path, description = "Staff user ID")
    ),
    responses(
        (status = 200, description = "Staff account", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Staff not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn get_staff(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = staff_service::get_staff(&state, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/staff",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Create staff account", body = ApiResponse<User>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email is already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn create_staff(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = staff_service::create_staff(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/staff/{id}",
    params(
        ("id" = Uuid, Path, description = "Staff user ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated staff account", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Staff not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn update_staff(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = staff_service::update_staff(&state, &principal, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/staff/{id}",
    params(
        ("id" = Uuid, Path, description = "Staff user ID")
    ),
    responses(
        (status = 200, description = "Deleted staff; records move to the admin"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Staff not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn delete_staff(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = staff_service::delete_staff(&state, &principal, id).await?;
    Ok(Json(resp))
}
