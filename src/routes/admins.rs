use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::users::{CompanyDetail, CreateUserRequest, UpdateUserRequest, UserList},
    error::AppResult,
    middleware::auth::Principal,
    models::User,
    response::ApiResponse,
    routes::params::UserListQuery,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route("/{id}", get(get_admin).put(update_admin).delete(delete_admin))
        .route("/{id}/details", get(company_detail))
}

#[utoipa::path(
    get,
    path = "/api/admins",
    params(UserListQuery),
    responses(
        (status = 200, description = "All admins (superadmin only)", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn list_admins(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_admins(&state, &principal, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admins/{id}",
    params(
        ("id" = Uuid, Path, description = "Admin user ID")
    ),
    responses(
        (status = 200, description = "Admin account", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn get_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::get_admin(&state, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admins/{id}/details",
    params(
        ("id" = Uuid, Path, description = "Admin user ID")
    ),
    responses(
        (status = 200, description = "Company rollup", body = ApiResponse<CompanyDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn company_detail(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CompanyDetail>>> {
    let resp = admin_service::company_detail(&state, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admins",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Create admin account", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email is already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = admin_service::create_admin(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admins/{id}",
    params(
        ("id" = Uuid, Path, description = "Admin user ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated admin account", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn update_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::update_admin(&state, &principal, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    params(
        ("id" = Uuid, Path, description = "Admin user ID")
    ),
    responses(
        (status = 200, description = "Deleted admin"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_admin(&state, &principal, id).await?;
    Ok(Json(resp))
}
