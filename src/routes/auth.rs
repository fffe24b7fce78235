use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::post,
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse},
    error::AppResult,
    middleware::auth::client_ip,
    response::ApiResponse,
    services::auth_service::login_user,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    security(()),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = login_user(&state, payload, client_ip(&headers)).await?;
    Ok(Json(resp))
}
