use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::{
    error::AppResult,
    middleware::auth::Principal,
    services::imei_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/export.csv", get(export_csv))
}

#[utoipa::path(
    get,
    path = "/api/reports/export.csv",
    responses(
        (status = 200, description = "IMEI and sale rows as CSV", content_type = "text/csv", body = String),
        (status = 403, description = "Missing reports permission"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn export_csv(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<impl IntoResponse> {
    let body = imei_service::export_csv(&state, &principal).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"imei-report.csv\"",
            ),
        ],
        body,
    ))
}
