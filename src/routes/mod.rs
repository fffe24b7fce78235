use axum::Router;

use crate::state::AppState;

pub mod activity;
pub mod admins;
pub mod auth;
pub mod brands;
pub mod doc;
pub mod health;
pub mod imei;
pub mod params;
pub mod profile;
pub mod reports;
pub mod sold;
pub mod staff;
pub mod stats;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/imei", imei::router())
        .nest("/sold", sold::router())
        .nest("/brands", brands::router())
        .nest("/staff", staff::router())
        .nest("/admins", admins::router())
        .nest("/activity", activity::router())
        .nest("/stats", stats::router())
        .nest("/reports", reports::router())
}
