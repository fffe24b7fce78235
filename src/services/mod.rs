pub mod accounts;
pub mod activity_service;
pub mod admin_service;
pub mod auth_service;
pub mod brand_service;
pub mod imei_service;
pub mod sold_service;
pub mod staff_service;
pub mod stats_service;
