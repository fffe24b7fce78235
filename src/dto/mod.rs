pub mod activity;
pub mod auth;
pub mod brands;
pub mod imei;
pub mod sold;
pub mod stats;
pub mod users;
