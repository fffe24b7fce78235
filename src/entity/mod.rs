pub mod activity_logs;
pub mod brands;
pub mod imei_records;
pub mod sold_records;
pub mod users;

pub use activity_logs::Entity as ActivityLogs;
pub use brands::Entity as Brands;
pub use imei_records::Entity as ImeiRecords;
pub use sold_records::Entity as SoldRecords;
pub use users::Entity as Users;
