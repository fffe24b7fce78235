use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StockStatistics {
    pub total_count: u64,
    pub available_count: u64,
    pub sold_count: u64,
    pub total_purchase_amount: i64,
    pub total_sold_amount: i64,
    pub profit: i64,
}
