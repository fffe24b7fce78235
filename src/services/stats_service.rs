use sea_orm::{
    ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, sea_query::Expr,
};

use crate::{
    company::Scope,
    dto::stats::StockStatistics,
    entity::{
        imei_records::{Column as ImeiCol, Entity as ImeiRecords},
        sold_records::Entity as SoldRecords,
    },
    error::AppResult,
    middleware::auth::{Principal, ensure_menu},
    permissions::MenuPermission,
    response::{ApiResponse, Meta},
    state::AppState,
};

impl StockStatistics {
    /// Derive the availability split and profit from raw totals.
    pub fn from_totals(
        total_count: u64,
        sold_count: u64,
        total_purchase_amount: i64,
        total_sold_amount: i64,
    ) -> Self {
        Self {
            total_count,
            available_count: total_count.saturating_sub(sold_count),
            sold_count,
            total_purchase_amount,
            total_sold_amount,
            profit: total_sold_amount - total_purchase_amount,
        }
    }
}

pub async fn stock_statistics(
    state: &AppState,
    principal: &Principal,
) -> AppResult<ApiResponse<StockStatistics>> {
    ensure_menu(principal, MenuPermission::Dashboard)?;
    let scope = Scope::for_principal(&state.orm, principal).await?;
    let stats = statistics_for_scope(&state.orm, &scope).await?;
    Ok(ApiResponse::success("Stock statistics", stats, Some(Meta::empty())))
}

/// Aggregate over the scoped IMEI set. Sales count only when their IMEI is in scope,
/// so `sold_count <= total_count` always holds.
pub async fn statistics_for_scope<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
) -> AppResult<StockStatistics> {
    let owner_filter = scope.condition(ImeiCol::CreatedBy);

    let total_count = ImeiRecords::find()
        .filter(owner_filter.clone())
        .count(conn)
        .await?;

    let total_purchase_amount: i64 = ImeiRecords::find()
        .select_only()
        .column_as(
            Expr::cust("COALESCE(SUM(imei_records.amount), 0)::BIGINT"),
            "total",
        )
        .filter(owner_filter.clone())
        .into_tuple()
        .one(conn)
        .await?
        .unwrap_or(0);

    let (sold_count, total_sold_amount): (i64, i64) = SoldRecords::find()
        .select_only()
        .column_as(
            Expr::cust("COUNT(DISTINCT sold_records.imei_id)"),
            "sold_count",
        )
        .column_as(
            Expr::cust("COALESCE(SUM(sold_records.sold_amount), 0)::BIGINT"),
            "sold_total",
        )
        .inner_join(ImeiRecords)
        .filter(owner_filter)
        .into_tuple()
        .one(conn)
        .await?
        .unwrap_or((0, 0));

    Ok(StockStatistics::from_totals(
        total_count,
        sold_count.max(0) as u64,
        total_purchase_amount,
        total_sold_amount,
    ))
}
