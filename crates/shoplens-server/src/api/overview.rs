use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{require_tenant, ApiError, AppState, TenantQuery};

#[derive(Debug, Serialize)]
pub(super) struct OverviewData {
    customers: i64,
    orders: i64,
    revenue: Decimal,
}

/// Headline rollup for one tenant. A tenant with no data gets zeros, never
/// an error.
pub(super) async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<OverviewData>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;
    let row = shoplens_db::overview(&state.pool, tenant.id).await?;
    Ok(Json(OverviewData {
        customers: row.customers,
        orders: row.orders,
        revenue: row.revenue,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_serializes_revenue_as_decimal_string() {
        let data = OverviewData {
            customers: 12,
            orders: 40,
            revenue: Decimal::new(1234567, 2),
        };
        let json = serde_json::to_string(&data).expect("serialize");
        assert!(json.contains("\"revenue\":\"12345.67\""));
    }
}
