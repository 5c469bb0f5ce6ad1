use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use shoplens_core::mask_external_id;
use shoplens_db::CustomerSummaryRow;

use super::{require_tenant, ApiError, AppState, TenantQuery};

const TOP_CUSTOMERS_LIMIT: i64 = 5;

/// Customer listing item. The external id is masked to its last four
/// characters before leaving the backend.
#[derive(Debug, Serialize)]
pub(super) struct CustomerItem {
    external_id: String,
    name: String,
    email: Option<String>,
    total_spent: Decimal,
    orders_count: i64,
}

impl From<CustomerSummaryRow> for CustomerItem {
    fn from(row: CustomerSummaryRow) -> Self {
        Self {
            external_id: mask_external_id(&row.external_id),
            name: row.name,
            email: row.email,
            total_spent: row.total_spent,
            orders_count: row.orders_count,
        }
    }
}

pub(super) async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<CustomerItem>>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;
    let rows = shoplens_db::list_customers(&state.pool, tenant.id).await?;
    Ok(Json(rows.into_iter().map(CustomerItem::from).collect()))
}

/// Top five customers by lifetime spend.
pub(super) async fn customer_stats(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<CustomerItem>>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;
    let rows = shoplens_db::top_customers(&state.pool, tenant.id, TOP_CUSTOMERS_LIMIT).await?;
    Ok(Json(rows.into_iter().map(CustomerItem::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_item_masks_the_external_id() {
        let row = CustomerSummaryRow {
            external_id: "6549873210".to_string(),
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            total_spent: Decimal::new(19900, 2),
            orders_count: 3,
        };
        let item = CustomerItem::from(row);
        assert_eq!(item.external_id, "…3210");
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(!json.contains("6549873210"));
    }
}
