use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{require_tenant, ApiError, AppState, TenantQuery};

const RECENT_ORDERS_LIMIT: i64 = 20;

#[derive(Debug, Serialize)]
pub(super) struct OrderItem {
    external_id: String,
    total: Decimal,
    created_at: DateTime<Utc>,
    customer_external_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OrdersPerDayItem {
    day: String,
    orders: i64,
}

/// The twenty most recent orders, newest first.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<OrderItem>>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;
    let rows =
        shoplens_db::list_recent_orders(&state.pool, tenant.id, RECENT_ORDERS_LIMIT).await?;
    let data = rows
        .into_iter()
        .map(|row| OrderItem {
            external_id: row.external_id,
            total: row.total,
            created_at: row.created_at,
            customer_external_id: row.customer_external_id,
        })
        .collect();
    Ok(Json(data))
}

/// Order counts per UTC calendar day, oldest first.
pub(super) async fn order_stats(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<OrdersPerDayItem>>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;
    let rows = shoplens_db::orders_per_day(&state.pool, tenant.id).await?;
    let data = rows
        .into_iter()
        .map(|row| OrdersPerDayItem {
            day: row.day,
            orders: row.orders,
        })
        .collect();
    Ok(Json(data))
}
