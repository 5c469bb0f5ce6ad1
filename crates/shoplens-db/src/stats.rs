//! Read-model queries used by the dashboard endpoints.
//!
//! Pure projections over the reconciled tables; no new invariants live here.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// Revenue rollup for one product: units sold and summed line totals.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRevenueRow {
    pub product_id: Option<i64>,
    /// Catalog title, or `None` when the product link has been tombstoned.
    pub title: Option<String>,
    pub units: i64,
    pub revenue: Decimal,
}

/// Single-row tenant overview aggregate.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OverviewRow {
    pub customers: i64,
    pub orders: i64,
    pub revenue: Decimal,
}

/// Returns the top `limit` products of a tenant by revenue, derived by
/// summing order-item line totals grouped by product and joining catalog
/// titles. Dangling product references (deleted catalog entries) surface
/// with a `None` title.
///
/// Returns an empty vec when the tenant has no order items; the caller
/// decides whether to fall back to the raw catalog.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn product_revenue(
    pool: &PgPool,
    tenant_id: i64,
    limit: i64,
) -> Result<Vec<ProductRevenueRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRevenueRow>(
        "SELECT oi.product_id, \
                p.title, \
                COALESCE(SUM(oi.quantity), 0)::BIGINT AS units, \
                COALESCE(SUM(oi.price), 0) AS revenue \
         FROM order_items oi \
         LEFT JOIN products p ON p.id = oi.product_id \
         WHERE oi.tenant_id = $1 \
         GROUP BY oi.product_id, p.title \
         ORDER BY revenue DESC \
         LIMIT $2",
    )
    .bind(tenant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the tenant's customer count, order count, and total revenue.
///
/// A tenant with no data yields a zeroed row rather than an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn overview(pool: &PgPool, tenant_id: i64) -> Result<OverviewRow, DbError> {
    let row = sqlx::query_as::<_, OverviewRow>(
        "SELECT \
             (SELECT COUNT(*) FROM customers WHERE tenant_id = $1) AS customers, \
             (SELECT COUNT(*) FROM orders WHERE tenant_id = $1) AS orders, \
             (SELECT COALESCE(SUM(total), 0) FROM orders WHERE tenant_id = $1) AS revenue",
    )
    .bind(tenant_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
