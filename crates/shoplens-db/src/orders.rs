//! Database operations for the `orders` and `order_items` tables.
//!
//! Orders are upserted by `(tenant_id, external_id)`; line items by
//! `(tenant_id, external_line_id)`. An order item's `price` is the line
//! total — unit price times quantity — not the unit price, which stays on
//! the product row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shoplens_core::NormalizedOrder;

use crate::DbError;

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub tenant_id: i64,
    pub external_id: String,
    pub customer_id: Option<i64>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recent-orders listing row with the customer's external id joined in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentOrderRow {
    pub external_id: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub customer_external_id: Option<String>,
}

/// One day's order count for the per-day histogram.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderDayCountRow {
    /// Calendar day formatted `YYYY-MM-DD` (UTC).
    pub day: String,
    pub orders: i64,
}

/// Upserts an order row.
///
/// Conflicts on `(tenant_id, external_id)` update `total`, the customer
/// link, and `updated_at` in place — both may legitimately change on
/// resync. Returns the internal `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_order(
    pool: &PgPool,
    tenant_id: i64,
    order: &NormalizedOrder,
    customer_id: Option<i64>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (tenant_id, external_id, customer_id, total) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (tenant_id, external_id) DO UPDATE SET \
             total       = EXCLUDED.total, \
             customer_id = EXCLUDED.customer_id, \
             updated_at  = NOW() \
         RETURNING id",
    )
    .bind(tenant_id)
    .bind(&order.external_id)
    .bind(customer_id)
    .bind(order.total)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Upserts an order line item.
///
/// `price` is the precomputed line total. Conflicts on
/// `(tenant_id, external_line_id)` update quantity, price, and the product
/// link. Returns the internal `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_order_item(
    pool: &PgPool,
    tenant_id: i64,
    order_id: i64,
    product_id: Option<i64>,
    external_line_id: &str,
    quantity: i32,
    price: Decimal,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_items \
             (tenant_id, order_id, product_id, external_line_id, quantity, price) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (tenant_id, external_line_id) DO UPDATE SET \
             order_id   = EXCLUDED.order_id, \
             product_id = EXCLUDED.product_id, \
             quantity   = EXCLUDED.quantity, \
             price      = EXCLUDED.price, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(tenant_id)
    .bind(order_id)
    .bind(product_id)
    .bind(external_line_id)
    .bind(quantity)
    .bind(price)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the `limit` most recent orders of a tenant, newest first, with
/// the owning customer's external id where one is linked.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_orders(
    pool: &PgPool,
    tenant_id: i64,
    limit: i64,
) -> Result<Vec<RecentOrderRow>, DbError> {
    let rows = sqlx::query_as::<_, RecentOrderRow>(
        "SELECT o.external_id, o.total, o.created_at, \
                c.external_id AS customer_external_id \
         FROM orders o \
         LEFT JOIN customers c ON c.id = o.customer_id \
         WHERE o.tenant_id = $1 \
         ORDER BY o.created_at DESC \
         LIMIT $2",
    )
    .bind(tenant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns order counts grouped per UTC calendar day, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn orders_per_day(
    pool: &PgPool,
    tenant_id: i64,
) -> Result<Vec<OrderDayCountRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderDayCountRow>(
        "SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day, \
                COUNT(*) AS orders \
         FROM orders \
         WHERE tenant_id = $1 \
         GROUP BY day \
         ORDER BY day",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
