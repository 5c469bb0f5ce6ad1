//! Database operations for the `customers` table.
//!
//! Three write flavours exist on purpose. [`upsert_customer`] is the
//! full-payload path (customer list sync, customer webhooks) and overwrites
//! `total_spent` with the externally reported figure. [`ensure_customer`] is
//! the sighting path (orders, checkouts): it refreshes name/email but never
//! touches totals, creating unseen customers with a zero balance.
//! [`find_or_create_customer`] is the reference-only path (draft orders): an
//! existing row is left entirely alone. All converge because
//! [`recompute_total_spent`] rebuilds the derived cache from linked orders at
//! the end of every full sync.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shoplens_core::NormalizedCustomer;

use crate::DbError;

/// A row from the `customers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub tenant_id: i64,
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub total_spent: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer listing row with the order count joined in, for dashboard views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerSummaryRow {
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub total_spent: Decimal,
    pub orders_count: i64,
}

/// Upserts a customer from a full external payload.
///
/// Conflicts on `(tenant_id, external_id)` update `name`, `email`,
/// `total_spent`, and `updated_at` in place. Returns the internal `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_customer(
    pool: &PgPool,
    tenant_id: i64,
    customer: &NormalizedCustomer,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customers (tenant_id, external_id, name, email, total_spent) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (tenant_id, external_id) DO UPDATE SET \
             name        = EXCLUDED.name, \
             email       = EXCLUDED.email, \
             total_spent = EXCLUDED.total_spent, \
             updated_at  = NOW() \
         RETURNING id",
    )
    .bind(tenant_id)
    .bind(&customer.external_id)
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(customer.total_spent)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Upserts a customer sighted via an order or checkout.
///
/// Updates only `name`/`email` on conflict; creates with a zero balance.
/// `total_spent` is left to [`recompute_total_spent`]. Returns the internal
/// `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn ensure_customer(
    pool: &PgPool,
    tenant_id: i64,
    external_id: &str,
    name: &str,
    email: Option<&str>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customers (tenant_id, external_id, name, email, total_spent) \
         VALUES ($1, $2, $3, $4, 0) \
         ON CONFLICT (tenant_id, external_id) DO UPDATE SET \
             name       = EXCLUDED.name, \
             email      = EXCLUDED.email, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(tenant_id)
    .bind(external_id)
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Resolves a customer by external id, creating a zero-balance row when none
/// exists.
///
/// Unlike [`ensure_customer`], a conflict writes nothing: an existing row's
/// name, email, and totals all stay as they were. The name/email arguments
/// only seed a newly created row. Returns the internal `id` either way.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or the fallback select fails.
pub async fn find_or_create_customer(
    pool: &PgPool,
    tenant_id: i64,
    external_id: &str,
    name: &str,
    email: Option<&str>,
) -> Result<i64, DbError> {
    // DO NOTHING returns no row on conflict, hence the fallback select.
    let inserted: Option<i64> = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customers (tenant_id, external_id, name, email, total_spent) \
         VALUES ($1, $2, $3, $4, 0) \
         ON CONFLICT (tenant_id, external_id) DO NOTHING \
         RETURNING id",
    )
    .bind(tenant_id)
    .bind(external_id)
    .bind(name)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    if let Some(id) = inserted {
        return Ok(id);
    }

    let id: i64 = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM customers WHERE tenant_id = $1 AND external_id = $2",
    )
    .bind(tenant_id)
    .bind(external_id)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Rebuilds `total_spent` for every customer of one tenant as the sum of
/// their linked orders' totals, zeroing customers with no orders.
///
/// Set-based and strictly tenant-scoped: rows of other tenants are never
/// read or written. Idempotent by construction. Returns the number of
/// customer rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn recompute_total_spent(pool: &PgPool, tenant_id: i64) -> Result<u64, DbError> {
    let affected = sqlx::query(
        "UPDATE customers c \
         SET total_spent = COALESCE(agg.order_total, 0), \
             updated_at  = NOW() \
         FROM ( \
             SELECT c2.id AS customer_id, SUM(o.total) AS order_total \
             FROM customers c2 \
             LEFT JOIN orders o ON o.customer_id = c2.id AND o.tenant_id = c2.tenant_id \
             WHERE c2.tenant_id = $1 \
             GROUP BY c2.id \
         ) agg \
         WHERE c.id = agg.customer_id",
    )
    .bind(tenant_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected)
}

/// Returns all customers of a tenant with their order counts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_customers(
    pool: &PgPool,
    tenant_id: i64,
) -> Result<Vec<CustomerSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, CustomerSummaryRow>(
        "SELECT c.external_id, c.name, c.email, c.total_spent, \
                COUNT(o.id) AS orders_count \
         FROM customers c \
         LEFT JOIN orders o ON o.customer_id = c.id AND o.tenant_id = c.tenant_id \
         WHERE c.tenant_id = $1 \
         GROUP BY c.id \
         ORDER BY c.created_at",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the top `limit` customers of a tenant by `total_spent`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_customers(
    pool: &PgPool,
    tenant_id: i64,
    limit: i64,
) -> Result<Vec<CustomerSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, CustomerSummaryRow>(
        "SELECT c.external_id, c.name, c.email, c.total_spent, \
                COUNT(o.id) AS orders_count \
         FROM customers c \
         LEFT JOIN orders o ON o.customer_id = c.id AND o.tenant_id = c.tenant_id \
         WHERE c.tenant_id = $1 \
         GROUP BY c.id \
         ORDER BY c.total_spent DESC \
         LIMIT $2",
    )
    .bind(tenant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
