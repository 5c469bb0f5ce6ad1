//! Database operations for the `products` table.
//!
//! `price` is always the catalog unit price. Products are created by catalog
//! sync, by product webhooks, or implicitly by order lines lacking a catalog
//! match (synthetic `line-<id>` external ids); all three paths land in the
//! same `(tenant_id, external_id)` upsert.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shoplens_core::NormalizedProduct;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub tenant_id: i64,
    pub external_id: String,
    pub title: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upserts a product row.
///
/// Conflicts on `(tenant_id, external_id)` update `title`, `price`, and
/// `updated_at` in place. Returns the internal `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(
    pool: &PgPool,
    tenant_id: i64,
    product: &NormalizedProduct,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (tenant_id, external_id, title, price) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (tenant_id, external_id) DO UPDATE SET \
             title      = EXCLUDED.title, \
             price      = EXCLUDED.price, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(tenant_id)
    .bind(&product.external_id)
    .bind(&product.title)
    .bind(product.price)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Upserts a product sighted only through an order line: the title refreshes
/// but an existing catalog price is left alone (the line's unit price is a
/// worse source than the catalog sync). Creates with the line's unit price.
///
/// Returns the internal `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn ensure_product(
    pool: &PgPool,
    tenant_id: i64,
    external_id: &str,
    title: &str,
    unit_price: Decimal,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (tenant_id, external_id, title, price) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (tenant_id, external_id) DO UPDATE SET \
             title      = EXCLUDED.title, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(tenant_id)
    .bind(external_id)
    .bind(title)
    .bind(unit_price)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Deletes a product by external id. Historical order items keep their rows;
/// the FK tombstones their product link. Deleting an absent product is a
/// no-op so repeated webhook delivery stays idempotent.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_product_by_external_id(
    pool: &PgPool,
    tenant_id: i64,
    external_id: &str,
) -> Result<bool, DbError> {
    let affected = sqlx::query("DELETE FROM products WHERE tenant_id = $1 AND external_id = $2")
        .bind(tenant_id)
        .bind(external_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

/// Returns the top `limit` products of a tenant by catalog price.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_by_price(
    pool: &PgPool,
    tenant_id: i64,
    limit: i64,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, tenant_id, external_id, title, price, created_at, updated_at \
         FROM products \
         WHERE tenant_id = $1 \
         ORDER BY price DESC \
         LIMIT $2",
    )
    .bind(tenant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
