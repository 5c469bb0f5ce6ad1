//! Shared persistence steps used by both ingestion paths.
//!
//! The full resync and the webhook receiver funnel through these helpers so
//! an entity lands in the database identically regardless of which path
//! delivered it.

use sqlx::PgPool;

use shoplens_core::display_name;
use shoplens_db::{customers, orders, products};
use shoplens_shopify::{ShopCustomer, ShopOrder, ShopProduct};

use crate::error::SyncError;
use crate::normalize::{normalize_customer, normalize_line_item, normalize_order, normalize_product};

/// Upserts a customer from a full payload (list sync or customer webhook)
/// and returns the internal id. Overwrites the stored `total_spent` with the
/// externally reported figure.
pub(crate) async fn store_customer(
    pool: &PgPool,
    tenant_id: i64,
    customer: &ShopCustomer,
) -> Result<i64, SyncError> {
    let normalized = normalize_customer(customer);
    let id = customers::upsert_customer(pool, tenant_id, &normalized).await?;
    Ok(id)
}

/// Upserts a customer embedded in an order or checkout payload.
/// Refreshes name/email only; `total_spent` stays owned by the recompute.
pub(crate) async fn sight_customer(
    pool: &PgPool,
    tenant_id: i64,
    customer: &ShopCustomer,
) -> Result<i64, SyncError> {
    let name = display_name(customer.first_name.as_deref(), customer.last_name.as_deref());
    let id = customers::ensure_customer(
        pool,
        tenant_id,
        &customer.id.to_string(),
        &name,
        customer.email.as_deref(),
    )
    .await?;
    Ok(id)
}

/// Resolves the customer a draft order references without writing to an
/// existing row. Draft payloads often carry partial customer data, so an
/// already-synced customer must keep its stored name and email; only an
/// unseen customer gets created, with a zero balance.
pub(crate) async fn reference_customer(
    pool: &PgPool,
    tenant_id: i64,
    customer: &ShopCustomer,
) -> Result<i64, SyncError> {
    let name = display_name(customer.first_name.as_deref(), customer.last_name.as_deref());
    let id = customers::find_or_create_customer(
        pool,
        tenant_id,
        &customer.id.to_string(),
        &name,
        customer.email.as_deref(),
    )
    .await?;
    Ok(id)
}

/// Upserts a catalog product from a full payload and returns the internal id.
pub(crate) async fn store_product(
    pool: &PgPool,
    tenant_id: i64,
    product: &ShopProduct,
) -> Result<i64, SyncError> {
    let normalized = normalize_product(product);
    let id = products::upsert_product(pool, tenant_id, &normalized).await?;
    Ok(id)
}

/// Upserts one order with its embedded customer and line items.
///
/// The embedded customer is sighted first so the order row can link to it.
/// Each line ensures its product (catalog or synthetic) before the item row
/// is written with the line total. Returns the order's internal id and the
/// linked customer id, if any.
pub(crate) async fn store_order(
    pool: &PgPool,
    tenant_id: i64,
    order: &ShopOrder,
) -> Result<(i64, Option<i64>), SyncError> {
    let customer_id = match &order.customer {
        Some(customer) => Some(sight_customer(pool, tenant_id, customer).await?),
        None => None,
    };

    let normalized = normalize_order(order);
    let order_id = orders::upsert_order(pool, tenant_id, &normalized, customer_id).await?;

    for line in &order.line_items {
        let item = normalize_line_item(line);
        let product_id = products::ensure_product(
            pool,
            tenant_id,
            &item.product_external_id,
            &item.title,
            item.unit_price,
        )
        .await?;
        orders::upsert_order_item(
            pool,
            tenant_id,
            order_id,
            Some(product_id),
            &item.external_line_id,
            item.quantity,
            item.line_total(),
        )
        .await?;
    }

    Ok((order_id, customer_id))
}
