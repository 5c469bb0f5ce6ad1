//! Full-resync pipeline.
//!
//! One pass pulls every entity of a tenant from the storefront API and
//! reconciles the database to it: customers, orders with their line items,
//! a wholesale recompute of per-customer lifetime spend, the product
//! catalog, and draft orders (timeline only). Every write is an upsert keyed
//! by external id, so re-running a sync at any time is safe.

use futures::stream::{self, StreamExt, TryStreamExt};
use sqlx::PgPool;
use uuid::Uuid;

use shoplens_core::{AppConfig, EventType};
use shoplens_db::{customers, events, tenants, TenantRow};
use shoplens_shopify::{ShopOrder, ShopifyClient};

use crate::error::SyncError;
use crate::events::draft_order_payload;
use crate::upsert::{reference_customer, store_customer, store_order, store_product};

/// Entity counts from one completed resync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub customers: usize,
    pub orders: usize,
    pub products: usize,
    pub draft_orders: usize,
}

/// Runs a full resync for one tenant using an already constructed client.
///
/// The pass is ordered so later steps can link to rows written by earlier
/// ones: customers first, then orders (which sight embedded customers and
/// line products), then the lifetime-spend recompute, then the catalog, and
/// last the draft-order timeline events. A failure aborts the pass; rows
/// written so far stay committed and the next pass repairs the rest.
///
/// # Errors
///
/// - [`SyncError::Upstream`] if a storefront API call fails after retries.
/// - [`SyncError::Db`] if a write fails.
pub async fn sync_tenant(
    pool: &PgPool,
    client: &ShopifyClient,
    tenant: &TenantRow,
    order_detail_concurrency: usize,
) -> Result<SyncOutcome, SyncError> {
    let mut outcome = SyncOutcome::default();

    let shop_customers = client.list_customers().await?;
    for customer in &shop_customers {
        store_customer(pool, tenant.id, customer).await?;
    }
    outcome.customers = shop_customers.len();

    let orders = fetch_order_details(client, order_detail_concurrency).await?;
    for order in &orders {
        store_order(pool, tenant.id, order).await?;
    }
    outcome.orders = orders.len();

    customers::recompute_total_spent(pool, tenant.id).await?;

    let products = client.list_products().await?;
    for product in &products {
        store_product(pool, tenant.id, product).await?;
    }
    outcome.products = products.len();

    let drafts = client.list_draft_orders().await?;
    for draft in &drafts {
        let customer_id = match &draft.customer {
            Some(customer) => Some(reference_customer(pool, tenant.id, customer).await?),
            None => None,
        };
        let payload = draft_order_payload(draft);
        events::append_event(pool, tenant.id, EventType::DraftOrder, &payload, customer_id)
            .await?;
    }
    outcome.draft_orders = drafts.len();

    tracing::info!(
        tenant = %tenant.public_id,
        customers = outcome.customers,
        orders = outcome.orders,
        products = outcome.products,
        draft_orders = outcome.draft_orders,
        "resync complete"
    );

    Ok(outcome)
}

/// Resolves a tenant by public id, builds a client from its credential, and
/// runs [`sync_tenant`] with the configured concurrency.
///
/// # Errors
///
/// [`SyncError::TenantNotFound`] if no tenant has that public id, plus the
/// [`sync_tenant`] taxonomy.
pub async fn sync_tenant_by_id(
    pool: &PgPool,
    config: &AppConfig,
    public_id: Uuid,
) -> Result<SyncOutcome, SyncError> {
    let tenant = tenants::get_tenant_by_public_id(pool, public_id)
        .await?
        .ok_or(SyncError::TenantNotFound(public_id))?;

    let client = ShopifyClient::new(
        &tenant.shop_domain,
        &tenant.access_token,
        config.shopify_request_timeout_secs,
        config.shopify_max_retries,
        config.shopify_retry_backoff_base_ms,
    )?;

    sync_tenant(pool, &client, &tenant, config.sync_order_detail_concurrency).await
}

/// Lists order summaries, then fetches each order's detail with a bounded
/// number of requests in flight. List payloads may omit line items, so the
/// detail fetch is the authoritative source.
async fn fetch_order_details(
    client: &ShopifyClient,
    concurrency: usize,
) -> Result<Vec<ShopOrder>, SyncError> {
    let summaries = client.list_orders().await?;

    let orders: Vec<ShopOrder> = stream::iter(summaries.into_iter().map(|summary| async move {
        let detail = client.get_order(summary.id).await;
        if detail.is_err() {
            tracing::warn!(order = summary.id, "order detail fetch failed");
        }
        detail
    }))
    .buffer_unordered(concurrency.max(1))
    .try_collect()
    .await?;

    Ok(orders)
}
