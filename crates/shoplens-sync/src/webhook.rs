//! Incremental ingestion via inbound webhooks.
//!
//! Each delivery is applied through the same upsert primitives as the full
//! resync, then appended to the event timeline. Handlers are idempotent, so
//! the at-least-once delivery the external system guarantees is harmless.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use shoplens_core::EventType;
use shoplens_db::{events, products, tenants, TenantRow};
use shoplens_shopify::{ShopCheckout, ShopCustomer, ShopOrder, ShopProduct};

use crate::error::SyncError;
use crate::events::slim_payload;
use crate::upsert::{sight_customer, store_customer, store_order, store_product};

/// The webhook topics this receiver subscribes to and accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookTopic {
    OrdersCreate,
    CustomersCreate,
    CustomersUpdate,
    ProductsCreate,
    ProductsUpdate,
    ProductsDelete,
    CheckoutsUpdate,
}

impl WebhookTopic {
    /// The external topic name, e.g. `"orders/create"`. Also the URL path
    /// suffix the subscription delivers to.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WebhookTopic::OrdersCreate => "orders/create",
            WebhookTopic::CustomersCreate => "customers/create",
            WebhookTopic::CustomersUpdate => "customers/update",
            WebhookTopic::ProductsCreate => "products/create",
            WebhookTopic::ProductsUpdate => "products/update",
            WebhookTopic::ProductsDelete => "products/delete",
            WebhookTopic::CheckoutsUpdate => "checkouts/update",
        }
    }

    /// Parses an external topic name; `None` for topics not subscribed to.
    #[must_use]
    pub fn from_topic(topic: &str) -> Option<Self> {
        match topic {
            "orders/create" => Some(WebhookTopic::OrdersCreate),
            "customers/create" => Some(WebhookTopic::CustomersCreate),
            "customers/update" => Some(WebhookTopic::CustomersUpdate),
            "products/create" => Some(WebhookTopic::ProductsCreate),
            "products/update" => Some(WebhookTopic::ProductsUpdate),
            "products/delete" => Some(WebhookTopic::ProductsDelete),
            "checkouts/update" => Some(WebhookTopic::CheckoutsUpdate),
            _ => None,
        }
    }
}

impl std::fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the tenant an inbound delivery belongs to.
///
/// The registered delivery address carries the tenant's public id as a query
/// parameter; the shop-domain header is the fallback for subscriptions
/// created out of band.
///
/// # Errors
///
/// [`SyncError::TenantNotResolved`] if neither reference matches a tenant,
/// [`SyncError::Db`] on lookup failure.
pub async fn resolve_webhook_tenant(
    pool: &PgPool,
    public_id: Option<Uuid>,
    shop_domain: Option<&str>,
) -> Result<TenantRow, SyncError> {
    if let Some(public_id) = public_id {
        if let Some(tenant) = tenants::get_tenant_by_public_id(pool, public_id).await? {
            return Ok(tenant);
        }
    }
    if let Some(domain) = shop_domain {
        if let Some(tenant) = tenants::get_tenant_by_shop_domain(pool, domain).await? {
            return Ok(tenant);
        }
    }

    let reference = public_id
        .map(|id| id.to_string())
        .or_else(|| shop_domain.map(ToOwned::to_owned))
        .unwrap_or_else(|| "no tenant reference".to_string());
    Err(SyncError::TenantNotResolved(reference))
}

/// Applies one webhook delivery: upserts the carried entity and appends a
/// timeline event with a slim snapshot of the body.
///
/// # Errors
///
/// - [`SyncError::Payload`] if the body does not match the topic's shape.
/// - [`SyncError::Db`] if a write fails.
pub async fn apply_webhook(
    pool: &PgPool,
    tenant: &TenantRow,
    topic: WebhookTopic,
    body: &Value,
) -> Result<(), SyncError> {
    match topic {
        WebhookTopic::OrdersCreate => {
            let order: ShopOrder = parse(body, topic)?;
            let (_, customer_id) = store_order(pool, tenant.id, &order).await?;
            append(pool, tenant, EventType::OrderCreated, body, customer_id).await
        }
        WebhookTopic::CustomersCreate | WebhookTopic::CustomersUpdate => {
            let customer: ShopCustomer = parse(body, topic)?;
            let customer_id = store_customer(pool, tenant.id, &customer).await?;
            let event_type = if topic == WebhookTopic::CustomersCreate {
                EventType::CustomerCreated
            } else {
                EventType::CustomerUpdated
            };
            append(pool, tenant, event_type, body, Some(customer_id)).await
        }
        WebhookTopic::ProductsCreate | WebhookTopic::ProductsUpdate => {
            let product: ShopProduct = parse(body, topic)?;
            store_product(pool, tenant.id, &product).await?;
            let event_type = if topic == WebhookTopic::ProductsCreate {
                EventType::ProductCreated
            } else {
                EventType::ProductUpdated
            };
            append(pool, tenant, event_type, body, None).await
        }
        WebhookTopic::ProductsDelete => {
            let payload: DeletePayload = parse(body, topic)?;
            products::delete_product_by_external_id(pool, tenant.id, &payload.id.to_string())
                .await?;
            append(pool, tenant, EventType::ProductDeleted, body, None).await
        }
        WebhookTopic::CheckoutsUpdate => {
            let checkout: ShopCheckout = parse(body, topic)?;
            let customer_id = match &checkout.customer {
                Some(customer) => Some(sight_customer(pool, tenant.id, customer).await?),
                None => None,
            };
            let event_type = checkout_event_type(&checkout);
            append(pool, tenant, event_type, body, customer_id).await
        }
    }
}

/// A checkout is a start until the external system marks it abandoned by
/// attaching a recovery URL.
pub(crate) fn checkout_event_type(checkout: &ShopCheckout) -> EventType {
    if checkout.abandoned_checkout_url.is_some() {
        EventType::CartAbandoned
    } else {
        EventType::CheckoutStarted
    }
}

/// Body of a `products/delete` delivery, which carries only the id.
#[derive(Debug, Deserialize)]
struct DeletePayload {
    id: i64,
}

fn parse<T: serde::de::DeserializeOwned>(body: &Value, topic: WebhookTopic) -> Result<T, SyncError> {
    serde_json::from_value(body.clone()).map_err(|source| SyncError::Payload {
        context: topic.as_str().to_string(),
        source,
    })
}

async fn append(
    pool: &PgPool,
    tenant: &TenantRow,
    event_type: EventType,
    body: &Value,
    customer_id: Option<i64>,
) -> Result<(), SyncError> {
    let payload = slim_payload(body);
    events::append_event(pool, tenant.id, event_type, &payload, customer_id).await?;
    tracing::debug!(tenant = %tenant.public_id, event = %event_type, "webhook applied");
    Ok(())
}
