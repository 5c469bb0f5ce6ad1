//! Serde mappings for Shopify Admin REST payloads.
//!
//! Shapes mirror the external system: money fields are decimal strings,
//! names arrive split as `first_name`/`last_name`, products carry a
//! `variants` array. All type coercion and null-defaulting happens in the
//! sync crate's normalization layer, not here.

use serde::{Deserialize, Serialize};

/// A customer as returned by `GET /customers.json` or carried inside order,
/// draft-order, and checkout payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopCustomer {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Lifetime spend as reported by Shopify, e.g. `"199.65"`. Absent on the
    /// embedded customer of order payloads.
    #[serde(default)]
    pub total_spent: Option<String>,
}

/// A single order line. `price` is the unit price; quantities default to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopLineItem {
    pub id: i64,
    /// Catalog product id; `null` for custom/deleted items.
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// An order from `GET /orders.json` (list) or `GET /orders/{id}.json`
/// (detail). List responses may omit `line_items`; only the detail fetch
/// guarantees they are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopOrder {
    pub id: i64,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub customer: Option<ShopCustomer>,
    #[serde(default)]
    pub line_items: Vec<ShopLineItem>,
    #[serde(default)]
    pub financial_status: Option<String>,
}

/// A purchasable variant of a [`ShopProduct`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopVariant {
    pub id: i64,
    #[serde(default)]
    pub price: Option<String>,
}

/// A catalog product from `GET /products.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopProduct {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variants: Vec<ShopVariant>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A draft order from `GET /draft_orders.json`. Never materialised as an
/// order row; drafts only feed the event timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopDraftOrder {
    pub id: i64,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer: Option<ShopCustomer>,
}

/// A checkout as delivered by the `checkouts/update` webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopCheckout {
    pub id: i64,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer: Option<ShopCustomer>,
    /// Present once Shopify considers the checkout abandoned.
    #[serde(default)]
    pub abandoned_checkout_url: Option<String>,
}

/// A webhook subscription from the `webhooks.json` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub id: i64,
    pub topic: String,
    pub address: String,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct CustomersEnvelope {
    pub customers: Vec<ShopCustomer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersEnvelope {
    pub orders: Vec<ShopOrder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderEnvelope {
    pub order: ShopOrder,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsEnvelope {
    pub products: Vec<ShopProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DraftOrdersEnvelope {
    pub draft_orders: Vec<ShopDraftOrder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebhooksEnvelope {
    pub webhooks: Vec<WebhookSubscription>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebhookEnvelope {
    pub webhook: WebhookSubscription,
}
