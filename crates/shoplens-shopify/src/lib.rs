//! Typed client for the Shopify Admin REST API.
//!
//! One client per tenant credential: construction is cheap and scoped to the
//! operation that needs it, so no process-global client exists anywhere in
//! the workspace.

mod client;
mod error;
mod pagination;
mod retry;
mod types;


pub use client::ShopifyClient;
pub use error::ShopifyError;
pub use types::{
    ShopCheckout, ShopCustomer, ShopDraftOrder, ShopLineItem, ShopOrder, ShopProduct, ShopVariant,
    WebhookSubscription,
};
