//! Webhook subscription registration.
//!
//! After onboarding (and on demand), the shop's subscription list is
//! reconciled against the topics this receiver handles: matching
//! subscriptions are kept, same-topic subscriptions pointing elsewhere are
//! replaced, and missing ones are created. Running it twice is a no-op.

use uuid::Uuid;

use shoplens_shopify::ShopifyClient;

use crate::error::SyncError;
use crate::webhook::WebhookTopic;

/// Every topic the receiver subscribes to.
pub const WEBHOOK_TOPICS: [WebhookTopic; 7] = [
    WebhookTopic::OrdersCreate,
    WebhookTopic::CustomersCreate,
    WebhookTopic::CustomersUpdate,
    WebhookTopic::ProductsCreate,
    WebhookTopic::ProductsUpdate,
    WebhookTopic::ProductsDelete,
    WebhookTopic::CheckoutsUpdate,
];

/// Counts from one registration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub created: usize,
    pub replaced: usize,
    pub kept: usize,
}

/// Reconciles the shop's webhook subscriptions with [`WEBHOOK_TOPICS`].
///
/// The delivery address embeds the tenant's public id so inbound deliveries
/// resolve without relying on the shop-domain header.
///
/// # Errors
///
/// [`SyncError::Upstream`] if any subscription API call fails.
pub async fn register_webhooks(
    client: &ShopifyClient,
    public_base_url: &str,
    tenant_public_id: Uuid,
) -> Result<RegistrationOutcome, SyncError> {
    let existing = client.list_webhooks().await?;
    let mut outcome = RegistrationOutcome::default();

    for topic in WEBHOOK_TOPICS {
        let address = webhook_address(public_base_url, topic, tenant_public_id);
        let mut present = false;

        for subscription in existing.iter().filter(|s| s.topic == topic.as_str()) {
            if subscription.address == address {
                present = true;
            } else {
                // Stale address from an earlier deployment; replace it.
                client.delete_webhook(subscription.id).await?;
                outcome.replaced += 1;
            }
        }

        if present {
            outcome.kept += 1;
        } else {
            client.create_webhook(topic.as_str(), &address).await?;
            outcome.created += 1;
        }
    }

    tracing::info!(
        tenant = %tenant_public_id,
        created = outcome.created,
        replaced = outcome.replaced,
        kept = outcome.kept,
        "webhook registration complete"
    );

    Ok(outcome)
}

/// Delivery address for one topic, e.g.
/// `https://api.example.com/webhooks/orders/create?tenant=<public-id>`.
fn webhook_address(public_base_url: &str, topic: WebhookTopic, tenant_public_id: Uuid) -> String {
    format!(
        "{}/webhooks/{}?tenant={tenant_public_id}",
        public_base_url.trim_end_matches('/'),
        topic.as_str()
    )
}
