use thiserror::Error;
use uuid::Uuid;

use shoplens_db::DbError;
use shoplens_shopify::ShopifyError;

/// Errors produced by the reconciliation engine and webhook receiver.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sync/webhook target tenant does not exist.
    #[error("tenant not found: {0}")]
    TenantNotFound(Uuid),

    /// An inbound webhook identified neither a known tenant reference nor a
    /// known shop domain.
    #[error("unable to resolve webhook tenant: {0}")]
    TenantNotResolved(String),

    /// A storefront API call failed; the current sync pass is aborted and
    /// rows written so far remain committed (resync repairs partial state).
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] ShopifyError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// An inbound webhook body did not match the expected payload shape.
    #[error("invalid webhook payload for {context}: {source}")]
    Payload {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
