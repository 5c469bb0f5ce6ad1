//! Reconciliation engine and webhook receiver.
//!
//! Two ingestion paths share one set of upsert primitives: the full resync
//! ([`sync_tenant`]) pulls every entity from the storefront API, and the
//! webhook receiver ([`apply_webhook`]) applies single inbound events. Both
//! are idempotent — every write is an upsert keyed by external id — so
//! at-least-once webhook delivery and concurrent resyncs converge to the
//! same state.

mod engine;
mod error;
mod events;
mod normalize;
mod registration;
mod upsert;
mod webhook;

pub use engine::{sync_tenant, sync_tenant_by_id, SyncOutcome};
pub use error::SyncError;
pub use registration::{register_webhooks, RegistrationOutcome, WEBHOOK_TOPICS};
pub use webhook::{apply_webhook, resolve_webhook_tenant, WebhookTopic};
