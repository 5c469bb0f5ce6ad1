//! Database operations for the append-only `events` table.
//!
//! Events are the dashboard's activity timeline. Rows are inserted and read,
//! never updated or deleted. Payloads are slim type-specific snapshots, not
//! raw external bodies.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use shoplens_core::EventType;

use crate::DbError;

/// A row from the `events` table, with the referenced customer's external id
/// joined in for display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: i64,
    pub r#type: String,
    pub payload: Value,
    pub customer_external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appends one event. The weak customer reference may be `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn append_event(
    pool: &PgPool,
    tenant_id: i64,
    event_type: EventType,
    payload: &Value,
    customer_id: Option<i64>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO events (tenant_id, type, payload, customer_id) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(tenant_id)
    .bind(event_type.as_str())
    .bind(payload)
    .bind(customer_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns a tenant's events, newest first, capped at `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_events(
    pool: &PgPool,
    tenant_id: i64,
    limit: i64,
) -> Result<Vec<EventRow>, DbError> {
    let rows = sqlx::query_as::<_, EventRow>(
        "SELECT e.id, e.type, e.payload, \
                c.external_id AS customer_external_id, \
                e.created_at \
         FROM events e \
         LEFT JOIN customers c ON c.id = e.customer_id \
         WHERE e.tenant_id = $1 \
         ORDER BY e.created_at DESC, e.id DESC \
         LIMIT $2",
    )
    .bind(tenant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
