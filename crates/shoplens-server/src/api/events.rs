use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shoplens_core::mask_external_id;
use shoplens_db::EventRow;

use super::{normalize_limit, require_tenant, ApiError, AppState};

/// Label shown when an event's customer reference is absent or tombstoned.
const UNKNOWN_CUSTOMER: &str = "Unknown";

#[derive(Debug, Deserialize)]
pub(super) struct EventsQuery {
    pub tenant: Uuid,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct EventItem {
    id: i64,
    r#type: String,
    payload: Value,
    customer: String,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for EventItem {
    fn from(row: EventRow) -> Self {
        let customer = row
            .customer_external_id
            .as_deref()
            .map_or_else(|| UNKNOWN_CUSTOMER.to_string(), mask_external_id);
        Self {
            id: row.id,
            r#type: row.r#type,
            payload: row.payload,
            customer,
            created_at: row.created_at,
        }
    }
}

/// Activity timeline, newest first.
pub(super) async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventItem>>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;
    let limit = normalize_limit(query.limit);
    let rows = shoplens_db::list_events(&state.pool, tenant.id, limit).await?;
    Ok(Json(rows.into_iter().map(EventItem::from).collect()))
}
