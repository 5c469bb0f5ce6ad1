//! Inbound webhook endpoint.
//!
//! One route covers all seven subscribed topics: the topic is the last two
//! path segments (`/webhooks/orders/create`), the tenant rides along either
//! as the `tenant` query parameter baked into the registered address or as
//! the shop-domain header. Handlers are idempotent, so a 2xx is returned
//! only after the delivery is fully applied; anything else makes the
//! external system redeliver.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use shoplens_sync::{apply_webhook, resolve_webhook_tenant, WebhookTopic};

use crate::api::{ApiError, AppState};

const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

#[derive(Debug, Deserialize)]
struct WebhookQuery {
    tenant: Option<Uuid>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/{entity}/{action}", post(receive))
}

async fn receive(
    State(state): State<AppState>,
    Path((entity, action)): Path<(String, String)>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let topic_name = format!("{entity}/{action}");
    let Some(topic) = WebhookTopic::from_topic(&topic_name) else {
        return Err(ApiError::not_found(format!(
            "unsupported webhook topic: {topic_name}"
        )));
    };

    let shop_domain = headers
        .get(SHOP_DOMAIN_HEADER)
        .and_then(|v| v.to_str().ok());
    let tenant = resolve_webhook_tenant(&state.pool, query.tenant, shop_domain).await?;

    apply_webhook(&state.pool, &tenant, topic, &body).await?;
    Ok((StatusCode::OK, "OK"))
}
