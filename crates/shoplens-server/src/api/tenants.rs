use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shoplens_db::{NewTenant, TenantRow};
use shoplens_shopify::ShopifyClient;

use super::{require_tenant, ApiError, AppState};

/// Tenant as exposed to API callers. The access token never leaves the
/// backend; the serial database id is replaced by `public_id`.
#[derive(Debug, Serialize)]
pub(super) struct TenantItem {
    id: Uuid,
    name: String,
    shop_domain: String,
    custom_domain: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TenantRow> for TenantItem {
    fn from(row: TenantRow) -> Self {
        Self {
            id: row.public_id,
            name: row.name,
            shop_domain: row.shop_domain,
            custom_domain: row.custom_domain,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateTenantRequest {
    name: String,
    shop_domain: String,
    access_token: String,
    custom_domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ResyncResponse {
    customers: usize,
    orders: usize,
    products: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct RegisterWebhooksResponse {
    created: usize,
    replaced: usize,
    kept: usize,
}

pub(super) async fn create_tenant(
    State(state): State<AppState>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<TenantItem>), ApiError> {
    let row = shoplens_db::create_tenant(
        &state.pool,
        &NewTenant {
            name: &request.name,
            shop_domain: &request.shop_domain,
            access_token: &request.access_token,
            custom_domain: request.custom_domain.as_deref(),
        },
    )
    .await?;

    tracing::info!(tenant = %row.public_id, shop_domain = %row.shop_domain, "tenant onboarded");
    Ok((StatusCode::CREATED, Json(TenantItem::from(row))))
}

pub(super) async fn list_tenants(
    State(state): State<AppState>,
) -> Result<Json<Vec<TenantItem>>, ApiError> {
    let rows = shoplens_db::list_tenants(&state.pool).await?;
    Ok(Json(rows.into_iter().map(TenantItem::from).collect()))
}

pub(super) async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<TenantItem>, ApiError> {
    let row = require_tenant(&state.pool, tenant_id).await?;
    Ok(Json(TenantItem::from(row)))
}

/// Manual full-resync trigger; returns the entity counts for operator
/// display. Runs inline, so slow upstreams mean a slow response.
pub(super) async fn resync_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<ResyncResponse>, ApiError> {
    let outcome = shoplens_sync::sync_tenant_by_id(&state.pool, &state.config, tenant_id).await?;
    Ok(Json(ResyncResponse {
        customers: outcome.customers,
        orders: outcome.orders,
        products: outcome.products,
    }))
}

pub(super) async fn register_tenant_webhooks(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<RegisterWebhooksResponse>, ApiError> {
    let tenant = require_tenant(&state.pool, tenant_id).await?;
    let client = ShopifyClient::new(
        &tenant.shop_domain,
        &tenant.access_token,
        state.config.shopify_request_timeout_secs,
        state.config.shopify_max_retries,
        state.config.shopify_retry_backoff_base_ms,
    )
    .map_err(shoplens_sync::SyncError::from)?;

    let outcome =
        shoplens_sync::register_webhooks(&client, &state.config.public_base_url, tenant.public_id)
            .await?;
    Ok(Json(RegisterWebhooksResponse {
        created: outcome.created,
        replaced: outcome.replaced,
        kept: outcome.kept,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_item_redacts_the_access_token() {
        let row = TenantRow {
            id: 7,
            public_id: Uuid::nil(),
            name: "Acme".to_string(),
            shop_domain: "acme.myshopify.com".to_string(),
            access_token: "shpat_secret".to_string(),
            custom_domain: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&TenantItem::from(row)).expect("serialize");
        assert!(!json.contains("shpat_secret"));
        assert!(!json.contains("\"id\":7"));
        assert!(json.contains("\"shop_domain\":\"acme.myshopify.com\""));
    }
}
