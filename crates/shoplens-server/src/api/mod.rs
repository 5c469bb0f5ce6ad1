mod customers;
mod events;
mod orders;
mod overview;
mod products;
mod tenants;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use shoplens_core::AppConfig;
use shoplens_db::{DbError, TenantRow};
use shoplens_sync::SyncError;

use crate::webhooks;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

/// API error response: `{"error": message}` with a mapped status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        tracing::error!(error = %error, "database query failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "database query failed")
    }
}

impl From<SyncError> for ApiError {
    fn from(error: SyncError) -> Self {
        match &error {
            SyncError::TenantNotFound(_) => Self::new(StatusCode::NOT_FOUND, error.to_string()),
            SyncError::TenantNotResolved(_) | SyncError::Payload { .. } => {
                Self::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            SyncError::Upstream(e) => {
                tracing::error!(error = %e, "upstream fetch failed");
                Self::new(StatusCode::BAD_GATEWAY, error.to_string())
            }
            SyncError::Db(e) => {
                tracing::error!(error = %e, "sync write failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "persistence failed")
            }
        }
    }
}

/// Query parameter carried by every dashboard read endpoint.
#[derive(Debug, serde::Deserialize)]
pub(super) struct TenantQuery {
    pub tenant: Uuid,
}

/// Resolves the tenant a read endpoint is scoped to, or 404.
pub(super) async fn require_tenant(pool: &PgPool, public_id: Uuid) -> Result<TenantRow, ApiError> {
    shoplens_db::get_tenant_by_public_id(pool, public_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("tenant not found: {public_id}")))
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/tenants",
            get(tenants::list_tenants).post(tenants::create_tenant),
        )
        .route("/api/tenants/{tenant_id}", get(tenants::get_tenant))
        .route(
            "/api/tenants/{tenant_id}/resync",
            post(tenants::resync_tenant),
        )
        .route(
            "/api/tenants/{tenant_id}/webhooks",
            post(tenants::register_tenant_webhooks),
        )
        .route("/api/customers", get(customers::list_customers))
        .route("/api/customers/stats", get(customers::customer_stats))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/stats", get(orders::order_stats))
        .route("/api/products", get(products::list_products))
        .route("/api/products/stats", get(products::product_stats))
        .route("/api/events", get(events::list_events))
        .route("/api/overview", get(overview::get_overview))
        .merge(webhooks::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match shoplens_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn tenant_not_found_maps_to_404() {
        let response = ApiError::from(SyncError::TenantNotFound(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unresolved_webhook_tenant_maps_to_400() {
        let response =
            ApiError::from(SyncError::TenantNotResolved("nope".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_body_serializes_as_single_error_field() {
        let body = ErrorBody {
            error: "tenant not found".to_string(),
        };
        let json = serde_json::to_string(&body).expect("serialize");
        assert_eq!(json, "{\"error\":\"tenant not found\"}");
    }
}
