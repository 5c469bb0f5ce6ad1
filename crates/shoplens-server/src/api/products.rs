use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use shoplens_db::{ProductRevenueRow, ProductRow};

use super::{require_tenant, ApiError, AppState, TenantQuery};

const CATALOG_LIMIT: i64 = 10;
const TOP_PRODUCTS_LIMIT: i64 = 5;

/// Title shown when a revenue row's product link has been tombstoned.
const UNKNOWN_PRODUCT: &str = "Unknown";

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    external_id: String,
    title: String,
    price: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductRevenueItem {
    title: String,
    units: i64,
    revenue: Decimal,
}

/// Top ten catalog items by price.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<ProductItem>>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;
    let rows = shoplens_db::list_products_by_price(&state.pool, tenant.id, CATALOG_LIMIT).await?;
    let data = rows
        .into_iter()
        .map(|row| ProductItem {
            external_id: row.external_id,
            title: row.title,
            price: row.price,
        })
        .collect();
    Ok(Json(data))
}

/// Top five products by summed line-item revenue. Tenants with no orders
/// fall back to the top five catalog items, shown with zero units and
/// revenue, so a freshly onboarded dashboard is not empty.
pub(super) async fn product_stats(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<ProductRevenueItem>>, ApiError> {
    let tenant = require_tenant(&state.pool, query.tenant).await?;

    let rows =
        shoplens_db::product_revenue(&state.pool, tenant.id, TOP_PRODUCTS_LIMIT).await?;
    if !rows.is_empty() {
        return Ok(Json(rows.into_iter().map(revenue_item).collect()));
    }

    let catalog =
        shoplens_db::list_products_by_price(&state.pool, tenant.id, TOP_PRODUCTS_LIMIT).await?;
    Ok(Json(catalog.into_iter().map(catalog_fallback_item).collect()))
}

fn revenue_item(row: ProductRevenueRow) -> ProductRevenueItem {
    ProductRevenueItem {
        title: row.title.unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
        units: row.units,
        revenue: row.revenue,
    }
}

fn catalog_fallback_item(row: ProductRow) -> ProductRevenueItem {
    ProductRevenueItem {
        title: row.title,
        units: 0,
        revenue: Decimal::ZERO,
    }
}
