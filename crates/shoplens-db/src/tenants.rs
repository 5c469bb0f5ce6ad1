//! Database operations for the `tenants` table.
//!
//! A tenant is one onboarded storefront account and its credential — the
//! unit of data isolation for every other table. Tenants are addressed
//! externally by `public_id`; the serial `id` is the internal FK target.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `tenants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TenantRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub shop_domain: String,
    pub access_token: String,
    pub custom_domain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for tenant creation.
#[derive(Debug, Clone)]
pub struct NewTenant<'a> {
    pub name: &'a str,
    pub shop_domain: &'a str,
    pub access_token: &'a str,
    pub custom_domain: Option<&'a str>,
}

/// Creates a tenant and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including the unique
/// constraint on `shop_domain`).
pub async fn create_tenant(pool: &PgPool, tenant: &NewTenant<'_>) -> Result<TenantRow, DbError> {
    let row = sqlx::query_as::<_, TenantRow>(
        "INSERT INTO tenants (name, shop_domain, access_token, custom_domain) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, public_id, name, shop_domain, access_token, custom_domain, \
                   created_at, updated_at",
    )
    .bind(tenant.name)
    .bind(tenant.shop_domain)
    .bind(tenant.access_token)
    .bind(tenant.custom_domain)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all tenants, ordered by creation time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tenants(pool: &PgPool) -> Result<Vec<TenantRow>, DbError> {
    let rows = sqlx::query_as::<_, TenantRow>(
        "SELECT id, public_id, name, shop_domain, access_token, custom_domain, \
                created_at, updated_at \
         FROM tenants \
         ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a tenant by its externally visible `public_id`, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_tenant_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<TenantRow>, DbError> {
    let row = sqlx::query_as::<_, TenantRow>(
        "SELECT id, public_id, name, shop_domain, access_token, custom_domain, \
                created_at, updated_at \
         FROM tenants \
         WHERE public_id = $1",
    )
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a tenant by external shop domain, or `None`. This is the webhook
/// resolution path: inbound deliveries carry the shop domain in a header.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_tenant_by_shop_domain(
    pool: &PgPool,
    shop_domain: &str,
) -> Result<Option<TenantRow>, DbError> {
    let row = sqlx::query_as::<_, TenantRow>(
        "SELECT id, public_id, name, shop_domain, access_token, custom_domain, \
                created_at, updated_at \
         FROM tenants \
         WHERE shop_domain = $1",
    )
    .bind(shop_domain)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
