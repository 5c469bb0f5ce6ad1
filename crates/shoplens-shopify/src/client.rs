//! HTTP client for the Shopify Admin REST API.
//!
//! Wraps `reqwest` with access-token header handling, `Link`-header cursor
//! pagination, retry with back-off for transient failures, and typed
//! envelope deserialization. One instance is built per tenant credential.

use std::time::Duration;

use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ShopifyError;
use crate::pagination::next_page_info;
use crate::retry::retry_with_backoff;
use crate::types::{
    CustomersEnvelope, DraftOrdersEnvelope, OrderEnvelope, OrdersEnvelope, ProductsEnvelope,
    ShopCustomer, ShopDraftOrder, ShopOrder, ShopProduct, WebhookEnvelope, WebhookSubscription,
    WebhooksEnvelope,
};

const API_VERSION: &str = "2024-07";
const PAGE_LIMIT: &str = "250";
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Client for one storefront's Shopify Admin REST API.
///
/// Use [`ShopifyClient::new`] with the tenant's shop domain and access token
/// for production, or [`ShopifyClient::with_base_url`] to point at a mock
/// server in tests.
pub struct ShopifyClient {
    client: Client,
    base_url: Url,
    access_token: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ShopifyClient {
    /// Creates a client for `shop_domain` (e.g. `"acme.myshopify.com"`).
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ShopifyError::InvalidBaseUrl`] if the shop
    /// domain does not form a valid URL.
    pub fn new(
        shop_domain: &str,
        access_token: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ShopifyError> {
        let base = format!("https://{shop_domain}/admin/api/{API_VERSION}/");
        let mut client = Self::with_base_url(access_token, timeout_secs, &base)?;
        client.max_retries = max_retries;
        client.backoff_base_ms = backoff_base_ms;
        Ok(client)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// Retries default to zero with a short back-off base so tests opting in
    /// via [`ShopifyClient::with_retries`] stay fast.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ShopifyError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shoplens/0.1 (storefront-analytics)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends path segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| ShopifyError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            base_url,
            access_token: access_token.to_owned(),
            max_retries: 0,
            backoff_base_ms: 10,
        })
    }

    /// Overrides the retry policy (builder-style, used by tests and callers
    /// constructing via [`ShopifyClient::with_base_url`]).
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches every customer, following pagination to exhaustion.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Status`] on a non-2xx answer (after retries for
    ///   429/5xx).
    /// - [`ShopifyError::Http`] on network failure.
    /// - [`ShopifyError::Deserialize`] if a page does not match the expected
    ///   envelope.
    pub async fn list_customers(&self) -> Result<Vec<ShopCustomer>, ShopifyError> {
        self.list_paginated("customers.json", &[], "listCustomers", |e: CustomersEnvelope| {
            e.customers
        })
        .await
    }

    /// Fetches every order regardless of status.
    ///
    /// List payloads may omit line items; call [`ShopifyClient::get_order`]
    /// for the authoritative detail.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ShopifyClient::list_customers`].
    pub async fn list_orders(&self) -> Result<Vec<ShopOrder>, ShopifyError> {
        self.list_paginated(
            "orders.json",
            &[("status", "any")],
            "listOrders",
            |e: OrdersEnvelope| e.orders,
        )
        .await
    }

    /// Fetches full order details by id; line items are guaranteed present.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ShopifyClient::list_customers`].
    pub async fn get_order(&self, order_id: i64) -> Result<ShopOrder, ShopifyError> {
        let context = format!("getOrder(id={order_id})");
        let url = self.resource_url(&format!("orders/{order_id}.json"))?;
        let value = self.get_with_retry(url, &context).await?.0;
        let envelope: OrderEnvelope = decode(value, &context)?;
        Ok(envelope.order)
    }

    /// Fetches the full product catalog.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ShopifyClient::list_customers`].
    pub async fn list_products(&self) -> Result<Vec<ShopProduct>, ShopifyError> {
        self.list_paginated("products.json", &[], "listProducts", |e: ProductsEnvelope| {
            e.products
        })
        .await
    }

    /// Fetches all draft orders.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ShopifyClient::list_customers`].
    pub async fn list_draft_orders(&self) -> Result<Vec<ShopDraftOrder>, ShopifyError> {
        self.list_paginated(
            "draft_orders.json",
            &[],
            "listDraftOrders",
            |e: DraftOrdersEnvelope| e.draft_orders,
        )
        .await
    }

    /// Lists the shop's current webhook subscriptions.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ShopifyClient::list_customers`].
    pub async fn list_webhooks(&self) -> Result<Vec<WebhookSubscription>, ShopifyError> {
        self.list_paginated("webhooks.json", &[], "listWebhooks", |e: WebhooksEnvelope| {
            e.webhooks
        })
        .await
    }

    /// Creates a JSON webhook subscription for `topic` delivering to `address`.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Status`] on a non-2xx answer.
    /// - [`ShopifyError::Http`] on network failure.
    /// - [`ShopifyError::Deserialize`] if the response envelope is malformed.
    pub async fn create_webhook(
        &self,
        topic: &str,
        address: &str,
    ) -> Result<WebhookSubscription, ShopifyError> {
        let context = format!("createWebhook(topic={topic})");
        let url = self.resource_url("webhooks.json")?;
        let body = serde_json::json!({
            "webhook": { "topic": topic, "address": address, "format": "json" }
        });

        let response = self
            .client
            .post(url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ShopifyError::Deserialize {
                context: context.clone(),
                source: e,
            })?;
        let envelope: WebhookEnvelope = decode(value, &context)?;
        Ok(envelope.webhook)
    }

    /// Deletes a webhook subscription by id.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Status`] on a non-2xx answer.
    /// - [`ShopifyError::Http`] on network failure.
    pub async fn delete_webhook(&self, webhook_id: i64) -> Result<(), ShopifyError> {
        let url = self.resource_url(&format!("webhooks/{webhook_id}.json"))?;
        let response = self
            .client
            .delete(url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Drains a paginated list endpoint into one `Vec`.
    async fn list_paginated<E, T>(
        &self,
        path: &str,
        filters: &[(&str, &str)],
        context: &str,
        unwrap: fn(E) -> Vec<T>,
    ) -> Result<Vec<T>, ShopifyError>
    where
        E: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page_info: Option<String> = None;
        loop {
            let url = self.list_url(path, filters, page_info.as_deref())?;
            let (value, next) = self.get_with_retry(url, context).await?;
            let envelope: E = decode(value, context)?;
            items.extend(unwrap(envelope));
            match next {
                Some(cursor) => page_info = Some(cursor),
                None => break,
            }
        }
        Ok(items)
    }

    /// Builds a list URL. Shopify rejects filter parameters on cursor pages,
    /// so once a `page_info` cursor is in play only `limit` rides along.
    pub(crate) fn list_url(
        &self,
        path: &str,
        filters: &[(&str, &str)],
        page_info: Option<&str>,
    ) -> Result<Url, ShopifyError> {
        let mut url = self.resource_url(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", PAGE_LIMIT);
            match page_info {
                Some(cursor) => {
                    pairs.append_pair("page_info", cursor);
                }
                None => {
                    for (key, value) in filters {
                        pairs.append_pair(key, value);
                    }
                }
            }
        }
        Ok(url)
    }

    pub(crate) fn resource_url(&self, path: &str) -> Result<Url, ShopifyError> {
        self.base_url
            .join(path)
            .map_err(|_| ShopifyError::InvalidBaseUrl(format!("{}{path}", self.base_url)))
    }

    /// One GET with transparent retry; returns the parsed body and the next
    /// pagination cursor, if the response advertised one.
    async fn get_with_retry(
        &self,
        url: Url,
        context: &str,
    ) -> Result<(serde_json::Value, Option<String>), ShopifyError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_once(url.clone(), context)
        })
        .await
    }

    async fn get_once(
        &self,
        url: Url,
        context: &str,
    ) -> Result<(serde_json::Value, Option<String>), ShopifyError> {
        let response = self
            .client
            .get(url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .send()
            .await?;

        let status = response.status();
        let link = response
            .headers()
            .get(header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ShopifyError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;
        Ok((value, next_page_info(link.as_deref())))
    }
}

fn decode<E: DeserializeOwned>(value: serde_json::Value, context: &str) -> Result<E, ShopifyError> {
    serde_json::from_value(value).map_err(|e| ShopifyError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
