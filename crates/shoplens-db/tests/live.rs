//! Live integration tests for shoplens-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/shoplens-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use rust_decimal::Decimal;
use shoplens_core::{NormalizedCustomer, NormalizedOrder, NormalizedProduct};
use shoplens_db::{
    delete_product_by_external_id, ensure_customer, ensure_product, find_or_create_customer,
    list_customers, product_revenue, recompute_total_spent, upsert_customer, upsert_order,
    upsert_order_item, upsert_product, CustomerRow,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a minimal tenant row and return its generated `id`.
async fn insert_test_tenant(pool: &sqlx::PgPool, shop_domain: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO tenants (name, shop_domain, access_token) \
         VALUES ($1, $2, 'shpat_test') RETURNING id",
    )
    .bind(format!("Test Shop {shop_domain}"))
    .bind(shop_domain)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_test_tenant failed for domain '{shop_domain}': {e}"))
}

async fn fetch_customer(pool: &sqlx::PgPool, tenant_id: i64, external_id: &str) -> CustomerRow {
    sqlx::query_as::<_, CustomerRow>(
        "SELECT id, tenant_id, external_id, name, email, total_spent, created_at, updated_at \
         FROM customers WHERE tenant_id = $1 AND external_id = $2",
    )
    .bind(tenant_id)
    .bind(external_id)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("fetch_customer failed for external id '{external_id}': {e}"))
}

fn make_customer(external_id: &str, name: &str, total_spent: Decimal) -> NormalizedCustomer {
    NormalizedCustomer {
        external_id: external_id.to_string(),
        name: name.to_string(),
        email: Some(format!("{external_id}@example.com")),
        total_spent,
    }
}

fn make_order(external_id: &str, total: Decimal) -> NormalizedOrder {
    NormalizedOrder {
        external_id: external_id.to_string(),
        total,
    }
}

fn make_product(external_id: &str, title: &str, price: Decimal) -> NormalizedProduct {
    NormalizedProduct {
        external_id: external_id.to_string(),
        title: title.to_string(),
        price,
    }
}

fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

// ---------------------------------------------------------------------------
// Section 1: Upsert Idempotency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn customer_upsert_is_idempotent_by_external_id(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "idem.myshopify.com").await;
    let customer = make_customer("1001", "Ada Lovelace", dec(5000));

    let id_first = upsert_customer(&pool, tenant_id, &customer)
        .await
        .expect("first upsert_customer failed");
    let id_second = upsert_customer(&pool, tenant_id, &customer)
        .await
        .expect("second upsert_customer failed");

    assert_eq!(
        id_first, id_second,
        "upsert must return the same id both times"
    );

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM customers WHERE tenant_id = $1 AND external_id = $2",
    )
    .bind(tenant_id)
    .bind("1001")
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(
        count, 1,
        "exactly one customer row should exist after two upserts"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn double_sync_pass_produces_no_duplicate_rows(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "double.myshopify.com").await;

    // Two identical passes of the customer → order → item → recompute flow.
    for _ in 0..2 {
        let customer_id = upsert_customer(
            &pool,
            tenant_id,
            &make_customer("2001", "Grace Hopper", dec(0)),
        )
        .await
        .expect("upsert_customer failed");

        let order_id = upsert_order(
            &pool,
            tenant_id,
            &make_order("9001", dec(4500)),
            Some(customer_id),
        )
        .await
        .expect("upsert_order failed");

        let product_id = ensure_product(&pool, tenant_id, "p-1", "Widget", dec(1500))
            .await
            .expect("ensure_product failed");

        upsert_order_item(
            &pool,
            tenant_id,
            order_id,
            Some(product_id),
            "line-77",
            3,
            dec(4500),
        )
        .await
        .expect("upsert_order_item failed");

        recompute_total_spent(&pool, tenant_id)
            .await
            .expect("recompute_total_spent failed");
    }

    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE tenant_id = $1")
        .bind(tenant_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE tenant_id = $1")
        .bind(tenant_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(orders, 1, "re-syncing must not duplicate orders");
    assert_eq!(items, 1, "re-syncing must not duplicate line items");

    let row = fetch_customer(&pool, tenant_id, "2001").await;
    assert_eq!(
        row.total_spent,
        dec(4500),
        "recomputed total must equal the single order's total"
    );
}

// ---------------------------------------------------------------------------
// Section 2: Lifetime-Spend Recompute
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn recompute_sums_linked_orders_and_zeroes_the_rest(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "recompute.myshopify.com").await;

    // Spender has two orders; the reported figure of 999.99 is a lie the
    // recompute must correct. Lurker has no orders at all.
    let spender_id = upsert_customer(
        &pool,
        tenant_id,
        &make_customer("3001", "Spender", dec(99_999)),
    )
    .await
    .expect("upsert_customer failed");
    upsert_customer(&pool, tenant_id, &make_customer("3002", "Lurker", dec(99_999)))
        .await
        .expect("upsert_customer failed");

    upsert_order(&pool, tenant_id, &make_order("9101", dec(1000)), Some(spender_id))
        .await
        .expect("upsert_order failed");
    upsert_order(&pool, tenant_id, &make_order("9102", dec(2050)), Some(spender_id))
        .await
        .expect("upsert_order failed");

    let written = recompute_total_spent(&pool, tenant_id)
        .await
        .expect("recompute_total_spent failed");
    assert_eq!(written, 2, "every customer row of the tenant gets written");

    let spender = fetch_customer(&pool, tenant_id, "3001").await;
    let lurker = fetch_customer(&pool, tenant_id, "3002").await;

    assert_eq!(spender.total_spent, dec(3050), "sum of the two linked orders");
    assert_eq!(
        lurker.total_spent,
        Decimal::ZERO,
        "a customer without orders is zeroed, not left at the reported figure"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn recompute_is_strictly_tenant_scoped(pool: sqlx::PgPool) {
    let tenant_a = insert_test_tenant(&pool, "alpha.myshopify.com").await;
    let tenant_b = insert_test_tenant(&pool, "beta.myshopify.com").await;

    // Same external id under both tenants; numerically colliding ids must
    // resolve to distinct rows.
    let a_id = upsert_customer(&pool, tenant_a, &make_customer("42", "Alpha Ann", dec(0)))
        .await
        .expect("upsert under tenant A failed");
    let b_id = upsert_customer(&pool, tenant_b, &make_customer("42", "Beta Bob", dec(7700)))
        .await
        .expect("upsert under tenant B failed");
    assert_ne!(a_id, b_id, "colliding external ids must map to distinct rows");

    upsert_order(&pool, tenant_a, &make_order("42", dec(1200)), Some(a_id))
        .await
        .expect("upsert_order failed");

    recompute_total_spent(&pool, tenant_a)
        .await
        .expect("recompute_total_spent failed");

    let ann = fetch_customer(&pool, tenant_a, "42").await;
    let bob = fetch_customer(&pool, tenant_b, "42").await;

    assert_eq!(ann.total_spent, dec(1200));
    assert_eq!(ann.name, "Alpha Ann");
    assert_eq!(
        bob.total_spent,
        dec(7700),
        "tenant B's row must be untouched by tenant A's recompute"
    );
    assert_eq!(bob.name, "Beta Bob");
}

// ---------------------------------------------------------------------------
// Section 3: Customer Write Flavours
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ensure_customer_never_touches_total_spent(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "ensure.myshopify.com").await;

    upsert_customer(&pool, tenant_id, &make_customer("4001", "Old Name", dec(8800)))
        .await
        .expect("upsert_customer failed");

    let id = ensure_customer(&pool, tenant_id, "4001", "New Name", Some("new@example.com"))
        .await
        .expect("ensure_customer failed");

    let row = fetch_customer(&pool, tenant_id, "4001").await;
    assert_eq!(row.id, id);
    assert_eq!(row.name, "New Name", "sighting refreshes the name");
    assert_eq!(row.email.as_deref(), Some("new@example.com"));
    assert_eq!(
        row.total_spent,
        dec(8800),
        "sighting must never touch the stored total"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn ensure_customer_creates_unseen_with_zero_balance(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "ensure-new.myshopify.com").await;

    ensure_customer(&pool, tenant_id, "4002", "Fresh Face", None)
        .await
        .expect("ensure_customer failed");

    let row = fetch_customer(&pool, tenant_id, "4002").await;
    assert_eq!(row.total_spent, Decimal::ZERO);
    assert!(row.email.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn find_or_create_leaves_existing_customer_untouched(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "drafts.myshopify.com").await;

    upsert_customer(
        &pool,
        tenant_id,
        &make_customer("5001", "Ada Lovelace", dec(25_000)),
    )
    .await
    .expect("upsert_customer failed");

    // A draft order referencing this customer carries no usable names, so
    // the caller passes the "Anonymous" fallback. None of it may stick.
    let id = find_or_create_customer(&pool, tenant_id, "5001", "Anonymous", None)
        .await
        .expect("find_or_create_customer failed");

    let row = fetch_customer(&pool, tenant_id, "5001").await;
    assert_eq!(row.id, id, "the existing row's id is returned");
    assert_eq!(row.name, "Ada Lovelace", "stored name survives the draft pass");
    assert_eq!(
        row.email.as_deref(),
        Some("5001@example.com"),
        "stored email survives the draft pass"
    );
    assert_eq!(row.total_spent, dec(25_000));
}

#[sqlx::test(migrations = "../../migrations")]
async fn find_or_create_builds_unseen_customer_with_zero_balance(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "drafts-new.myshopify.com").await;

    let id = find_or_create_customer(&pool, tenant_id, "5002", "Draft Dan", Some("dan@example.com"))
        .await
        .expect("find_or_create_customer failed");

    let row = fetch_customer(&pool, tenant_id, "5002").await;
    assert_eq!(row.id, id);
    assert_eq!(row.name, "Draft Dan");
    assert_eq!(row.total_spent, Decimal::ZERO);
}

#[sqlx::test(migrations = "../../migrations")]
async fn webhook_update_then_resync_converge_on_one_row(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "converge.myshopify.com").await;

    // Order webhook sights the customer first, then a customers/update
    // webhook delivers the full payload, then a scheduled resync re-delivers
    // the same payload. One row throughout, final fields from the payload.
    let sighted = ensure_customer(&pool, tenant_id, "6001", "Anonymous", None)
        .await
        .expect("ensure_customer failed");

    let payload = make_customer("6001", "Named Customer", dec(3300));
    let updated = upsert_customer(&pool, tenant_id, &payload)
        .await
        .expect("webhook upsert_customer failed");
    let resynced = upsert_customer(&pool, tenant_id, &payload)
        .await
        .expect("resync upsert_customer failed");

    assert_eq!(sighted, updated);
    assert_eq!(updated, resynced);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM customers WHERE tenant_id = $1 AND external_id = $2",
    )
    .bind(tenant_id)
    .bind("6001")
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);

    let row = fetch_customer(&pool, tenant_id, "6001").await;
    assert_eq!(row.name, "Named Customer");
    assert_eq!(row.total_spent, dec(3300));
}

// ---------------------------------------------------------------------------
// Section 4: Catalog Writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ensure_product_preserves_catalog_price(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "catalog.myshopify.com").await;

    let catalog_id = upsert_product(
        &pool,
        tenant_id,
        &make_product("7001", "Deluxe Widget", dec(1999)),
    )
    .await
    .expect("upsert_product failed");

    // A line item sights the same product at a discounted unit price; the
    // catalog price must win, the title may refresh.
    let sighted_id = ensure_product(&pool, tenant_id, "7001", "Deluxe Widget v2", dec(999))
        .await
        .expect("ensure_product failed");
    assert_eq!(catalog_id, sighted_id);

    let (title, price): (String, Decimal) = sqlx::query_as(
        "SELECT title, price FROM products WHERE tenant_id = $1 AND external_id = $2",
    )
    .bind(tenant_id)
    .bind("7001")
    .fetch_one(&pool)
    .await
    .expect("product row fetch failed");

    assert_eq!(title, "Deluxe Widget v2", "sighting refreshes the title");
    assert_eq!(price, dec(1999), "catalog price survives the sighting");
}

#[sqlx::test(migrations = "../../migrations")]
async fn ensure_product_creates_unseen_with_unit_price(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "catalog-new.myshopify.com").await;

    ensure_product(&pool, tenant_id, "line-88", "Custom Item", dec(450))
        .await
        .expect("ensure_product failed");

    let price: Decimal = sqlx::query_scalar(
        "SELECT price FROM products WHERE tenant_id = $1 AND external_id = $2",
    )
    .bind(tenant_id)
    .bind("line-88")
    .fetch_one(&pool)
    .await
    .expect("product row fetch failed");

    assert_eq!(price, dec(450), "unseen product seeds from the unit price");
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleted_product_tombstones_revenue_rollup(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "tombstone.myshopify.com").await;

    let order_id = upsert_order(&pool, tenant_id, &make_order("9301", dec(3000)), None)
        .await
        .expect("upsert_order failed");
    let product_id = upsert_product(
        &pool,
        tenant_id,
        &make_product("7002", "Short Lived", dec(1000)),
    )
    .await
    .expect("upsert_product failed");
    upsert_order_item(
        &pool,
        tenant_id,
        order_id,
        Some(product_id),
        "line-99",
        3,
        dec(3000),
    )
    .await
    .expect("upsert_order_item failed");

    let deleted = delete_product_by_external_id(&pool, tenant_id, "7002")
        .await
        .expect("delete_product_by_external_id failed");
    assert!(deleted);

    let rows = product_revenue(&pool, tenant_id, 5)
        .await
        .expect("product_revenue failed");
    assert_eq!(rows.len(), 1, "the sold line still counts toward revenue");
    assert!(rows[0].product_id.is_none(), "product link is tombstoned");
    assert!(rows[0].title.is_none());
    assert_eq!(rows[0].units, 3);
    assert_eq!(rows[0].revenue, dec(3000));
}

// ---------------------------------------------------------------------------
// Section 5: Listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_customers_joins_order_counts(pool: sqlx::PgPool) {
    let tenant_id = insert_test_tenant(&pool, "listing.myshopify.com").await;

    let buyer_id = upsert_customer(&pool, tenant_id, &make_customer("8001", "Buyer", dec(0)))
        .await
        .expect("upsert_customer failed");
    upsert_customer(&pool, tenant_id, &make_customer("8002", "Browser", dec(0)))
        .await
        .expect("upsert_customer failed");

    upsert_order(&pool, tenant_id, &make_order("9401", dec(500)), Some(buyer_id))
        .await
        .expect("upsert_order failed");
    upsert_order(&pool, tenant_id, &make_order("9402", dec(700)), Some(buyer_id))
        .await
        .expect("upsert_order failed");

    let rows = list_customers(&pool, tenant_id)
        .await
        .expect("list_customers failed");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].external_id, "8001");
    assert_eq!(rows[0].orders_count, 2);
    assert_eq!(rows[1].orders_count, 0);
}
