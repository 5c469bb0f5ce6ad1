//! Normalization of external payloads into storage-ready domain inputs.
//!
//! All type coercion (string→Decimal), null-defaulting, and synthetic-id
//! derivation lives here, so the transport types stay a faithful mirror of
//! the wire and the db crate only ever sees clean values.

use shoplens_core::{
    display_name, parse_money, NormalizedCustomer, NormalizedLineItem, NormalizedOrder,
    NormalizedProduct,
};
use shoplens_shopify::{ShopCustomer, ShopLineItem, ShopOrder, ShopProduct};

/// Fallback title for payloads that arrive without one.
const UNTITLED: &str = "Untitled";

pub(crate) fn normalize_customer(customer: &ShopCustomer) -> NormalizedCustomer {
    NormalizedCustomer {
        external_id: customer.id.to_string(),
        name: display_name(customer.first_name.as_deref(), customer.last_name.as_deref()),
        email: customer.email.clone(),
        total_spent: parse_money(customer.total_spent.as_deref()),
    }
}

pub(crate) fn normalize_order(order: &ShopOrder) -> NormalizedOrder {
    NormalizedOrder {
        external_id: order.id.to_string(),
        total: parse_money(order.total_price.as_deref()),
    }
}

/// Stable external id for a product synthesized from an order line that
/// carries no catalog product. Derived from the line id so repeated syncs
/// reconcile to the same product row instead of forking duplicates.
pub(crate) fn synthetic_product_external_id(line_id: i64) -> String {
    format!("line-{line_id}")
}

pub(crate) fn normalize_line_item(line: &ShopLineItem) -> NormalizedLineItem {
    let product_external_id = match line.product_id {
        Some(product_id) => product_id.to_string(),
        None => synthetic_product_external_id(line.id),
    };
    NormalizedLineItem {
        external_line_id: line.id.to_string(),
        product_external_id,
        title: line.name.clone().unwrap_or_else(|| UNTITLED.to_string()),
        unit_price: parse_money(line.price.as_deref()),
        quantity: line.quantity.unwrap_or(1),
    }
}

/// Catalog normalization: the price is the first variant's unit price.
pub(crate) fn normalize_product(product: &ShopProduct) -> NormalizedProduct {
    NormalizedProduct {
        external_id: product.id.to_string(),
        title: product.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
        price: parse_money(product.variants.first().and_then(|v| v.price.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shoplens_shopify::ShopVariant;

    use super::*;

    #[test]
    fn customer_name_defaults_to_anonymous() {
        let customer = ShopCustomer {
            id: 42,
            first_name: Some("  ".to_string()),
            last_name: None,
            email: Some("x@example.com".to_string()),
            total_spent: Some("18.50".to_string()),
        };
        let normalized = normalize_customer(&customer);
        assert_eq!(normalized.external_id, "42");
        assert_eq!(normalized.name, "Anonymous");
        assert_eq!(normalized.total_spent, Decimal::new(1850, 2));
    }

    #[test]
    fn line_with_catalog_product_uses_catalog_id() {
        let line = ShopLineItem {
            id: 669,
            product_id: Some(7513594),
            name: Some("IPod Nano".to_string()),
            price: Some("199.00".to_string()),
            quantity: Some(2),
        };
        let normalized = normalize_line_item(&line);
        assert_eq!(normalized.product_external_id, "7513594");
        assert_eq!(normalized.external_line_id, "669");
        assert_eq!(normalized.line_total(), Decimal::new(39800, 2));
    }

    #[test]
    fn line_without_catalog_product_synthesizes_stable_id() {
        let line = ShopLineItem {
            id: 669,
            product_id: None,
            name: Some("Engraving".to_string()),
            price: Some("11.94".to_string()),
            quantity: None,
        };
        let first = normalize_line_item(&line);
        let second = normalize_line_item(&line);
        assert_eq!(first.product_external_id, "line-669");
        // Same synthetic id on every pass — no duplicate product rows.
        assert_eq!(first.product_external_id, second.product_external_id);
        assert_eq!(first.quantity, 1);
    }

    #[test]
    fn line_total_is_unit_price_times_quantity() {
        let line = ShopLineItem {
            id: 1,
            product_id: Some(55),
            name: Some("Widget".to_string()),
            price: Some("10.00".to_string()),
            quantity: Some(3),
        };
        let normalized = normalize_line_item(&line);
        assert_eq!(normalized.unit_price, Decimal::new(1000, 2));
        assert_eq!(normalized.line_total(), Decimal::new(3000, 2));
    }

    #[test]
    fn product_price_comes_from_first_variant() {
        let product = ShopProduct {
            id: 99,
            title: Some("Widget".to_string()),
            variants: vec![
                ShopVariant {
                    id: 1,
                    price: Some("10.00".to_string()),
                },
                ShopVariant {
                    id: 2,
                    price: Some("12.00".to_string()),
                },
            ],
            status: Some("active".to_string()),
        };
        let normalized = normalize_product(&product);
        assert_eq!(normalized.price, Decimal::new(1000, 2));
    }

    #[test]
    fn product_without_variants_prices_at_zero() {
        let product = ShopProduct {
            id: 99,
            title: None,
            variants: vec![],
            status: None,
        };
        let normalized = normalize_product(&product);
        assert_eq!(normalized.title, "Untitled");
        assert_eq!(normalized.price, Decimal::ZERO);
    }
}
