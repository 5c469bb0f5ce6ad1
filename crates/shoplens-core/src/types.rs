use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timeline event types recorded in the append-only event log.
///
/// Serialized with snake_case wire names, matching the strings stored in the
/// `events.type` column and returned by the events API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OrderCreated,
    CustomerCreated,
    CustomerUpdated,
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    CheckoutStarted,
    CartAbandoned,
    DraftOrder,
}

impl EventType {
    /// Returns the wire/storage name for this event type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::OrderCreated => "order_created",
            EventType::CustomerCreated => "customer_created",
            EventType::CustomerUpdated => "customer_updated",
            EventType::ProductCreated => "product_created",
            EventType::ProductUpdated => "product_updated",
            EventType::ProductDeleted => "product_deleted",
            EventType::CheckoutStarted => "checkout_started",
            EventType::CartAbandoned => "cart_abandoned",
            EventType::DraftOrder => "draft_order",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer normalized from an external payload, ready for upsert.
///
/// `total_spent` is the externally reported figure. It is only an initial
/// placeholder: every full resync ends with a wholesale recompute from the
/// orders actually linked to the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedCustomer {
    /// External numeric customer ID, stored as a string to avoid precision loss.
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub total_spent: Decimal,
}

/// A product normalized from an external payload.
///
/// `price` is the catalog unit price (first variant), never a line total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub external_id: String,
    pub title: String,
    pub price: Decimal,
}

/// An order normalized from an external payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedOrder {
    pub external_id: String,
    pub total: Decimal,
}

/// A single order line normalized from an external payload.
///
/// `product_external_id` is the catalog product id when the line carries one,
/// or a synthetic `line-<line_id>` key so repeated syncs reconcile to the
/// same product row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedLineItem {
    pub external_line_id: String,
    pub product_external_id: String,
    pub title: String,
    /// Catalog unit price for the line's product.
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl NormalizedLineItem {
    /// Line total: unit price × quantity. This is the figure persisted on the
    /// order-item row; the product row keeps the unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Coerce an external money string (e.g. `"129.95"`) into a [`Decimal`].
///
/// Missing, empty, or unparseable values coerce to zero — external payloads
/// routinely omit price fields.
#[must_use]
pub fn parse_money(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
        .unwrap_or(Decimal::ZERO)
}

/// Build a customer display name from external first/last fields.
///
/// Both parts are trimmed; when both are empty the name defaults to
/// `"Anonymous"`.
#[must_use]
pub fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    let joined = format!(
        "{} {}",
        first.unwrap_or_default().trim(),
        last.unwrap_or_default().trim()
    );
    let joined = joined.trim();
    if joined.is_empty() {
        "Anonymous".to_string()
    } else {
        joined.to_string()
    }
}

/// Mask a customer-sensitive external id down to its last four characters,
/// e.g. `"6549873210"` → `"…3210"`. Short ids are returned whole behind the
/// same prefix.
#[must_use]
pub fn mask_external_id(external_id: &str) -> String {
    let chars: Vec<char> = external_id.chars().collect();
    let tail: String = if chars.len() > 4 {
        chars[chars.len() - 4..].iter().collect()
    } else {
        external_id.to_string()
    };
    format!("…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_wire_name() {
        assert_eq!(EventType::CartAbandoned.as_str(), "cart_abandoned");
        let json = serde_json::to_string(&EventType::DraftOrder).unwrap();
        assert_eq!(json, "\"draft_order\"");
        let parsed: EventType = serde_json::from_str("\"checkout_started\"").unwrap();
        assert_eq!(parsed, EventType::CheckoutStarted);
    }

    #[test]
    fn parse_money_handles_missing_and_garbage() {
        assert_eq!(parse_money(Some("129.95")), Decimal::new(12995, 2));
        assert_eq!(parse_money(Some(" 10.00 ")), Decimal::new(1000, 2));
        assert_eq!(parse_money(Some("")), Decimal::ZERO);
        assert_eq!(parse_money(Some("abc")), Decimal::ZERO);
        assert_eq!(parse_money(None), Decimal::ZERO);
    }

    #[test]
    fn display_name_trims_and_joins() {
        assert_eq!(display_name(Some(" Ada "), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(display_name(Some("Ada"), None), "Ada");
        assert_eq!(display_name(None, Some("Lovelace")), "Lovelace");
    }

    #[test]
    fn display_name_defaults_to_anonymous() {
        assert_eq!(display_name(None, None), "Anonymous");
        assert_eq!(display_name(Some("  "), Some("")), "Anonymous");
    }

    #[test]
    fn line_total_is_unit_price_times_quantity() {
        let line = NormalizedLineItem {
            external_line_id: "987".to_string(),
            product_external_id: "55".to_string(),
            title: "Widget".to_string(),
            unit_price: Decimal::new(1000, 2),
            quantity: 3,
        };
        assert_eq!(line.line_total(), Decimal::new(3000, 2));
        // Unit price is untouched by the line total computation.
        assert_eq!(line.unit_price, Decimal::new(1000, 2));
    }

    #[test]
    fn mask_external_id_keeps_last_four() {
        assert_eq!(mask_external_id("6549873210"), "…3210");
        assert_eq!(mask_external_id("42"), "…42");
    }
}
