//! Slim event-payload formatting.
//!
//! The event log stores a bounded, type-specific snapshot instead of the raw
//! external body: raw payloads are large and carry fields (addresses, phone
//! numbers) that have no business in a timeline table.

use serde_json::{Map, Value};

use shoplens_shopify::ShopDraftOrder;

/// Whitelist projection of an external payload down to the fields the
/// timeline renders: id, title/name, email, total, status. Absent fields are
/// omitted rather than stored as nulls.
pub(crate) fn slim_payload(raw: &Value) -> Value {
    let mut slim = Map::new();

    let mut keep = |key: &str, sources: &[&str]| {
        if let Some(value) = sources.iter().find_map(|s| raw.get(s)).filter(|v| !v.is_null()) {
            slim.insert(key.to_string(), value.clone());
        }
    };

    keep("id", &["id"]);
    keep("title", &["title", "name"]);
    keep("email", &["email", "contact_email"]);
    keep("total", &["total_price", "total"]);
    keep("status", &["status", "financial_status"]);

    Value::Object(slim)
}

/// Snapshot for a `draft_order` timeline event: draft id, total, status.
pub(crate) fn draft_order_payload(draft: &ShopDraftOrder) -> Value {
    serde_json::json!({
        "draft_id": draft.id.to_string(),
        "total": draft.total_price,
        "status": draft.status,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn slim_payload_whitelists_fields() {
        let raw = json!({
            "id": 450789469i64,
            "name": "#1001",
            "email": "bob@example.com",
            "total_price": "409.94",
            "financial_status": "paid",
            "shipping_address": { "city": "Ottawa" },
            "note": "leave at door"
        });
        let slim = slim_payload(&raw);
        assert_eq!(
            slim,
            json!({
                "id": 450789469i64,
                "title": "#1001",
                "email": "bob@example.com",
                "total": "409.94",
                "status": "paid"
            })
        );
        assert!(slim.get("shipping_address").is_none());
    }

    #[test]
    fn slim_payload_prefers_title_over_name() {
        let raw = json!({ "id": 1, "title": "Widget", "name": "ignored" });
        let slim = slim_payload(&raw);
        assert_eq!(slim["title"], "Widget");
    }

    #[test]
    fn slim_payload_omits_absent_fields() {
        let slim = slim_payload(&json!({ "id": 7 }));
        assert_eq!(slim, json!({ "id": 7 }));
    }

    #[test]
    fn draft_order_payload_is_the_agreed_snapshot() {
        let draft = ShopDraftOrder {
            id: 994118539,
            total_price: Some("367.00".to_string()),
            status: Some("open".to_string()),
            customer: None,
        };
        assert_eq!(
            draft_order_payload(&draft),
            json!({ "draft_id": "994118539", "total": "367.00", "status": "open" })
        );
    }
}
