//! Orders and order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::LineItem;
use crate::checkout::ShippingInfo;
use crate::types::{OrderId, Price};

/// A placed order as returned by the account API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub total: Price,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_info: Option<ShippingInfo>,
}

impl Order {
    /// Total number of units across the order.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Order submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<LineItem>,
    pub total: Price,
    pub shipping_info: ShippingInfo,
}

/// Sort orders most recent first.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_order_with_underscore_id() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "65f0c2",
            "createdAt": "2024-03-12T09:30:00.000Z",
            "total": 88.0,
            "items": [{
                "productId": 3,
                "name": "Jacket",
                "price": 55.99,
                "quantity": 1
            }],
            "shippingInfo": {
                "phoneNumber": "0412345678",
                "address": "1 Main St",
                "paymentMethod": "Bank Transfer"
            }
        }))
        .unwrap();

        assert_eq!(order.id.as_str(), "65f0c2");
        assert_eq!(order.item_count(), 1);
        assert_eq!(order.items[0].product_id.as_str(), "3");
    }

    #[test]
    fn test_sort_newest_first() {
        let order = |id: &str, at: &str| Order {
            id: OrderId::new(id),
            created_at: at.parse().unwrap(),
            total: Price::ZERO,
            items: Vec::new(),
            shipping_info: None,
        };
        let mut orders = vec![
            order("old", "2024-01-01T00:00:00Z"),
            order("new", "2024-06-01T00:00:00Z"),
            order("mid", "2024-03-01T00:00:00Z"),
        ];
        sort_newest_first(&mut orders);
        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }
}
