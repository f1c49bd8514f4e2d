//! Order, line item and order chat models

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order workflow status
///
/// The nominal flow is `pending → accepted → ready_for_pickup → delivered →
/// completed`. Any member of the set is accepted as a target; adjacency is
/// not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    ReadyForPickup,
    Delivered,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::ReadyForPickup,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "accepted" => Some(OrderStatus::Accepted),
            "ready_for_pickup" => Some(OrderStatus::ReadyForPickup),
            "delivered" => Some(OrderStatus::Delivered),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Comma separated list of accepted values, for error messages
    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(OrderStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Only a completed order may be reviewed
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order; `unit_price` is the catalog price when the order was placed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineItem {
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLineItem {
    /// `None` when the product overflows
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// An order placed by a buyer against a business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub business_id: Uuid,
    pub buyer_id: Uuid,
    pub items: Vec<OrderLineItem>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of line totals; `None` when it overflows
    pub fn total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total()?))
    }
}

/// A chat message scoped to one order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderMessage {
    pub id: Uuid,
    pub order_id: Uuid,
    pub sender_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Order with its chat history, oldest message first
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderWithMessages {
    #[serde(flatten)]
    pub order: Order,
    /// `None` only when the stored lines overflow
    pub total: Option<Decimal>,
    pub messages: Vec<OrderMessage>,
}

impl OrderWithMessages {
    pub fn new(order: Order, messages: Vec<OrderMessage>) -> Self {
        Self {
            total: order.total(),
            order,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_strings_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(OrderStatus::from_str("cancelled"), None);
        assert_eq!(OrderStatus::from_str("Pending"), None);
        assert_eq!(OrderStatus::from_str(""), None);
    }

    #[test]
    fn test_only_completed_is_terminal() {
        let terminal: Vec<_> = OrderStatus::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&OrderStatus::Completed]);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::ReadyForPickup).unwrap();
        assert_eq!(json, "\"ready_for_pickup\"");
    }

    #[test]
    fn test_order_total() {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            items: vec![
                OrderLineItem {
                    item_id: Uuid::new_v4(),
                    quantity: 2,
                    unit_price: Decimal::from_str("120.00").unwrap(),
                },
                OrderLineItem {
                    item_id: Uuid::new_v4(),
                    quantity: 1,
                    unit_price: Decimal::from_str("35.50").unwrap(),
                },
            ],
            status: OrderStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(order.total(), Some(Decimal::from_str("275.50").unwrap()));
    }

    #[test]
    fn test_overflowing_total_is_none() {
        let line = OrderLineItem {
            item_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: Decimal::MAX,
        };
        assert_eq!(line.line_total(), None);

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            items: vec![line],
            status: OrderStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(order.total(), None);
        assert_eq!(OrderWithMessages::new(order, Vec::new()).total, None);
    }
}
