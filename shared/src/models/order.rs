//! Order Model
//!
//! 订单生命周期: `pending → picked_up → delivered`
//!
//! 状态只能单向前进，不可回退。

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::location::{LocationSnapshot, VerificationRequest};

/// Order status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    PickedUp,
    Delivered,
}

impl OrderStatus {
    /// The only status this one may advance to, if any
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::PickedUp),
            OrderStatus::PickedUp => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Whether `self → to` is an allowed transition
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        self.next() == Some(to)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery company a driver can check in for (fixed list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverCompany {
    Doordash,
    UberEats,
    Grubhub,
    Postmates,
    SkipTheDishes,
    Other,
}

impl DriverCompany {
    pub const ALL: [DriverCompany; 6] = [
        DriverCompany::Doordash,
        DriverCompany::UberEats,
        DriverCompany::Grubhub,
        DriverCompany::Postmates,
        DriverCompany::SkipTheDishes,
        DriverCompany::Other,
    ];

    /// Display name shown on the check-in form and in exports
    pub fn display_name(self) -> &'static str {
        match self {
            DriverCompany::Doordash => "DoorDash",
            DriverCompany::UberEats => "Uber Eats",
            DriverCompany::Grubhub => "Grubhub",
            DriverCompany::Postmates => "Postmates",
            DriverCompany::SkipTheDishes => "SkipTheDishes",
            DriverCompany::Other => "Other",
        }
    }

    /// Parse a wire value (`uber_eats`) or a display name (`Uber Eats`)
    pub fn parse(value: &str) -> Option<DriverCompany> {
        let v = value.trim();
        Self::ALL.into_iter().find(|c| {
            c.display_name().eq_ignore_ascii_case(v)
                || serde_json::to_value(c)
                    .ok()
                    .and_then(|j| j.as_str().map(|s| s == v))
                    .unwrap_or(false)
        })
    }
}

/// A preset menu line attached to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub food_item_id: String,
    pub name: String,
    pub quantity: u32,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    /// Free text shown to the driver (rendered from items when presets are used)
    pub order_details: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_company: Option<DriverCompany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_up_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
    /// Verification snapshot taken when the order was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSnapshot>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub updated_at: i64,
}

/// Requested preset line on the order form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    #[validate(length(min = 1))]
    pub food_item_id: String,
    #[validate(range(min = 1, max = 99))]
    pub quantity: u32,
}

/// Create order payload (order form)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[validate(length(min = 1, max = 50))]
    pub order_number: String,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub order_details: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OrderItemInput>,
    /// Device position used for the location gate
    #[serde(default)]
    pub location: Option<VerificationRequest>,
}

/// Driver check-in payload
///
/// `driver_company` is kept as raw text so an unknown company is reported
/// as a check-in error rather than a JSON decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_company: Option<String>,
}

/// Bulk archive / delete payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOrderIds {
    pub ids: Vec<String>,
}

/// Bulk operation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult {
    pub affected: usize,
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub picked_up: usize,
    pub delivered: usize,
    pub archived: usize,
}

/// QR payload for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQr {
    pub order_id: String,
    pub url: String,
}

/// Newly created order together with its QR link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithQr {
    #[serde(flatten)]
    pub order: Order,
    pub qr_url: String,
}

/// List / export filter (`?status=picked_up&includeArchived=true`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub include_archived: bool,
}

impl OrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        (self.include_archived || !order.archived)
            && self.status.is_none_or(|s| s == order.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_only_move_forward() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::PickedUp));
        assert!(OrderStatus::PickedUp.can_transition_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::PickedUp.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::PickedUp));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));

        assert!(OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"picked_up\""
        );
        let s: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(s, OrderStatus::Delivered);
    }

    #[test]
    fn test_driver_company_parse() {
        assert_eq!(DriverCompany::parse("uber_eats"), Some(DriverCompany::UberEats));
        assert_eq!(DriverCompany::parse("Uber Eats"), Some(DriverCompany::UberEats));
        assert_eq!(DriverCompany::parse(" doordash "), Some(DriverCompany::Doordash));
        assert_eq!(
            DriverCompany::parse("skip_the_dishes"),
            Some(DriverCompany::SkipTheDishes)
        );
        assert_eq!(DriverCompany::parse(""), None);
        assert_eq!(DriverCompany::parse("Pony Express"), None);
    }

    #[test]
    fn test_order_deserializes_with_missing_optionals() {
        let json = r#"{
            "id": "o-1",
            "orderNumber": "1001",
            "customerName": "Ana",
            "customerEmail": "ana@example.com",
            "orderDetails": "1x Jerk Chicken",
            "createdAt": 1700000000000
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.items.is_empty());
        assert!(!order.archived);
        assert!(order.driver_company.is_none());
    }
}
