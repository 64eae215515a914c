//! Order model for hoodie/product orders.

use serde::{Deserialize, Serialize};

/// Garment size. Declaration order is the fixed print order.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    S,
    M,
    L,
    XL,
    XXL,
    XXXL,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::S => "s",
            Size::M => "m",
            Size::L => "l",
            Size::XL => "xl",
            Size::XXL => "xxl",
            Size::XXXL => "xxxl",
        }
    }
}

/// Order workflow status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet paid
    #[default]
    Nieuw,
    /// Paid by the customer
    Betaald,
    /// Ordered at the supplier
    Besteld,
    /// Shipped to the customer
    Verzonden,
    /// Picked up by the customer
    Afgehaald,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Nieuw => "nieuw",
            OrderStatus::Betaald => "betaald",
            OrderStatus::Besteld => "besteld",
            OrderStatus::Verzonden => "verzonden",
            OrderStatus::Afgehaald => "afgehaald",
        }
    }
}

/// A single order line placed through the storefront or by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub color: String,
    pub size: Size,
    pub quantity: u32,
    #[serde(default)]
    pub is_crew: bool,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for placing an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    pub color: String,
    pub size: Size,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub is_crew: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Largest quantity a single order line may carry.
pub const MAX_ORDER_QUANTITY: u32 = 100;

fn default_quantity() -> u32 {
    1
}

/// Request body for updating an order from the back-office.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_crew: Option<bool>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<Size>,
}

/// Query string shared by the order list, print and export endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_order_is_fixed() {
        let mut sizes = vec![Size::XXXL, Size::S, Size::XL, Size::M, Size::XXL, Size::L];
        sizes.sort();
        assert_eq!(
            sizes,
            vec![Size::S, Size::M, Size::L, Size::XL, Size::XXL, Size::XXXL]
        );
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Verzonden).unwrap();
        assert_eq!(json, "\"verzonden\"");
        let status: OrderStatus = serde_json::from_str("\"betaald\"").unwrap();
        assert_eq!(status, OrderStatus::Betaald);
        assert_eq!(OrderStatus::default().as_str(), "nieuw");
    }
}
