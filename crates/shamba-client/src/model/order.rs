use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend identifier of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle status of an order as reported by the backend.
///
/// Unrecognised strings are preserved in [`OrderStatus::Other`] so they can be displayed
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    PaymentFailed,
    AwaitingShipment,
    InTransit,
    Delivered,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::PendingPayment => "Pending Payment",
            OrderStatus::Paid => "Paid",
            OrderStatus::PaymentFailed => "Payment Failed",
            OrderStatus::AwaitingShipment => "Awaiting Shipment",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Other(status) => status,
        }
    }

    /// The status a transporter may move this order to next, if any.
    pub fn next_transport_step(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::AwaitingShipment => Some(OrderStatus::InTransit),
            OrderStatus::InTransit => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// Whether the buyer still needs to pay for this order.
    pub fn awaits_payment(&self) -> bool {
        matches!(self, OrderStatus::PendingPayment | OrderStatus::PaymentFailed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OrderStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "Pending Payment" | "Pending" => OrderStatus::PendingPayment,
            "Paid" => OrderStatus::Paid,
            "Payment Failed" => OrderStatus::PaymentFailed,
            "Awaiting Shipment" => OrderStatus::AwaitingShipment,
            "In Transit" => OrderStatus::InTransit,
            "Delivered" => OrderStatus::Delivered,
            _ => OrderStatus::Other(status),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

/// An order as returned by the order endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transporter_id: Option<String>,
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub product_id: String,
    pub quantity: u32,
}

/// Payload for `PUT /orders/status/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub new_status: OrderStatus,
}

/// Payload for `POST /orders/book-transport/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportBooking {
    pub transporter_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_known_and_unknown() {
        let known: OrderStatus = serde_json::from_str("\"In Transit\"").unwrap();
        assert_eq!(known, OrderStatus::InTransit);

        let unknown: OrderStatus = serde_json::from_str("\"Disputed\"").unwrap();
        assert_eq!(unknown, OrderStatus::Other("Disputed".to_string()));
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"Disputed\"");
    }

    #[test]
    fn test_transport_steps() {
        assert_eq!(
            OrderStatus::AwaitingShipment.next_transport_step(),
            Some(OrderStatus::InTransit)
        );
        assert_eq!(
            OrderStatus::InTransit.next_transport_step(),
            Some(OrderStatus::Delivered)
        );
        assert_eq!(OrderStatus::Delivered.next_transport_step(), None);
        assert_eq!(OrderStatus::Paid.next_transport_step(), None);
        assert_eq!(OrderStatus::PendingPayment.next_transport_step(), None);
    }

    #[test]
    fn test_order_parses_backend_payload() {
        let json = r#"{
            "_id": "o-17",
            "buyerId": "b1",
            "productId": "p9",
            "quantity": 20,
            "totalPrice": 4400,
            "status": "Pending Payment"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, OrderId::from("o-17"));
        assert_eq!(order.total_price, 4400.0);
        assert!(order.status.awaits_payment());
        assert_eq!(order.transporter_id, None);
    }
}
