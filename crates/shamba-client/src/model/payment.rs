use crate::model::OrderId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status of an order, from `GET /payments/status/:orderId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Payment Failed",
            PaymentStatus::Other(status) => status,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PaymentStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "Pending" | "Pending Payment" => PaymentStatus::Pending,
            "Paid" => PaymentStatus::Paid,
            "Payment Failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Other(status),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

/// Body of the payment status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusBody {
    pub status: PaymentStatus,
}

/// Payload for `POST /payments/stk-push`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StkPushRequest {
    pub amount: f64,
    pub phone_number: String,
    pub order_id: OrderId,
}

/// Acknowledgement of an STK push; the payment itself settles later.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StkPushResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        alias = "CheckoutRequestID",
        skip_serializing_if = "Option::is_none"
    )]
    pub checkout_request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_body() {
        let body: PaymentStatusBody =
            serde_json::from_str(r#"{ "status": "Payment Failed" }"#).unwrap();
        assert_eq!(body.status, PaymentStatus::Failed);

        let body: PaymentStatusBody = serde_json::from_str(r#"{ "status": "Queued" }"#).unwrap();
        assert_eq!(body.status, PaymentStatus::Other("Queued".to_string()));
    }

    #[test]
    fn test_stk_push_request_wire_names() {
        let request = StkPushRequest {
            amount: 4400.0,
            phone_number: "254712345678".to_string(),
            order_id: OrderId::from("o-17"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["phoneNumber"], "254712345678");
        assert_eq!(json["orderId"], "o-17");
    }

    #[test]
    fn test_stk_push_response_accepts_gateway_field_name() {
        let response: StkPushResponse =
            serde_json::from_str(r#"{ "CheckoutRequestID": "ws_CO_1" }"#).unwrap();
        assert_eq!(response.checkout_request_id.as_deref(), Some("ws_CO_1"));
    }
}
