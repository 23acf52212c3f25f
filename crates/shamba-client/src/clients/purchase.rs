//! # Purchase Client
//!
//! Buyer checkout: create the order, send the STK push, then hand the order to the
//! payment poller.
use crate::api::{ApiError, MarketApi};
use crate::clients::PaymentClient;
use crate::model::{Order, OrderCreate, StkPushRequest};
use crate::payment_actor::{PaymentError, PollState};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PurchaseError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

#[derive(Clone)]
pub struct PurchaseClient {
    api: Arc<dyn MarketApi>,
    payments: PaymentClient,
}

impl PurchaseClient {
    pub fn new(api: Arc<dyn MarketApi>, payments: PaymentClient) -> Self {
        Self { api, payments }
    }

    #[instrument(skip(self))]
    pub async fn place_order(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<Order, PurchaseError> {
        let order = self
            .api
            .create_order(&OrderCreate {
                product_id: product_id.to_string(),
                quantity,
            })
            .await?;
        info!(order_id = %order.id, total_price = order.total_price, "Order created");
        Ok(order)
    }

    /// Sends an STK push for the order's total and starts polling its payment status.
    #[instrument(skip(self, order, phone_number), fields(order_id = %order.id))]
    pub async fn pay(
        &self,
        order: &Order,
        phone_number: &str,
    ) -> Result<PollState, PurchaseError> {
        let request = StkPushRequest {
            amount: order.total_price,
            phone_number: phone_number.to_string(),
            order_id: order.id.clone(),
        };
        let response = self.api.stk_push(&request).await?;
        info!(
            checkout_request_id = ?response.checkout_request_id,
            amount = order.total_price,
            "STK push sent"
        );
        Ok(self.payments.start(order.id.clone()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, MockMarketApi};
    use crate::model::{OrderId, OrderStatus, StkPushResponse};
    use crate::payment_actor::PaymentPoller;
    use shamba_actor::mock::MockClient;

    fn pending_order() -> Order {
        Order {
            id: OrderId::from("o-17"),
            buyer_id: Some("b1".to_string()),
            product_id: Some("p9".to_string()),
            quantity: 20,
            total_price: 4400.0,
            status: OrderStatus::PendingPayment,
            transporter_id: None,
        }
    }

    #[tokio::test]
    async fn test_pay_pushes_then_starts_polling() {
        let api = MockMarketApi::new();
        api.expect_stk_push().return_ok(StkPushResponse {
            message: Some("STK push sent".to_string()),
            checkout_request_id: Some("ws_CO_1".to_string()),
        });
        let mut poller = MockClient::<PaymentPoller>::new();
        poller.expect_command().return_ok(PollState::Polling);

        let purchase = PurchaseClient::new(
            Arc::new(api.clone()),
            PaymentClient::new(poller.client()),
        );
        let state = purchase.pay(&pending_order(), "254712345678").await.unwrap();

        assert_eq!(state, PollState::Polling);
        assert_eq!(api.call_count(Endpoint::StkPush), 1);
        api.verify();
        poller.verify();
    }

    #[tokio::test]
    async fn test_failed_push_does_not_start_polling() {
        let api = MockMarketApi::new();
        api.expect_stk_push().return_err(ApiError::Server { status: 502 });
        let poller = MockClient::<PaymentPoller>::new();

        let purchase = PurchaseClient::new(Arc::new(api), PaymentClient::new(poller.client()));
        let result = purchase.pay(&pending_order(), "254712345678").await;

        assert_eq!(
            result,
            Err(PurchaseError::Api(ApiError::Server { status: 502 }))
        );
        poller.verify();
    }

    #[tokio::test]
    async fn test_place_order() {
        let api = MockMarketApi::new();
        api.expect_create_order().return_ok(pending_order());
        let poller = MockClient::<PaymentPoller>::new();

        let purchase = PurchaseClient::new(
            Arc::new(api.clone()),
            PaymentClient::new(poller.client()),
        );
        let order = purchase.place_order("p9", 20).await.unwrap();

        assert_eq!(order.id.as_str(), "o-17");
        assert_eq!(api.calls()[0].target.as_deref(), Some("p9"));
    }
}
