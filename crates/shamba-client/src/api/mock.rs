//! # Scripted API
//!
//! [`MockMarketApi`] answers each endpoint from its own FIFO of scripted replies and logs
//! every call. A call with nothing queued fails with [`ApiError::Unexpected`], so a test
//! only has to script the traffic it expects.
//!
//! ```rust
//! use shamba_client::api::{Endpoint, MarketApi, MockMarketApi};
//! use shamba_client::model::{OrderId, PaymentStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let api = MockMarketApi::new();
//! api.expect_payment_status().return_ok(PaymentStatus::Paid);
//!
//! let status = api.payment_status(&OrderId::from("abc123")).await.unwrap();
//! assert_eq!(status, PaymentStatus::Paid);
//! assert_eq!(api.call_count(Endpoint::PaymentStatus), 1);
//! api.verify();
//! # }
//! ```

use crate::api::{ApiError, Endpoint, MarketApi};
use crate::model::{
    LoanTerms, Order, OrderCreate, OrderId, OrderStatus, PaymentStatus, Product, ProductCreate,
    ProductUpdate, SignupRequest, StkPushRequest, StkPushResponse, Transporter, UserProfile,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
enum Reply {
    Ok(Value),
    Err(ApiError),
    After(Duration, Box<Reply>),
    Never,
}

/// One recorded call: the endpoint and its path parameter, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub target: Option<String>,
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<Endpoint, VecDeque<Reply>>,
    calls: Vec<Call>,
}

#[derive(Debug, Clone, Default)]
pub struct MockMarketApi {
    script: Arc<Mutex<Script>>,
}

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockMarketApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts scripting the next reply for `endpoint`.
    pub fn expect(&self, endpoint: Endpoint) -> ReplyBuilder {
        ReplyBuilder {
            endpoint,
            script: self.script.clone(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.script).calls.clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        lock(&self.script)
            .calls
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }

    /// Panics if any scripted reply was never consumed.
    pub fn verify(&self) {
        let script = lock(&self.script);
        let pending: Vec<String> = script
            .replies
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(endpoint, queue)| format!("{} ({} left)", endpoint, queue.len()))
            .collect();
        if !pending.is_empty() {
            panic!("Unconsumed replies: {}", pending.join(", "));
        }
    }

    async fn answer<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        target: Option<&str>,
    ) -> Result<T, ApiError> {
        let reply = {
            let mut script = lock(&self.script);
            script.calls.push(Call {
                endpoint,
                target: target.map(str::to_string),
            });
            script
                .replies
                .get_mut(&endpoint)
                .and_then(VecDeque::pop_front)
        };

        let Some(mut reply) = reply else {
            return Err(ApiError::Unexpected(endpoint.to_string()));
        };
        loop {
            match reply {
                Reply::Ok(value) => {
                    return serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
                }
                Reply::Err(error) => return Err(error),
                Reply::After(delay, next) => {
                    tokio::time::sleep(delay).await;
                    reply = *next;
                }
                Reply::Never => return std::future::pending().await,
            }
        }
    }
}

/// Queues replies for one endpoint.
pub struct ReplyBuilder {
    endpoint: Endpoint,
    script: Arc<Mutex<Script>>,
}

impl ReplyBuilder {
    fn push(&self, reply: Reply) {
        lock(&self.script)
            .replies
            .entry(self.endpoint)
            .or_default()
            .push_back(reply);
    }

    fn encode<T: Serialize>(value: T) -> Value {
        serde_json::to_value(value).expect("scripted reply must serialize")
    }

    pub fn return_ok<T: Serialize>(self, value: T) {
        self.push(Reply::Ok(Self::encode(value)));
    }

    /// Queues the same successful reply `times` times.
    pub fn return_ok_times<T: Serialize>(self, times: usize, value: T) {
        let value = Self::encode(value);
        for _ in 0..times {
            self.push(Reply::Ok(value.clone()));
        }
    }

    pub fn return_err(self, error: ApiError) {
        self.push(Reply::Err(error));
    }

    /// Succeeds only after `delay` has elapsed.
    pub fn return_ok_after<T: Serialize>(self, delay: Duration, value: T) {
        self.push(Reply::After(delay, Box::new(Reply::Ok(Self::encode(value)))));
    }

    /// Fails only after `delay` has elapsed.
    pub fn return_err_after(self, delay: Duration, error: ApiError) {
        self.push(Reply::After(delay, Box::new(Reply::Err(error))));
    }

    /// The call never completes.
    pub fn never_resolve(self) {
        self.push(Reply::Never);
    }
}

macro_rules! expect_endpoints {
    ($($name:ident => $endpoint:ident),* $(,)?) => {
        paste::paste! {
            impl MockMarketApi {
                $(
                    #[doc = concat!("Scripts the next `", stringify!($endpoint), "` reply.")]
                    pub fn [<expect_ $name>](&self) -> ReplyBuilder {
                        self.expect(Endpoint::$endpoint)
                    }
                )*
            }
        }
    };
}

expect_endpoints! {
    get_me => GetMe,
    signup => Signup,
    list_products => ListProducts,
    get_product => GetProduct,
    create_product => CreateProduct,
    update_product => UpdateProduct,
    delete_product => DeleteProduct,
    create_order => CreateOrder,
    my_orders => MyOrders,
    update_order_status => UpdateOrderStatus,
    book_transport => BookTransport,
    transporters => Transporters,
    stk_push => StkPush,
    payment_status => PaymentStatus,
    calculate_loan => CalculateLoan,
}

#[async_trait]
impl MarketApi for MockMarketApi {
    async fn get_me(&self) -> Result<UserProfile, ApiError> {
        self.answer(Endpoint::GetMe, None).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<UserProfile, ApiError> {
        self.answer(Endpoint::Signup, Some(&request.email)).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.answer(Endpoint::ListProducts, None).await
    }

    async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        self.answer(Endpoint::GetProduct, Some(id)).await
    }

    async fn create_product(&self, product: &ProductCreate) -> Result<Product, ApiError> {
        self.answer(Endpoint::CreateProduct, Some(&product.name))
            .await
    }

    async fn update_product(
        &self,
        id: &str,
        _update: &ProductUpdate,
    ) -> Result<Product, ApiError> {
        self.answer(Endpoint::UpdateProduct, Some(id)).await
    }

    async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        self.answer::<Value>(Endpoint::DeleteProduct, Some(id))
            .await
            .map(|_| ())
    }

    async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError> {
        self.answer(Endpoint::CreateOrder, Some(&order.product_id))
            .await
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.answer(Endpoint::MyOrders, None).await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        _status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.answer(Endpoint::UpdateOrderStatus, Some(id.as_str()))
            .await
    }

    async fn book_transport(
        &self,
        id: &OrderId,
        _transporter_id: &str,
    ) -> Result<Order, ApiError> {
        self.answer(Endpoint::BookTransport, Some(id.as_str()))
            .await
    }

    async fn transporters(&self) -> Result<Vec<Transporter>, ApiError> {
        self.answer(Endpoint::Transporters, None).await
    }

    async fn stk_push(&self, request: &StkPushRequest) -> Result<StkPushResponse, ApiError> {
        self.answer(Endpoint::StkPush, Some(request.order_id.as_str()))
            .await
    }

    async fn payment_status(&self, order_id: &OrderId) -> Result<PaymentStatus, ApiError> {
        self.answer(Endpoint::PaymentStatus, Some(order_id.as_str()))
            .await
    }

    async fn calculate_loan(&self) -> Result<LoanTerms, ApiError> {
        self.answer(Endpoint::CalculateLoan, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_are_consumed_in_order() {
        let api = MockMarketApi::new();
        api.expect_payment_status().return_ok(PaymentStatus::Pending);
        api.expect_payment_status()
            .return_err(ApiError::Server { status: 502 });

        let order = OrderId::from("o-1");
        assert_eq!(api.payment_status(&order).await, Ok(PaymentStatus::Pending));
        assert_eq!(
            api.payment_status(&order).await,
            Err(ApiError::Server { status: 502 })
        );
        assert!(matches!(
            api.payment_status(&order).await,
            Err(ApiError::Unexpected(_))
        ));
        assert_eq!(api.call_count(Endpoint::PaymentStatus), 3);
        assert_eq!(
            api.calls()[0],
            Call {
                endpoint: Endpoint::PaymentStatus,
                target: Some("o-1".to_string())
            }
        );
        api.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_reply_waits() {
        let api = MockMarketApi::new();
        api.expect_delete_product()
            .return_ok_after(Duration::from_secs(2), ());

        let start = tokio::time::Instant::now();
        api.delete_product("p1").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_resolving_reply() {
        let api = MockMarketApi::new();
        api.expect_get_me().never_resolve();

        let result = tokio::time::timeout(Duration::from_secs(60), api.get_me()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_loan_terms_reply() {
        let api = MockMarketApi::new();
        let terms = LoanTerms {
            max_loan_amount: 15000.0,
            interest_rate: 2.5,
            explanation: "Steady maize sales".to_string(),
        };
        api.expect_calculate_loan().return_ok(terms.clone());
        let rejection = "Not enough sales history".to_string();
        api.expect_calculate_loan().return_err(ApiError::from_status(
            400,
            "/ai/calculate-loan",
            Some(rejection),
        ));

        assert_eq!(api.calculate_loan().await, Ok(terms));
        assert_eq!(
            api.calculate_loan().await.unwrap_err().to_string(),
            "Not enough sales history"
        );
        api.verify();
    }

    #[test]
    #[should_panic(expected = "Unconsumed replies")]
    fn test_verify_reports_leftovers() {
        let api = MockMarketApi::new();
        api.expect_transporters().return_ok(Vec::<Transporter>::new());
        api.verify();
    }
}
