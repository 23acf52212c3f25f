//! Marketplace REST API.
//!
//! [`MarketApi`] is the seam between the state machines and the network: the machines
//! hold an `Arc<dyn MarketApi>`, [`HttpMarketApi`] talks to the backend, and
//! [`MockMarketApi`] replays scripted replies in tests.

pub mod error;
pub mod http;
pub mod mock;

pub use error::ApiError;
pub use http::HttpMarketApi;
pub use mock::MockMarketApi;

use crate::model::{
    LoanTerms, Order, OrderCreate, OrderId, OrderStatus, PaymentStatus, Product, ProductCreate,
    ProductUpdate, SignupRequest, StkPushRequest, StkPushResponse, Transporter, UserProfile,
};
use async_trait::async_trait;
use reqwest::Method;
use std::fmt;

/// Every backend route the client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetMe,
    Signup,
    ListProducts,
    GetProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    CreateOrder,
    MyOrders,
    UpdateOrderStatus,
    BookTransport,
    Transporters,
    StkPush,
    PaymentStatus,
    CalculateLoan,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::GetMe
            | Endpoint::ListProducts
            | Endpoint::GetProduct
            | Endpoint::MyOrders
            | Endpoint::Transporters
            | Endpoint::PaymentStatus => Method::GET,
            Endpoint::Signup
            | Endpoint::CreateProduct
            | Endpoint::CreateOrder
            | Endpoint::BookTransport
            | Endpoint::StkPush
            | Endpoint::CalculateLoan => Method::POST,
            Endpoint::UpdateProduct | Endpoint::UpdateOrderStatus => Method::PUT,
            Endpoint::DeleteProduct => Method::DELETE,
        }
    }

    /// Route template relative to the API base; `:id` marks the path parameter.
    pub fn template(&self) -> &'static str {
        match self {
            Endpoint::GetMe => "/users/me",
            Endpoint::Signup => "/auth/signup",
            Endpoint::ListProducts | Endpoint::CreateProduct => "/products",
            Endpoint::GetProduct | Endpoint::UpdateProduct | Endpoint::DeleteProduct => {
                "/products/:id"
            }
            Endpoint::CreateOrder => "/orders",
            Endpoint::MyOrders => "/orders/my-orders",
            Endpoint::UpdateOrderStatus => "/orders/status/:id",
            Endpoint::BookTransport => "/orders/book-transport/:id",
            Endpoint::Transporters => "/transporters",
            Endpoint::StkPush => "/payments/stk-push",
            Endpoint::PaymentStatus => "/payments/status/:id",
            Endpoint::CalculateLoan => "/ai/calculate-loan",
        }
    }

    pub fn path(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => self.template().replace(":id", id),
            None => self.template().to_string(),
        }
    }

    /// Signup runs before the user has an application account.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Endpoint::Signup)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.template())
    }
}

#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn get_me(&self) -> Result<UserProfile, ApiError>;
    async fn signup(&self, request: &SignupRequest) -> Result<UserProfile, ApiError>;

    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn get_product(&self, id: &str) -> Result<Product, ApiError>;
    async fn create_product(&self, product: &ProductCreate) -> Result<Product, ApiError>;
    async fn update_product(&self, id: &str, update: &ProductUpdate)
        -> Result<Product, ApiError>;
    async fn delete_product(&self, id: &str) -> Result<(), ApiError>;

    async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError>;
    async fn my_orders(&self) -> Result<Vec<Order>, ApiError>;
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError>;
    async fn book_transport(&self, id: &OrderId, transporter_id: &str)
        -> Result<Order, ApiError>;
    async fn transporters(&self) -> Result<Vec<Transporter>, ApiError>;

    async fn stk_push(&self, request: &StkPushRequest) -> Result<StkPushResponse, ApiError>;
    async fn payment_status(&self, order_id: &OrderId) -> Result<PaymentStatus, ApiError>;

    /// Loan offer for the signed-in user; the request has no body.
    async fn calculate_loan(&self) -> Result<LoanTerms, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Endpoint::GetMe.path(None), "/users/me");
        assert_eq!(Endpoint::PaymentStatus.path(Some("abc123")), "/payments/status/abc123");
        assert_eq!(
            Endpoint::BookTransport.path(Some("o-1")),
            "/orders/book-transport/o-1"
        );
        assert_eq!(Endpoint::DeleteProduct.method(), Method::DELETE);
        assert_eq!(Endpoint::CalculateLoan.to_string(), "POST /ai/calculate-loan");
        assert!(Endpoint::CalculateLoan.requires_auth());
    }

    #[test]
    fn test_display_and_auth() {
        assert_eq!(
            Endpoint::UpdateOrderStatus.to_string(),
            "PUT /orders/status/:id"
        );
        assert!(!Endpoint::Signup.requires_auth());
        assert!(Endpoint::StkPush.requires_auth());
    }
}
