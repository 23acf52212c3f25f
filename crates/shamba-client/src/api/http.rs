use crate::api::{ApiError, Endpoint, MarketApi};
use crate::auth::AuthProvider;
use crate::config::ApiConfig;
use crate::model::{
    LoanTerms, Order, OrderCreate, OrderId, OrderStatus, OrderStatusUpdate, PaymentStatus,
    PaymentStatusBody, Product, ProductCreate, ProductUpdate, SignupRequest, StkPushRequest,
    StkPushResponse, TransportBooking, Transporter, UserProfile,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// `reqwest`-backed [`MarketApi`].
///
/// Every authenticated request reads the provider's current session, so a refreshed
/// token is picked up without rebuilding the client.
#[derive(Clone)]
pub struct HttpMarketApi {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpMarketApi {
    pub fn new(config: &ApiConfig, auth: Arc<dyn AuthProvider>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, endpoint: Endpoint, path: &str) -> Result<RequestBuilder, ApiError> {
        let mut request = self
            .http
            .request(endpoint.method(), format!("{}{}", self.base_url, path));

        if endpoint.requires_auth() {
            match self.auth.get_session().await? {
                Some(session) => request = request.bearer_auth(&session.access_token),
                None => warn!(%endpoint, "No session token available, sending unauthenticated"),
            }
        }
        Ok(request)
    }

    async fn dispatch(
        &self,
        endpoint: Endpoint,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        debug!(%endpoint, path, "API request");
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e, &self.base_url))?;

        let status = response.status();
        if status.is_success() {
            debug!(%endpoint, status = status.as_u16(), "API success");
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        let error = ApiError::from_status(status.as_u16(), path, message);
        warn!(%endpoint, status = status.as_u16(), error = %error, "API error");
        Err(error)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        id: Option<&str>,
    ) -> Result<T, ApiError> {
        let path = endpoint.path(id);
        let request = self.request(endpoint, &path).await?;
        decode(self.dispatch(endpoint, &path, request).await?).await
    }

    async fn call_with<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        id: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        let path = endpoint.path(id);
        let request = self.request(endpoint, &path).await?.json(body);
        decode(self.dispatch(endpoint, &path, request).await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    async fn get_me(&self) -> Result<UserProfile, ApiError> {
        self.call(Endpoint::GetMe, None).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<UserProfile, ApiError> {
        self.call_with(Endpoint::Signup, None, request).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.call(Endpoint::ListProducts, None).await
    }

    async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        self.call(Endpoint::GetProduct, Some(id)).await
    }

    async fn create_product(&self, product: &ProductCreate) -> Result<Product, ApiError> {
        self.call_with(Endpoint::CreateProduct, None, product).await
    }

    async fn update_product(
        &self,
        id: &str,
        update: &ProductUpdate,
    ) -> Result<Product, ApiError> {
        self.call_with(Endpoint::UpdateProduct, Some(id), update)
            .await
    }

    async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let endpoint = Endpoint::DeleteProduct;
        let path = endpoint.path(Some(id));
        let request = self.request(endpoint, &path).await?;
        self.dispatch(endpoint, &path, request).await?;
        Ok(())
    }

    async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError> {
        self.call_with(Endpoint::CreateOrder, None, order).await
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.call(Endpoint::MyOrders, None).await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let body = OrderStatusUpdate { new_status: status };
        self.call_with(Endpoint::UpdateOrderStatus, Some(id.as_str()), &body)
            .await
    }

    async fn book_transport(
        &self,
        id: &OrderId,
        transporter_id: &str,
    ) -> Result<Order, ApiError> {
        let body = TransportBooking {
            transporter_id: transporter_id.to_string(),
        };
        self.call_with(Endpoint::BookTransport, Some(id.as_str()), &body)
            .await
    }

    async fn transporters(&self) -> Result<Vec<Transporter>, ApiError> {
        self.call(Endpoint::Transporters, None).await
    }

    async fn stk_push(&self, request: &StkPushRequest) -> Result<StkPushResponse, ApiError> {
        self.call_with(Endpoint::StkPush, None, request).await
    }

    async fn payment_status(&self, order_id: &OrderId) -> Result<PaymentStatus, ApiError> {
        let body: PaymentStatusBody = self
            .call(Endpoint::PaymentStatus, Some(order_id.as_str()))
            .await?;
        Ok(body.status)
    }

    async fn calculate_loan(&self) -> Result<LoanTerms, ApiError> {
        self.call(Endpoint::CalculateLoan, None).await
    }
}
