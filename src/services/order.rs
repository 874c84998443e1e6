use crate::cart::CartStore;
use crate::client::{ApiClient, ApiError};
use crate::domain::{ApiResponse, CreateOrder, Order, OrderStatusInfo};
use crate::logging::log_success;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("shipping address is required")]
    MissingAddress,
}

#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &CreateOrder) -> Result<Order, OrderError> {
        if request.shipping_address.trim().is_empty() {
            return Err(OrderError::MissingAddress);
        }

        let response: ApiResponse<Order> = self.api.post("orders/create", request).await?;
        if let Some(message) = &response.message {
            log_success(message);
        }
        Ok(response.into_result()?)
    }

    /// Places the order, then refreshes `cart` since the server empties it.
    pub async fn checkout(&self, cart: &CartStore, request: &CreateOrder) -> Result<Order, OrderError> {
        let order = self.create(request).await?;
        cart.fetch().await;
        Ok(order)
    }

    pub async fn get(&self, order_id: i64) -> Result<Order, ApiError> {
        self.api
            .get::<Order>(&format!("orders/{}", order_id))
            .await?
            .into_result()
    }

    pub async fn cancel(&self, order_id: i64) -> Result<Order, ApiError> {
        self.api
            .put::<_, Order>(&format!("orders/{}/cancel", order_id), &serde_json::json!({}))
            .await?
            .into_result()
    }

    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        self.api.get::<Vec<Order>>("orders").await?.into_result()
    }

    pub async fn status(&self, order_id: i64) -> Result<OrderStatusInfo, ApiError> {
        self.api
            .get::<OrderStatusInfo>(&format!("orders/{}/status", order_id))
            .await?
            .into_result()
    }
}
