use crate::cart::CartError;
use crate::client::ApiClient;
use crate::domain::CartData;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

/// Remote side of the cart. Every call answers with the server's view of
/// the whole cart.
#[async_trait]
pub trait CartService: Send + Sync {
    async fn get_cart(&self) -> Result<CartData, CartError>;

    async fn add_to_cart(&self, product_id: i64, quantity: i64) -> Result<CartData, CartError>;

    async fn update_cart_item(&self, cart_id: i64, quantity: i64) -> Result<CartData, CartError>;

    async fn remove_cart_item(&self, cart_id: i64) -> Result<CartData, CartError>;

    async fn clear_cart(&self) -> Result<CartData, CartError>;
}

#[derive(Clone)]
pub struct HttpCartService {
    api: ApiClient,
}

impl HttpCartService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CartService for HttpCartService {
    async fn get_cart(&self) -> Result<CartData, CartError> {
        let body: Value = self.api.send(Method::GET, "cart", &[], None).await?;
        parse_cart(body)
    }

    async fn add_to_cart(&self, product_id: i64, quantity: i64) -> Result<CartData, CartError> {
        let payload = json!({ "productId": product_id, "quantity": quantity });
        let body: Value = self
            .api
            .send(Method::POST, "cart/add", &[], Some(payload))
            .await?;
        parse_cart(body)
    }

    async fn update_cart_item(&self, cart_id: i64, quantity: i64) -> Result<CartData, CartError> {
        let path = format!("cart/update/{}", cart_id);
        let query = [("quantity", quantity.to_string())];
        let body: Value = self.api.send(Method::PUT, &path, &query, None).await?;
        parse_cart(body)
    }

    async fn remove_cart_item(&self, cart_id: i64) -> Result<CartData, CartError> {
        let path = format!("cart/remove/{}", cart_id);
        let body: Value = self.api.send(Method::DELETE, &path, &[], None).await?;
        parse_cart(body)
    }

    async fn clear_cart(&self) -> Result<CartData, CartError> {
        let body: Value = self.api.send(Method::DELETE, "cart/clear", &[], None).await?;
        parse_cart(body)
    }
}

/// Accepts only envelopes whose `result.items` is an array.
pub fn parse_cart(body: Value) -> Result<CartData, CartError> {
    let result = match body.get("result") {
        Some(result) if result.get("items").map_or(false, Value::is_array) => result.clone(),
        Some(_) => {
            return Err(CartError::MalformedResponse(
                "result has no items array".to_string(),
            ))
        }
        None => return Err(CartError::MalformedResponse("response has no result".to_string())),
    };

    serde_json::from_value(result).map_err(|e| CartError::MalformedResponse(e.to_string()))
}
