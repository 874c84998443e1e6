use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod cart;
pub mod order;
pub mod time;

pub use cart::{CartData, CartItem};
pub use order::{CreateOrder, Order, OrderItem, OrderStatusInfo, PaymentMethod};

// ==================================================
// RESPONSE ENVELOPE
// ==================================================

/// Every endpoint answers with `{ code, message?, result }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: i64,
    pub message: Option<String>,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, crate::client::ApiError> {
        self.result
            .ok_or_else(|| crate::client::ApiError::Decode("response has no result".to_string()))
    }
}

// ==================================================
// CATALOG
// ==================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub sale_price: Decimal,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image_url: String,
    pub rating: Option<f64>,
    #[serde(default)]
    pub category_name: String,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Discount off the list price, in whole percent.
    pub fn discount_percent(&self) -> Option<Decimal> {
        if self.price.is_zero() || self.sale_price >= self.price {
            return None;
        }
        Some(((self.price - self.sale_price) / self.price * Decimal::ONE_HUNDRED).round())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub pageable: Pageable,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.pageable.page_number + 1 >= self.total_pages
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

// ==================================================
// ACCOUNT
// ==================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub avatar: String,
    pub role: String,
    pub created_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    pub token: Option<String>,
    #[serde(default)]
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal, sale_price: Decimal) -> Product {
        Product {
            product_id: 1,
            name: "Kettle".to_string(),
            description: String::new(),
            price,
            sale_price,
            stock: 3,
            image_url: String::new(),
            rating: None,
            category_name: "Kitchen".to_string(),
        }
    }

    #[test]
    fn discount_is_rounded_percent() {
        assert_eq!(product(dec!(200), dec!(150)).discount_percent(), Some(dec!(25)));
        assert_eq!(product(dec!(3), dec!(2)).discount_percent(), Some(dec!(33)));
    }

    #[test]
    fn no_discount_without_markdown() {
        assert_eq!(product(dec!(100), dec!(100)).discount_percent(), None);
        assert_eq!(product(dec!(0), dec!(0)).discount_percent(), None);
    }

    #[test]
    fn envelope_without_result_is_a_decode_error() {
        let body: ApiResponse<Product> =
            serde_json::from_str(r#"{"code":1000,"message":"ok"}"#).unwrap();
        assert!(body.into_result().is_err());
    }

    #[test]
    fn product_parses_server_json() {
        let json = r#"{
            "productId": 9, "name": "Mug", "description": "Blue",
            "price": 12.5, "salePrice": 10, "stock": 0,
            "imageUrl": "http://img/9.png", "rating": null, "categoryName": "Kitchen"
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.product_id, 9);
        assert_eq!(p.price, dec!(12.5));
        assert!(!p.in_stock());
    }
}
