use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_NAME: &str = "Loading...";

// ==================================================
// LINE ITEM
// ==================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_id: i64,
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub product_image: String,
    pub price: Decimal,
    pub sale_price: Decimal,
    pub quantity: i64,
    pub sub_total: Decimal,
    pub added_at: NaiveDateTime,
}

impl CartItem {
    /// Stand-in row shown until the server answers with the real line item.
    pub fn placeholder(cart_id: i64, product_id: i64, quantity: i64) -> Self {
        Self {
            cart_id,
            product_id,
            product_name: PLACEHOLDER_NAME.to_string(),
            product_image: String::new(),
            price: Decimal::ZERO,
            sale_price: Decimal::ZERO,
            quantity,
            sub_total: Decimal::ZERO,
            added_at: Utc::now().naive_utc(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.cart_id < 0
    }
}

// ==================================================
// CART
// ==================================================

/// Cart as last seen by this client. Totals come from the server; local
/// edits leave them provisional until the next fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartData {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default)]
    pub total_items: i64,
}

impl CartData {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, cart_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.cart_id == cart_id)
    }

    pub fn item_for_product(&self, product_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Bumps an existing line for `product_id` or appends a placeholder
    /// line, and counts the units into `total_items` either way.
    pub fn add_optimistic(&mut self, product_id: i64, quantity: i64, placeholder_id: i64) {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self
                .items
                .push(CartItem::placeholder(placeholder_id, product_id, quantity)),
        }
        self.total_items = self.total_items.saturating_add(quantity);
    }

    pub fn set_quantity(&mut self, cart_id: i64, quantity: i64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.cart_id == cart_id) {
            item.quantity = quantity;
        }
    }

    pub fn remove_item(&mut self, cart_id: i64) {
        self.items.retain(|i| i.cart_id != cart_id);
    }

    pub fn counted_items(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn counted_price(&self) -> Decimal {
        self.items.iter().map(|i| i.sub_total).sum()
    }

    /// False while optimistic edits are waiting for reconciliation.
    pub fn totals_consistent(&self) -> bool {
        self.total_items == self.counted_items() && self.total_price == self.counted_price()
    }
}
