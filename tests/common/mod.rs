//! In-process fake of the storefront backend.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storefront_client::client::ApiClient;
use storefront_client::storage::Storage;

pub const TOKEN: &str = "tok-123";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct Line {
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Default)]
pub struct Backend {
    pub lines: Vec<Line>,
    pub next_cart_id: i64,
    pub next_order_id: i64,
    pub malformed_cart: bool,
    pub reject_mutations: Option<String>,
    pub orders: Vec<Value>,
    pub profile: Value,
    pub requests: Vec<String>,
}

pub type Shared = Arc<Mutex<Backend>>;

type Reply = (StatusCode, Json<Value>);

pub async fn spawn_backend() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(Backend {
        next_cart_id: 100,
        next_order_id: 500,
        profile: json!({
            "userId": 1,
            "username": "linh",
            "email": "linh@example.com",
            "fullName": "Linh Tran",
            "phone": null,
            "address": null,
            "avatar": "",
            "role": "USER",
            "createdAt": "2024-01-02T03:04:05"
        }),
        ..Default::default()
    }));

    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/users/me", get(me))
        .route("/users/profile", put(update_profile))
        .route("/users/change-password", put(change_password))
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/update/:id", put(update_item))
        .route("/cart/remove/:id", delete(remove_item))
        .route("/cart/clear", delete(clear_cart))
        .route("/products", get(products))
        .route("/products/search", get(search))
        .route("/products/:id", get(product_detail))
        .route("/products/category/:id", get(products_in_category))
        .route("/categories", get(categories))
        .route("/orders", get(list_orders))
        .route("/orders/create", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/cancel", put(cancel_order))
        .route("/orders/:id/status", get(order_status))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

pub fn client(base_url: &str, storage: Storage) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5), storage).unwrap()
}

// ==================================================
// HELPERS
// ==================================================

fn ok(result: Value) -> Reply {
    (StatusCode::OK, Json(json!({ "code": 1000, "result": result })))
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "code": 1006, "message": "Unauthenticated" })),
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", TOKEN);
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

fn product(id: i64) -> Value {
    json!({
        "productId": id,
        "name": format!("Product {}", id),
        "description": "",
        "price": 12,
        "salePrice": 10,
        "stock": 5,
        "imageUrl": "",
        "rating": null,
        "categoryName": "General"
    })
}

fn cart_json(backend: &Backend) -> Value {
    if backend.malformed_cart {
        return json!({ "totalPrice": 0 });
    }

    let items: Vec<Value> = backend
        .lines
        .iter()
        .map(|l| {
            json!({
                "cartId": l.cart_id,
                "productId": l.product_id,
                "productName": format!("Product {}", l.product_id),
                "productImage": "",
                "price": 12,
                "salePrice": 10,
                "quantity": l.quantity,
                "subTotal": 10 * l.quantity,
                "addedAt": "2024-06-01T09:30:00"
            })
        })
        .collect();
    let total_items: i64 = backend.lines.iter().map(|l| l.quantity).sum();

    json!({
        "items": items,
        "totalPrice": 10 * total_items,
        "totalItems": total_items
    })
}

fn record(state: &Shared, request: String) -> std::sync::MutexGuard<'_, Backend> {
    let mut backend = state.lock().unwrap();
    backend.requests.push(request);
    backend
}

fn failure(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "code": 1004, "message": message })))
}

fn rejected(backend: &Backend) -> Option<Reply> {
    backend.reject_mutations.as_ref().map(|message| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": 1004, "message": message })),
        )
    })
}

// ==================================================
// HANDLERS
// ==================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    drop(record(&state, "POST /auth/login".to_string()));
    if body["password"] == PASSWORD {
        ok(json!({ "token": TOKEN, "authenticated": true }))
    } else {
        ok(json!({ "authenticated": false }))
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    drop(record(&state, format!("POST /auth/register {}", body["fullName"])));
    (
        StatusCode::OK,
        Json(json!({ "code": 1000, "message": "Account created", "result": { "username": body["username"] } })),
    )
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let backend = record(&state, "GET /users/me".to_string());
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(backend.profile.clone())
}

async fn update_profile(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut backend = record(&state, format!("PUT /users/profile {}", body));
    if !authorized(&headers) {
        return unauthorized();
    }

    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            backend.profile[key.as_str()] = value.clone();
        }
    }
    ok(backend.profile.clone())
}

async fn change_password(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    drop(record(&state, format!("PUT /users/change-password {}", body)));
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["currentPassword"] != PASSWORD {
        return failure(StatusCode::BAD_REQUEST, "Current password is incorrect");
    }
    (
        StatusCode::OK,
        Json(json!({ "code": 1000, "message": "Password changed", "result": null })),
    )
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let backend = record(&state, "GET /cart".to_string());
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(cart_json(&backend))
}

async fn add_to_cart(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut backend = record(&state, format!("POST /cart/add {}", body));
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Some(reply) = rejected(&backend) {
        return reply;
    }

    let product_id = body["productId"].as_i64().unwrap_or_default();
    let quantity = body["quantity"].as_i64().unwrap_or(1);
    match backend.lines.iter_mut().find(|l| l.product_id == product_id) {
        Some(line) => line.quantity += quantity,
        None => {
            let cart_id = backend.next_cart_id;
            backend.next_cart_id += 1;
            backend.lines.push(Line {
                cart_id,
                product_id,
                quantity,
            });
        }
    }
    ok(cart_json(&backend))
}

async fn update_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let quantity: i64 = query
        .get("quantity")
        .and_then(|q| q.parse().ok())
        .unwrap_or_default();
    let mut backend = record(&state, format!("PUT /cart/update/{}?quantity={}", id, quantity));
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Some(reply) = rejected(&backend) {
        return reply;
    }

    if let Some(line) = backend.lines.iter_mut().find(|l| l.cart_id == id) {
        line.quantity = quantity;
    }
    ok(cart_json(&backend))
}

async fn remove_item(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut backend = record(&state, format!("DELETE /cart/remove/{}", id));
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Some(reply) = rejected(&backend) {
        return reply;
    }

    backend.lines.retain(|l| l.cart_id != id);
    ok(cart_json(&backend))
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut backend = record(&state, "DELETE /cart/clear".to_string());
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Some(reply) = rejected(&backend) {
        return reply;
    }

    backend.lines.clear();
    ok(cart_json(&backend))
}

async fn products(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size: u32 = query.get("size").and_then(|s| s.parse().ok()).unwrap_or(10);
    drop(record(&state, format!("GET /products?page={}&size={}", page, size)));

    let total: u32 = 25;
    let start = page * size;
    let content: Vec<Value> = (start..(start + size).min(total))
        .map(|i| product(i as i64 + 1))
        .collect();

    ok(json!({
        "content": content,
        "totalPages": (total + size - 1) / size,
        "totalElements": total,
        "pageable": { "pageNumber": page, "pageSize": size }
    }))
}

async fn search(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let name = query.get("name").cloned().unwrap_or_default();
    drop(record(&state, format!("GET /products/search?name={}", name)));

    let mut hit = product(7);
    hit["name"] = json!(name);
    ok(json!([hit]))
}

async fn categories(State(state): State<Shared>) -> Reply {
    drop(record(&state, "GET /categories".to_string()));
    ok(json!([
        { "categoryId": 1, "name": "Kitchen", "description": "", "isActive": true },
        { "categoryId": 2, "name": "Garden", "description": "", "isActive": false }
    ]))
}

async fn product_detail(State(state): State<Shared>, Path(id): Path<i64>) -> Reply {
    drop(record(&state, format!("GET /products/{}", id)));
    if !(1..=25).contains(&id) {
        return failure(StatusCode::NOT_FOUND, "Product not found");
    }
    ok(product(id))
}

async fn products_in_category(State(state): State<Shared>, Path(id): Path<i64>) -> Reply {
    drop(record(&state, format!("GET /products/category/{}", id)));
    let content: Vec<Value> = [id * 10, id * 10 + 1]
        .into_iter()
        .map(|product_id| {
            let mut p = product(product_id);
            p["categoryName"] = json!(format!("Category {}", id));
            p
        })
        .collect();
    ok(json!(content))
}

async fn create_order(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut backend = record(&state, format!("POST /orders/create {}", body["paymentMethod"]));
    if !authorized(&headers) {
        return unauthorized();
    }

    let order_id = backend.next_order_id;
    backend.next_order_id += 1;

    let items: Vec<Value> = backend
        .lines
        .iter()
        .map(|l| json!({ "productId": l.product_id, "quantity": l.quantity, "price": 10 }))
        .collect();
    let total: i64 = backend.lines.iter().map(|l| 10 * l.quantity).sum();
    backend.lines.clear();

    let order = json!({
        "orderId": order_id,
        "totalAmount": total,
        "paymentMethod": body["paymentMethod"],
        "shippingAddress": body["shippingAddress"],
        "status": "PENDING",
        "createdAt": "2024-06-01T10:00:00",
        "updatedAt": "2024-06-01T10:00:00",
        "items": items
    });
    backend.orders.push(order.clone());

    (
        StatusCode::OK,
        Json(json!({ "code": 1000, "message": "Order placed", "result": order })),
    )
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let backend = record(&state, "GET /orders".to_string());
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!(backend.orders))
}

async fn get_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let backend = record(&state, format!("GET /orders/{}", id));
    if !authorized(&headers) {
        return unauthorized();
    }
    match backend.orders.iter().find(|o| o["orderId"] == id) {
        Some(order) => ok(order.clone()),
        None => failure(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn cancel_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut backend = record(&state, format!("PUT /orders/{}/cancel", id));
    if !authorized(&headers) {
        return unauthorized();
    }
    let Some(order) = backend.orders.iter_mut().find(|o| o["orderId"] == id) else {
        return failure(StatusCode::NOT_FOUND, "Order not found");
    };
    if order["status"] != "PENDING" && order["status"] != "CONFIRMED" {
        return failure(StatusCode::BAD_REQUEST, "Order can no longer be cancelled");
    }
    order["status"] = json!("CANCELLED");
    order["updatedAt"] = json!("2024-06-01T11:00:00");
    ok(order.clone())
}

async fn order_status(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let backend = record(&state, format!("GET /orders/{}/status", id));
    if !authorized(&headers) {
        return unauthorized();
    }
    match backend.orders.iter().find(|o| o["orderId"] == id) {
        Some(order) => ok(json!({
            "orderId": id,
            "status": order["status"],
            "message": format!("Order is {}", order["status"].as_str().unwrap_or_default())
        })),
        None => failure(StatusCode::NOT_FOUND, "Order not found"),
    }
}
