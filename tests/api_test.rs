//! End-to-end tests for the HTTP surface.
//!
//! Each test boots the full router against a fresh in-memory store, with
//! sheet sync disabled, no event broker and payment settlement shortened to
//! 50ms so the paid/cleared assertions run quickly.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use global_marketplace::api::{self, SESSION_HEADER};
use global_marketplace::auth::AuthService;
use global_marketplace::config::{AppConfig, PaymentEnvironment, TableNames, ToyibPayConfig};
use global_marketplace::freight::{FreightService, RateTable, SimulatedCarrier};
use global_marketplace::shopee::{ImportService, ShopeeClient, ShopeeConfig};
use global_marketplace::store::MemoryStore;
use global_marketplace::sync::{spawn, SheetClient};
use global_marketplace::AppState;

const ADMIN_EMAIL: &str = "admin@example.com";
const SETTLE_DELAY_MS: u64 = 50;

fn test_config() -> AppConfig {
    AppConfig {
        app_name: "Global Marketplace".into(),
        version: "0.1.0".into(),
        port: 0,
        gas_url: None,
        spreadsheet_name: "GlobalMarketplace_Data".into(),
        tables: TableNames::default(),
        rate_table: RateTable::builtin(),
        payment: ToyibPayConfig {
            merchant_id: "M-TEST".into(),
            api_key: "test-key".into(),
            environment: PaymentEnvironment::Sandbox,
            settle_delay_ms: SETTLE_DELAY_MS,
        },
        // nothing listens here; shopee endpoints under test never leave 4xx
        shopee: ShopeeConfig::for_base_url("http://127.0.0.1:9"),
        nats_url: None,
        admin_email: Some(ADMIN_EMAIL.into()),
    }
}

async fn make_server() -> (TestServer, AppState) {
    let config = Arc::new(test_config());
    let store = Arc::new(MemoryStore::new());
    store.seed_defaults().await;
    let sync = spawn(SheetClient::disabled(&config.app_name, &config.version));
    let freight = Arc::new(FreightService::new(
        Arc::new(config.rate_table.clone()),
        Arc::new(SimulatedCarrier),
        sync.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        store.clone(),
        sync.clone(),
        config.tables.clone(),
        config.admin_email.clone(),
    ));
    let shopee = Arc::new(ShopeeClient::new(config.shopee.clone(), store.clone()));
    let imports = Arc::new(ImportService::new(
        shopee.clone(),
        store.clone(),
        sync.clone(),
        config.tables.clone(),
    ));
    let state = AppState { config, store, auth, freight, shopee, imports, sync, nats: None };
    let server = TestServer::new(api::router(state.clone())).expect("test server");
    (server, state)
}

fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(SESSION_HEADER),
        HeaderValue::from_str(token).expect("header value"),
    )
}

async fn register(server: &TestServer, name: &str, email: &str) -> Value {
    let res = server
        .post("/api/v1/auth/register")
        .json(&json!({ "name": name, "email": email, "password": "secret1" }))
        .await;
    res.assert_status(StatusCode::CREATED);
    res.json::<Value>()
}

fn dec(v: &Value) -> Decimal {
    v.as_str().expect("decimal string").parse().expect("decimal")
}

#[tokio::test]
async fn test_health() {
    let (server, _state) = make_server().await;
    let res = server.get("/health").await;
    res.assert_status_ok();
    assert_eq!(
        res.json::<Value>(),
        json!({ "status": "healthy", "service": "global-marketplace" })
    );
}

// --- catalog ---

#[tokio::test]
async fn test_products_are_seeded_newest_first() {
    let (server, _state) = make_server().await;
    let res = server.get("/api/v1/products").await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    assert_eq!(body["total"], 4);
    assert_eq!(body["page"], 1);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 4);
    assert_eq!(data[0]["name"], "Yoga Mat");
    assert_eq!(data[0]["name_ms"], "Tilam Yoga");
    assert_eq!(dec(&data[0]["price"]["amount"]), Decimal::new(129, 0));
    assert_eq!(data[0]["source"]["type"], "local");
    assert_eq!(data[3]["name"], "Smartphone X");
}

#[tokio::test]
async fn test_product_pagination() {
    let (server, _state) = make_server().await;
    let res = server
        .get("/api/v1/products")
        .add_query_param("page", "2")
        .add_query_param("per_page", "2")
        .await;
    let body = res.json::<Value>();
    assert_eq!(body["total"], 4);
    assert_eq!(body["page"], 2);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Designer Watch");
    assert_eq!(data[1]["name"], "Smartphone X");
}

#[tokio::test]
async fn test_product_search_and_category_filter() {
    let (server, _state) = make_server().await;

    let res = server.get("/api/v1/products").add_query_param("search", "coffee").await;
    let body = res.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Coffee Maker");

    // malay names are searchable too
    let res = server.get("/api/v1/products").add_query_param("search", "telefon").await;
    let body = res.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Smartphone X");

    let res = server.get("/api/v1/products").add_query_param("category", "electronics").await;
    let body = res.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Smartphone X");

    let res = server.get("/api/v1/products").add_query_param("search", "quadcopter").await;
    assert_eq!(res.json::<Value>()["total"], 0);
}

#[tokio::test]
async fn test_product_localization_with_english_fallback() {
    let (server, _state) = make_server().await;

    let res = server.get("/api/v1/products/1").add_query_param("lang", "ms").await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    assert_eq!(body["display_name"], "Telefon Pintar X");
    assert_eq!(body["name"], "Smartphone X");

    let res = server.get("/api/v1/products/1").add_query_param("lang", "zh").await;
    assert_eq!(res.json::<Value>()["display_name"], "智能手机X");

    // unknown tags fall back to english
    let res = server.get("/api/v1/products/1").add_query_param("lang", "fr").await;
    assert_eq!(res.json::<Value>()["display_name"], "Smartphone X");

    let res = server.get("/api/v1/products/999").await;
    res.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>()["error"], "Product not found");
}

#[tokio::test]
async fn test_categories_are_localized() {
    let (server, _state) = make_server().await;
    let res = server.get("/api/v1/categories").add_query_param("lang", "zh").await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    let data = body.as_array().unwrap();
    assert_eq!(data.len(), 6);
    assert_eq!(data[0]["name"], "Electronics");
    assert_eq!(data[0]["display_name"], "电子产品");
    assert_eq!(data[0]["icon"], "fa-mobile-alt");
    assert_eq!(data[5]["display_name"], "玩具");
}

// --- cart ---

#[tokio::test]
async fn test_cart_add_update_remove() {
    let (server, _state) = make_server().await;

    let res = server.post("/api/v1/cart/s1/items").json(&json!({ "product_id": "4" })).await;
    res.assert_status(StatusCode::CREATED);
    let cart = res.json::<Value>();
    assert_eq!(cart["session_id"], "s1");
    assert_eq!(cart["items"][0]["quantity"], 1);

    // same product merges into one line
    let res = server
        .post("/api/v1/cart/s1/items")
        .json(&json!({ "product_id": "4", "quantity": 2 }))
        .await;
    let cart = res.json::<Value>();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 3);

    // update sets the absolute quantity
    let res = server.put("/api/v1/cart/s1/items/4").json(&json!({ "quantity": 1 })).await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["items"][0]["quantity"], 1);

    let res = server.put("/api/v1/cart/s1/items/999").json(&json!({ "quantity": 2 })).await;
    res.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>()["error"], "Item not found in cart");

    let res = server.delete("/api/v1/cart/s1/items/4").await;
    res.assert_status_ok();
    assert!(res.json::<Value>()["items"].as_array().unwrap().is_empty());

    let res = server.post("/api/v1/cart/s1/items").json(&json!({ "product_id": "999" })).await;
    res.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>()["error"], "Product not found");
}

#[tokio::test]
async fn test_cart_summary_math() {
    let (server, _state) = make_server().await;
    let res = server.post("/api/v1/cart/s1/items").json(&json!({ "product_id": "4" })).await;
    res.assert_status(StatusCode::CREATED);

    // 129 clears the free-shipping bar; tax is 6%
    let res = server.get("/api/v1/cart/s1/summary").await;
    res.assert_status_ok();
    let s = res.json::<Value>();
    assert_eq!(dec(&s["subtotal"]["amount"]), Decimal::new(129, 0));
    assert_eq!(dec(&s["shipping"]["amount"]), Decimal::ZERO);
    assert_eq!(dec(&s["tax"]["amount"]), Decimal::new(774, 2));
    assert_eq!(dec(&s["total"]["amount"]), Decimal::new(13674, 2));
    assert_eq!(s["subtotal"]["currency"], "MYR");
}

#[tokio::test]
async fn test_cart_rejects_out_of_stock_product() {
    let (server, state) = make_server().await;
    let mut mat = state.store.find_product("4").await.unwrap();
    mat.stock = 0;
    state.store.upsert_product(mat).await;

    let res = server.post("/api/v1/cart/s1/items").json(&json!({ "product_id": "4" })).await;
    res.assert_status(StatusCode::CONFLICT);
    assert_eq!(res.json::<Value>()["error"], "Out of stock");
}

// --- checkout ---

#[tokio::test]
async fn test_checkout_requires_login() {
    let (server, _state) = make_server().await;
    let res = server.post("/api/v1/checkout").json(&json!({ "session_id": "s1" })).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["error"], "Please login to continue");
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let (server, _state) = make_server().await;
    let session = register(&server, "Nadia", "nadia@example.com").await;
    let (name, value) = auth_header(session["token"].as_str().unwrap());

    let res = server
        .post("/api/v1/checkout")
        .add_header(name, value)
        .json(&json!({ "session_id": "empty-cart" }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Your cart is empty");
}

#[tokio::test]
async fn test_checkout_books_order_and_settles_payment() {
    let (server, _state) = make_server().await;
    let session = register(&server, "Nadia", "nadia@example.com").await;
    let token = session["token"].as_str().unwrap().to_string();

    let res = server.post("/api/v1/cart/co-1/items").json(&json!({ "product_id": "2" })).await;
    res.assert_status(StatusCode::CREATED);

    let (name, value) = auth_header(&token);
    let res = server
        .post("/api/v1/checkout")
        .add_header(name, value)
        .json(&json!({ "session_id": "co-1" }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let body = res.json::<Value>();

    let order = &body["order"];
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "pending");
    assert_eq!(order["email"], "nadia@example.com");
    // 599 + free shipping + 6% tax
    assert_eq!(dec(&order["subtotal"]["amount"]), Decimal::new(599, 0));
    assert_eq!(dec(&order["shipping"]["amount"]), Decimal::ZERO);
    assert_eq!(dec(&order["tax"]["amount"]), Decimal::new(3594, 2));
    assert_eq!(dec(&order["total"]["amount"]), Decimal::new(63494, 2));

    let payment = &body["payment"];
    assert_eq!(payment["gateway"], "toyibpay");
    assert_eq!(payment["merchantId"], "M-TEST");
    assert_eq!(payment["environment"], "sandbox");
    assert_eq!(payment["currency"], "MYR");
    assert_eq!(payment["description"], "Global Marketplace Order");
    assert_eq!(payment["customerEmail"], "nadia@example.com");
    assert_eq!(payment["customerName"], "Nadia");
    assert_eq!(payment["orderId"], order["order_number"]);
    assert_eq!(payment["amount"], order["total"]);
    assert_eq!(payment["status"], "processing");

    // settlement flips the order to paid and empties the cart
    let order_id = order["id"].as_str().unwrap();
    let mut settled = Value::Null;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(SETTLE_DELAY_MS)).await;
        let (name, value) = auth_header(&token);
        let res = server.get(&format!("/api/v1/orders/{order_id}")).add_header(name, value).await;
        res.assert_status_ok();
        settled = res.json::<Value>();
        if settled["payment_status"] == "paid" {
            break;
        }
    }
    assert_eq!(settled["payment_status"], "paid");
    assert_eq!(settled["status"], "paid");

    let res = server.get("/api/v1/cart/co-1").await;
    assert!(res.json::<Value>()["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_orders_are_visible_to_owner_and_admin_only() {
    let (server, _state) = make_server().await;

    let alice = register(&server, "Alice", "alice@example.com").await;
    let alice_token = alice["token"].as_str().unwrap().to_string();
    let res = server.post("/api/v1/cart/a-1/items").json(&json!({ "product_id": "1" })).await;
    res.assert_status(StatusCode::CREATED);
    let (name, value) = auth_header(&alice_token);
    let res = server
        .post("/api/v1/checkout")
        .add_header(name, value)
        .json(&json!({ "session_id": "a-1" }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let order_id = res.json::<Value>()["order"]["id"].as_str().unwrap().to_string();

    let (name, value) = auth_header(&alice_token);
    let res = server.get("/api/v1/orders").add_header(name, value).await;
    assert_eq!(res.json::<Value>().as_array().unwrap().len(), 1);

    let bob = register(&server, "Bob", "bob@example.com").await;
    let (name, value) = auth_header(bob["token"].as_str().unwrap());
    let res = server.get(&format!("/api/v1/orders/{order_id}")).add_header(name, value).await;
    res.assert_status(StatusCode::NOT_FOUND);

    let admin = register(&server, "Admin", ADMIN_EMAIL).await;
    let (name, value) = auth_header(admin["token"].as_str().unwrap());
    let res = server.get(&format!("/api/v1/orders/{order_id}")).add_header(name, value).await;
    res.assert_status_ok();
}

// --- accounts ---

#[tokio::test]
async fn test_register_login_logout_flow() {
    let (server, _state) = make_server().await;

    let res = server
        .post("/api/v1/auth/register")
        .json(&json!({ "name": "Mei", "email": "mei@example.com", "password": "12345" }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let error = res.json::<Value>()["error"].as_str().unwrap().to_lowercase();
    assert!(error.contains("password"), "got {error:?}");

    let session = register(&server, "Mei", "mei@example.com").await;
    assert_eq!(session["email"], "mei@example.com");
    assert_eq!(session["role"], "member");

    let res = server
        .post("/api/v1/auth/register")
        .json(&json!({ "name": "Mei", "email": "mei@example.com", "password": "secret1" }))
        .await;
    res.assert_status(StatusCode::CONFLICT);
    assert_eq!(res.json::<Value>()["error"], "Email already registered");

    let res = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "mei@example.com", "password": "wrong99" }))
        .await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["error"], "Invalid email or password");

    let res = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "mei@example.com", "password": "secret1" }))
        .await;
    res.assert_status_ok();
    let token = res.json::<Value>()["token"].as_str().unwrap().to_string();

    let (name, value) = auth_header(&token);
    let res = server.get("/api/v1/auth/me").add_header(name, value).await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["email"], "mei@example.com");

    let (name, value) = auth_header(&token);
    let res = server.post("/api/v1/auth/logout").add_header(name, value).await;
    res.assert_status(StatusCode::NO_CONTENT);

    let (name, value) = auth_header(&token);
    let res = server.get("/api/v1/auth/me").add_header(name, value).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}

// --- freight ---

#[tokio::test]
async fn test_freight_rates_endpoint() {
    let (server, _state) = make_server().await;
    let res = server.get("/api/v1/freight/rates").await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    assert_eq!(dec(&body["local"]["baseRate"]), Decimal::new(10, 0));
    assert_eq!(dec(&body["local"]["perKg"]), Decimal::new(2, 0));
    let zones = body["international"]["zones"].as_array().unwrap();
    assert_eq!(zones.len(), 4);
    assert_eq!(zones[0]["zoneId"], "asia");
    assert_eq!(zones[0]["name"], "Asia");
    assert_eq!(zones[3]["name"], "Other Regions");
}

#[tokio::test]
async fn test_freight_quote_local() {
    let (server, _state) = make_server().await;
    let res = server
        .post("/api/v1/freight/quote")
        .json(&json!({ "type": "local", "weight_kg": 10.0 }))
        .await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    assert_eq!(dec(&body["cost"]["amount"]), Decimal::new(30, 0));
    assert_eq!(body["cost"]["currency"], "MYR");
    assert_eq!(body["chargeable_weight_kg"], 10.0);
    assert!(body["volumetric_weight_kg"].is_null());
    assert_eq!(body["delivery"]["min_days"], 1);
    assert_eq!(body["delivery"]["max_days"], 3);
    assert_eq!(body["free_shipping_eligible"], false);
}

#[tokio::test]
async fn test_freight_quote_international_uses_volumetric_weight() {
    let (server, _state) = make_server().await;
    let res = server
        .post("/api/v1/freight/quote")
        .json(&json!({
            "type": "international",
            "zone_id": "asia",
            "weight_kg": 2.0,
            "dimensions_cm": { "length_cm": 50.0, "width_cm": 40.0, "height_cm": 30.0 },
        }))
        .await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    // 50x40x30 / 5000 = 12kg beats the 2kg actual weight
    assert_eq!(body["volumetric_weight_kg"], 12.0);
    assert_eq!(body["chargeable_weight_kg"], 12.0);
    assert_eq!(dec(&body["cost"]["amount"]), Decimal::new(204, 0));
    assert_eq!(body["delivery"]["min_days"], 3);
    assert_eq!(body["delivery"]["max_days"], 7);
    assert!(body["breakdown"].as_str().unwrap().contains("Customs duties"));
}

#[tokio::test]
async fn test_freight_quote_errors() {
    let (server, _state) = make_server().await;

    let res = server
        .post("/api/v1/freight/quote")
        .json(&json!({ "type": "international", "zone_id": "mars", "weight_kg": 5.0 }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json::<Value>()["error"], "unknown destination zone: mars");

    let res = server
        .post("/api/v1/freight/quote")
        .json(&json!({ "type": "local", "weight_kg": -1.0 }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>()["error"].as_str().unwrap().starts_with("invalid input"));
}

#[tokio::test]
async fn test_track_shipment() {
    let (server, _state) = make_server().await;
    let res = server.get("/api/v1/freight/track/ABC123").await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    assert_eq!(body["tracking_number"], "ABC123");
    let labels = [
        "Order placed",
        "Processing",
        "Picked up by courier",
        "In transit",
        "Out for delivery",
        "Delivered",
    ];
    let status = body["status"].as_str().unwrap();
    assert!(labels.contains(&status), "unexpected milestone {status:?}");
    assert!(body["last_updated"].as_str().is_some());
    assert!(body["estimated_delivery"].as_str().is_some());
    let history = body["history"].as_array().unwrap();
    assert!(!history.is_empty());
    assert_eq!(history[0]["milestone"], "Order placed");
    assert_eq!(history.last().unwrap()["milestone"], status);

    // a blank (whitespace) tracking number is rejected
    let res = server.get("/api/v1/freight/track/%20").await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_freight_order_booking() {
    let (server, _state) = make_server().await;

    let res = server
        .post("/api/v1/freight/orders")
        .json(&json!({ "type": "international", "zone_id": "europe", "weight_kg": 4.0 }))
        .await;
    res.assert_status(StatusCode::UNAUTHORIZED);

    let session = register(&server, "Farid", "farid@example.com").await;
    let token = session["token"].as_str().unwrap().to_string();
    let (name, value) = auth_header(&token);
    let res = server
        .post("/api/v1/freight/orders")
        .add_header(name, value)
        .json(&json!({ "type": "international", "zone_id": "europe", "weight_kg": 4.0 }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let body = res.json::<Value>();
    assert!(body["id"].as_str().unwrap().starts_with("FRT-"));
    // europe: 75 + 4 x 15
    assert_eq!(dec(&body["cost"]["amount"]), Decimal::new(135, 0));
    assert_eq!(body["status"], "pending");
    assert_eq!(body["zone_id"], "europe");
    assert_eq!(body["user_email"], "farid@example.com");

    let (name, value) = auth_header(&token);
    let res = server.get("/api/v1/freight/orders").add_header(name, value).await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>().as_array().unwrap().len(), 1);
}

// --- admin ---

#[tokio::test]
async fn test_admin_stats_is_gated() {
    let (server, _state) = make_server().await;

    let res = server.get("/api/v1/admin/stats").await;
    res.assert_status(StatusCode::UNAUTHORIZED);

    let member = register(&server, "Mei", "mei@example.com").await;
    let (name, value) = auth_header(member["token"].as_str().unwrap());
    let res = server.get("/api/v1/admin/stats").add_header(name, value).await;
    res.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>()["error"], "Access denied. Admin only.");

    let admin = register(&server, "Admin", ADMIN_EMAIL).await;
    assert_eq!(admin["role"], "admin");
    let (name, value) = auth_header(admin["token"].as_str().unwrap());
    let res = server.get("/api/v1/admin/stats").add_header(name, value).await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    assert_eq!(body["total_products"], 4);
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["total_orders"], 0);
    assert_eq!(dec(&body["revenue"]), Decimal::ZERO);
    assert!(body["recent_orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_revenue_counts_settled_orders() {
    let (server, _state) = make_server().await;

    let member = register(&server, "Nadia", "nadia@example.com").await;
    let res = server.post("/api/v1/cart/co-1/items").json(&json!({ "product_id": "2" })).await;
    res.assert_status(StatusCode::CREATED);
    let (name, value) = auth_header(member["token"].as_str().unwrap());
    let res = server
        .post("/api/v1/checkout")
        .add_header(name, value)
        .json(&json!({ "session_id": "co-1" }))
        .await;
    res.assert_status(StatusCode::CREATED);

    let admin = register(&server, "Admin", ADMIN_EMAIL).await;
    let admin_token = admin["token"].as_str().unwrap().to_string();
    let mut body = Value::Null;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(SETTLE_DELAY_MS)).await;
        let (name, value) = auth_header(&admin_token);
        let res = server.get("/api/v1/admin/stats").add_header(name, value).await;
        body = res.json::<Value>();
        if body["recent_orders"][0]["payment_status"] == "paid" {
            break;
        }
    }
    assert_eq!(body["total_orders"], 1);
    assert_eq!(dec(&body["revenue"]), Decimal::new(63494, 2));
    assert_eq!(body["recent_orders"][0]["payment_status"], "paid");
}

// --- shopee surface ---

#[tokio::test]
async fn test_shopee_endpoints_are_admin_gated() {
    let (server, _state) = make_server().await;

    let member = register(&server, "Mei", "mei@example.com").await;
    let (name, value) = auth_header(member["token"].as_str().unwrap());
    let res = server.get("/api/v1/shopee/status").add_header(name, value).await;
    res.assert_status(StatusCode::FORBIDDEN);

    let admin = register(&server, "Admin", ADMIN_EMAIL).await;
    let admin_token = admin["token"].as_str().unwrap().to_string();

    let (name, value) = auth_header(&admin_token);
    let res = server.get("/api/v1/shopee/status").add_header(name, value).await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    assert_eq!(body["connected"], false);
    assert_eq!(body["sandbox"], true);
    assert!(body["shop_id"].is_null());

    let (name, value) = auth_header(&admin_token);
    let res = server.get("/api/v1/shopee/connect").add_header(name, value).await;
    res.assert_status_ok();
    let url = res.json::<Value>()["url"].as_str().unwrap().to_string();
    assert!(url.contains("auth_partner"));
    assert!(url.contains("id=123456"));

    // without a connected shop, sync refuses up front
    let (name, value) = auth_header(&admin_token);
    let res = server.post("/api/v1/shopee/sync").add_header(name, value).await;
    res.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        res.json::<Value>()["error"],
        "Not authorized. Please connect your Shopee account first."
    );
}
