//! In-memory persistence behind `tokio::sync::RwLock` maps.
//!
//! The demo runs entirely from process memory and reseeds the starter
//! catalog on boot. Every accessor clones out of the lock so handlers never
//! hold a guard across an await.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{Session, User};
use crate::domain::{Cart, Category, Money, Order, Product, ProductSource};
use crate::freight::FreightOrder;
use crate::shopee::{ShopeeTokens, SyncLogEntry};

#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<HashMap<String, Product>>,
    categories: RwLock<Vec<Category>>,
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<String, Session>>,
    carts: RwLock<HashMap<String, Cart>>,
    orders: RwLock<HashMap<String, Order>>,
    freight_orders: RwLock<HashMap<String, FreightOrder>>,
    shopee_tokens: RwLock<Option<ShopeeTokens>>,
    pending_imports: RwLock<HashMap<Uuid, Vec<Product>>>,
    shopee_sync_logs: RwLock<Vec<SyncLogEntry>>,
    shopee_last_sync: RwLock<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the starter catalog: six categories and four products, the same
    /// set every fresh storefront ships with.
    pub async fn seed_defaults(&self) {
        let categories = vec![
            category(1, "Electronics", "Elektronik", "电子产品", "fa-mobile-alt"),
            category(2, "Fashion", "Fesyen", "时尚", "fa-tshirt"),
            category(3, "Home & Living", "Rumah & Kehidupan", "家居生活", "fa-home"),
            category(4, "Sports", "Sukan", "体育", "fa-futbol"),
            category(5, "Books", "Buku", "图书", "fa-book"),
            category(6, "Toys", "Mainan", "玩具", "fa-gamepad"),
        ];
        *self.categories.write().await = categories;

        let seeds = [
            ("1", "Smartphone X", "Telefon Pintar X", "智能手机X", 2999, "Electronics", 50),
            ("2", "Designer Watch", "Jam Tangan Designer", "设计师手表", 599, "Fashion", 30),
            ("3", "Coffee Maker", "Pembuat Kopi", "咖啡机", 899, "Home & Living", 25),
            ("4", "Yoga Mat", "Tilam Yoga", "瑜伽垫", 129, "Sports", 100),
        ];
        let base = Utc::now();
        let mut products = self.products.write().await;
        for (i, (id, name, name_ms, name_zh, price, cat, stock)) in seeds.into_iter().enumerate() {
            let at = base - Duration::seconds((seeds.len() - i) as i64);
            products.insert(
                id.to_string(),
                Product {
                    id: id.to_string(),
                    name: name.to_string(),
                    name_ms: Some(name_ms.to_string()),
                    name_zh: Some(name_zh.to_string()),
                    description: None,
                    price: Money::myr(Decimal::new(price, 0)),
                    original_price: None,
                    category: cat.to_string(),
                    image: "https://via.placeholder.com/300x200".to_string(),
                    stock,
                    source: ProductSource::Local,
                    created_at: at,
                    updated_at: at,
                },
            );
        }
        tracing::info!(products = products.len(), "seeded default catalog");
    }

    // --- catalog ---

    pub async fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products
    }

    pub async fn find_product(&self, id: &str) -> Option<Product> {
        self.products.read().await.get(id).cloned()
    }

    pub async fn upsert_product(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    pub async fn count_products(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn list_categories(&self) -> Vec<Category> {
        self.categories.read().await.clone()
    }

    // --- users and sessions ---

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let wanted = email.to_lowercase();
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email.to_lowercase() == wanted)
            .cloned()
    }

    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn count_users(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn insert_session(&self, session: Session) {
        self.sessions.write().await.insert(session.token.clone(), session);
    }

    pub async fn find_session(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn remove_session(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    // --- carts ---

    pub async fn cart(&self, session_id: &str) -> Cart {
        self.carts
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_else(|| Cart::new(session_id))
    }

    pub async fn save_cart(&self, cart: Cart) {
        self.carts.write().await.insert(cart.session_id.clone(), cart);
    }

    pub async fn clear_cart(&self, session_id: &str) {
        self.carts.write().await.remove(session_id);
    }

    // --- orders ---

    pub async fn save_order(&self, order: Order) {
        self.orders.write().await.insert(order.id.clone(), order);
    }

    pub async fn find_order(&self, id: &str) -> Option<Order> {
        self.orders.read().await.get(id).cloned()
    }

    pub async fn list_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    pub async fn orders_for_user(&self, user_id: &str) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    // --- freight orders ---

    pub async fn save_freight_order(&self, order: FreightOrder) {
        self.freight_orders.write().await.insert(order.id.clone(), order);
    }

    pub async fn freight_orders_for_user(&self, user_id: &str) -> Vec<FreightOrder> {
        let mut orders: Vec<FreightOrder> = self
            .freight_orders
            .read()
            .await
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    // --- shopee connection ---

    pub async fn shopee_tokens(&self) -> Option<ShopeeTokens> {
        self.shopee_tokens.read().await.clone()
    }

    pub async fn save_shopee_tokens(&self, tokens: ShopeeTokens) {
        *self.shopee_tokens.write().await = Some(tokens);
    }

    pub async fn clear_shopee_tokens(&self) {
        *self.shopee_tokens.write().await = None;
    }

    pub async fn put_pending_import(&self, id: Uuid, drafts: Vec<Product>) {
        self.pending_imports.write().await.insert(id, drafts);
    }

    pub async fn take_pending_import(&self, id: Uuid) -> Option<Vec<Product>> {
        self.pending_imports.write().await.remove(&id)
    }

    /// Sync history, newest first.
    pub async fn shopee_sync_logs(&self) -> Vec<SyncLogEntry> {
        let mut logs = self.shopee_sync_logs.read().await.clone();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }

    pub async fn append_shopee_sync_log(&self, entry: SyncLogEntry) {
        self.shopee_sync_logs.write().await.push(entry);
    }

    pub async fn shopee_last_sync(&self) -> Option<DateTime<Utc>> {
        *self.shopee_last_sync.read().await
    }

    pub async fn set_shopee_last_sync(&self, at: DateTime<Utc>) {
        *self.shopee_last_sync.write().await = Some(at);
    }
}

fn category(id: u32, name: &str, name_ms: &str, name_zh: &str, icon: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        name_ms: name_ms.to_string(),
        name_zh: name_zh.to_string(),
        icon: icon.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CartItem;

    #[tokio::test]
    async fn test_seed_defaults_loads_starter_catalog() {
        let store = MemoryStore::new();
        store.seed_defaults().await;
        assert_eq!(store.count_products().await, 4);
        assert_eq!(store.list_categories().await.len(), 6);
        let phone = store.find_product("1").await.expect("seeded product");
        assert_eq!(phone.name, "Smartphone X");
        assert_eq!(phone.price.amount(), Decimal::new(2999, 0));
        assert_eq!(phone.category, "Electronics");
    }

    #[tokio::test]
    async fn test_cart_roundtrip_and_clear() {
        let store = MemoryStore::new();
        let mut cart = store.cart("sess-1").await;
        assert!(cart.items.is_empty());
        cart.add_item(CartItem {
            product_id: "1".into(),
            name: "Smartphone X".into(),
            unit_price: Money::myr(Decimal::new(2999, 0)),
            quantity: 2,
        });
        store.save_cart(cart).await;
        assert_eq!(store.cart("sess-1").await.items.len(), 1);
        store.clear_cart("sess-1").await;
        assert!(store.cart("sess-1").await.items.is_empty());
    }

    #[tokio::test]
    async fn test_pending_import_is_taken_once() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.put_pending_import(id, Vec::new()).await;
        assert!(store.take_pending_import(id).await.is_some());
        assert!(store.take_pending_import(id).await.is_none());
    }
}
