//! In-memory stand-in for the storefront backend.
//!
//! Behaves like the remote: assigns order ids, owns inventory decrements,
//! applies status transitions. Call counters let workflow tests assert the
//! "no network call" and "exactly one request" properties, and a one-shot
//! failure injection simulates backend rejections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tokio::sync::RwLock;

use fleura_core::{CustomerId, Flower, FlowerId, Order, OrderId, OrderStatus, Session, TargetStatus};

use crate::error::ApiError;
use crate::wire::{
    CreateOrderRequest, CreateOrderResponse, LoginRequest, LoginResponse, OrderPage, PAGE_SIZE,
};
use crate::{AuthApi, CatalogApi, OrderApi};

#[derive(Clone, Debug)]
struct Account {
    password: String,
    token: String,
    user_id: i64,
    admin: bool,
}

#[derive(Default)]
struct State {
    flowers: HashMap<i64, Flower>,
    orders: HashMap<i64, Order>,
    accounts: HashMap<String, Account>,
    next_order_id: i64,
}

#[derive(Default)]
struct Calls {
    flower: AtomicU32,
    create_order: AtomicU32,
    update_status: AtomicU32,
    page: AtomicU32,
    history: AtomicU32,
    login: AtomicU32,
    logout: AtomicU32,
}

#[derive(Default)]
pub struct InMemoryStorefront {
    state: RwLock<State>,
    calls: Calls,
    fail_next: Mutex<Option<StatusCode>>,
}

impl InMemoryStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_flower(&self, flower: Flower) {
        self.state.write().await.flowers.insert(flower.id.0, flower);
    }

    pub async fn seed_order(&self, order: Order) {
        let mut state = self.state.write().await;
        state.next_order_id = state.next_order_id.max(order.id.0);
        state.orders.insert(order.id.0, order);
    }

    pub async fn seed_account(&self, username: &str, password: &str, user_id: i64, admin: bool) {
        let account = Account {
            password: password.to_owned(),
            token: format!("tok-{username}"),
            user_id,
            admin,
        };
        self.state.write().await.accounts.insert(username.to_owned(), account);
    }

    /// The next call, whatever it is, answers with this status instead.
    pub fn fail_next(&self, status: StatusCode) {
        *self.fail_next.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(status);
    }

    pub async fn order_status(&self, id: OrderId) -> Option<OrderStatus> {
        self.state.read().await.orders.get(&id.0).map(|order| order.status)
    }

    pub async fn flower_available(&self, id: FlowerId) -> Option<u32> {
        self.state.read().await.flowers.get(&id.0).map(|flower| flower.available)
    }

    pub fn create_order_calls(&self) -> u32 {
        self.calls.create_order.load(Ordering::SeqCst)
    }

    pub fn update_status_calls(&self) -> u32 {
        self.calls.update_status.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> u32 {
        self.calls.page.load(Ordering::SeqCst)
    }

    fn take_failure(&self, operation: &'static str) -> Result<(), ApiError> {
        let injected =
            self.fail_next.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take();
        match injected {
            Some(status) => Err(ApiError::UnexpectedStatus { operation, status }),
            None => Ok(()),
        }
    }

    fn authenticate(state: &State, session: &Session) -> Result<(), ApiError> {
        let token = session.token.expose_secret();
        let known = state.accounts.is_empty()
            || state.accounts.values().any(|account| account.token == token);
        if known {
            Ok(())
        } else {
            Err(ApiError::UnexpectedStatus {
                operation: "auth.token",
                status: StatusCode::UNAUTHORIZED,
            })
        }
    }
}

#[async_trait]
impl CatalogApi for InMemoryStorefront {
    async fn flower(&self, id: FlowerId) -> Result<Flower, ApiError> {
        self.calls.flower.fetch_add(1, Ordering::SeqCst);
        self.take_failure("flower.get")?;
        let state = self.state.read().await;
        state.flowers.get(&id.0).cloned().ok_or(ApiError::UnexpectedStatus {
            operation: "flower.get",
            status: StatusCode::NOT_FOUND,
        })
    }
}

#[async_trait]
impl OrderApi for InMemoryStorefront {
    async fn create_order(
        &self,
        session: &Session,
        draft: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        self.calls.create_order.fetch_add(1, Ordering::SeqCst);
        self.take_failure("order.create")?;

        let mut state = self.state.write().await;
        Self::authenticate(&state, session)?;
        let flower = state.flowers.get_mut(&draft.flower.0).ok_or(ApiError::UnexpectedStatus {
            operation: "order.create",
            status: StatusCode::BAD_REQUEST,
        })?;
        if draft.quantity < 1 || draft.quantity > flower.available {
            return Err(ApiError::UnexpectedStatus {
                operation: "order.create",
                status: StatusCode::BAD_REQUEST,
            });
        }
        flower.available -= draft.quantity;

        state.next_order_id += 1;
        let id = state.next_order_id;
        let order = Order {
            id: OrderId(id),
            customer: draft.customer,
            flower: draft.flower,
            quantity: draft.quantity,
            total_price: draft.total_price,
            status: OrderStatus::Pending,
            payment_status: false,
            created_at: Utc::now(),
        };
        state.orders.insert(id, order);

        Ok(CreateOrderResponse { redirect_url: format!("https://pay.example/checkout/{id}") })
    }

    async fn update_status(
        &self,
        session: &Session,
        id: OrderId,
        target: TargetStatus,
    ) -> Result<(), ApiError> {
        self.calls.update_status.fetch_add(1, Ordering::SeqCst);
        self.take_failure("order.status")?;

        let mut state = self.state.write().await;
        Self::authenticate(&state, session)?;
        let order = state.orders.get_mut(&id.0).ok_or(ApiError::UnexpectedStatus {
            operation: "order.status",
            status: StatusCode::NOT_FOUND,
        })?;
        order.transition_to(target.as_status()).map_err(|_| ApiError::UnexpectedStatus {
            operation: "order.status",
            status: StatusCode::BAD_REQUEST,
        })
    }

    async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        let state = self.state.read().await;
        state.orders.get(&id.0).cloned().ok_or(ApiError::UnexpectedStatus {
            operation: "order.get",
            status: StatusCode::NOT_FOUND,
        })
    }

    async fn page(&self, page: u32) -> Result<OrderPage, ApiError> {
        self.calls.page.fetch_add(1, Ordering::SeqCst);
        self.take_failure("order.page")?;

        let state = self.state.read().await;
        let mut all: Vec<Order> = state.orders.values().cloned().collect();
        all.sort_by_key(|order| order.id.0);

        let count = all.len() as u64;
        let start = (u64::from(page.saturating_sub(1))) * PAGE_SIZE;
        let results = all
            .into_iter()
            .skip(start as usize)
            .take(PAGE_SIZE as usize)
            .collect();

        Ok(OrderPage { count, results })
    }

    async fn for_customer(&self, customer: CustomerId) -> Result<Vec<Order>, ApiError> {
        self.calls.history.fetch_add(1, Ordering::SeqCst);
        self.take_failure("order.history")?;

        let state = self.state.read().await;
        let mut mine: Vec<Order> =
            state.orders.values().filter(|order| order.customer == customer).cloned().collect();
        mine.sort_by_key(|order| order.id.0);
        Ok(mine)
    }
}

#[async_trait]
impl AuthApi for InMemoryStorefront {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.take_failure("customer.login")?;

        let state = self.state.read().await;
        let account = state
            .accounts
            .get(&request.username)
            .filter(|account| account.password == request.password)
            .ok_or(ApiError::UnexpectedStatus {
                operation: "customer.login",
                status: StatusCode::UNAUTHORIZED,
            })?;

        Ok(LoginResponse {
            token: account.token.clone(),
            user_id: account.user_id,
            admin: account.admin,
        })
    }

    async fn logout(&self, session: &Session) -> Result<(), ApiError> {
        self.calls.logout.fetch_add(1, Ordering::SeqCst);
        self.take_failure("customer.logout")?;

        let state = self.state.read().await;
        Self::authenticate(&state, session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use fleura_core::{
        CustomerId, Flower, FlowerId, Order, OrderId, OrderStatus, Session, TargetStatus,
    };

    use super::InMemoryStorefront;
    use crate::wire::CreateOrderRequest;
    use crate::{AuthApi, CatalogApi, OrderApi};

    fn session() -> Session {
        Session { user_id: CustomerId(7), token: "tok".to_owned().into(), is_admin: true }
    }

    fn flower(id: i64, available: u32) -> Flower {
        Flower {
            id: FlowerId(id),
            title: format!("Flower {id}"),
            description: "A flower".to_string(),
            category: "Rose".to_string(),
            price: Decimal::from(600),
            available,
            image_url: "https://img.example/f.jpg".to_string(),
        }
    }

    fn order(id: i64, customer: i64, status: OrderStatus) -> Order {
        Order {
            id: OrderId(id),
            customer: CustomerId(customer),
            flower: FlowerId(1),
            quantity: 1,
            total_price: Decimal::from(600),
            status,
            payment_status: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn creating_an_order_assigns_an_id_and_decrements_stock() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 3)).await;

        let draft = CreateOrderRequest {
            customer: CustomerId(7),
            flower: FlowerId(5),
            quantity: 2,
            total_price: Decimal::from(1200),
        };
        let response = backend.create_order(&session(), &draft).await.expect("create order");
        assert!(response.redirect_url.starts_with("https://pay.example/checkout/"));
        assert_eq!(backend.flower_available(FlowerId(5)).await, Some(1));
        assert_eq!(backend.order_status(OrderId(1)).await, Some(OrderStatus::Pending));
    }

    #[tokio::test]
    async fn pages_are_cut_to_eight_rows() {
        let backend = InMemoryStorefront::new();
        for id in 1..=20 {
            backend.seed_order(order(id, 7, OrderStatus::Pending)).await;
        }

        let first = backend.page(1).await.expect("page 1");
        assert_eq!(first.count, 20);
        assert_eq!(first.results.len(), 8);
        assert_eq!(first.results[0].id, OrderId(1));

        let last = backend.page(3).await.expect("page 3");
        assert_eq!(last.results.len(), 4);
        assert_eq!(last.results[0].id, OrderId(17));
    }

    #[tokio::test]
    async fn status_updates_respect_the_transition_table() {
        let backend = InMemoryStorefront::new();
        backend.seed_order(order(42, 7, OrderStatus::Pending)).await;

        backend
            .update_status(&session(), OrderId(42), TargetStatus::Completed)
            .await
            .expect("pending order should advance");
        assert_eq!(backend.order_status(OrderId(42)).await, Some(OrderStatus::Completed));

        let error = backend
            .update_status(&session(), OrderId(42), TargetStatus::Canceled)
            .await
            .expect_err("terminal order must not move");
        assert_eq!(error.kind(), fleura_core::FailureKind::Validation);
    }

    #[tokio::test]
    async fn login_round_trips_seeded_accounts() {
        let backend = InMemoryStorefront::new();
        backend.seed_account("rose", "petal", 7, false).await;

        let response = backend
            .login(&crate::wire::LoginRequest {
                username: "rose".to_string(),
                password: "petal".to_string(),
            })
            .await
            .expect("login");
        assert_eq!(response.user_id, 7);
        assert!(!response.admin);

        let rejected = backend
            .login(&crate::wire::LoginRequest {
                username: "rose".to_string(),
                password: "thorn".to_string(),
            })
            .await
            .expect_err("wrong password");
        assert_eq!(rejected.kind(), fleura_core::FailureKind::Authorization);
    }

    #[tokio::test]
    async fn injected_failures_hit_the_next_call_only() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 3)).await;

        backend.fail_next(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let error = backend.flower(FlowerId(5)).await.expect_err("injected failure");
        assert_eq!(error.kind(), fleura_core::FailureKind::Server);

        backend.flower(FlowerId(5)).await.expect("next call succeeds");
    }
}
