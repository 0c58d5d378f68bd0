pub mod error;
pub mod http;
pub mod memory;
pub mod wire;

use async_trait::async_trait;

use fleura_core::{CustomerId, Flower, FlowerId, Order, OrderId, Session, TargetStatus};

pub use error::ApiError;
pub use http::HttpStorefront;
pub use memory::InMemoryStorefront;
pub use wire::{
    CreateOrderRequest, CreateOrderResponse, LoginRequest, LoginResponse, OrderPage,
    StatusUpdateRequest, PAGE_SIZE,
};

/// Read-only access to the flower catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn flower(&self, id: FlowerId) -> Result<Flower, ApiError>;
}

/// Order creation, status transition, and the list endpoints.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(
        &self,
        session: &Session,
        draft: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError>;

    async fn update_status(
        &self,
        session: &Session,
        id: OrderId,
        target: TargetStatus,
    ) -> Result<(), ApiError>;

    async fn order(&self, id: OrderId) -> Result<Order, ApiError>;

    async fn page(&self, page: u32) -> Result<OrderPage, ApiError>;

    async fn for_customer(&self, customer: CustomerId) -> Result<Vec<Order>, ApiError>;
}

/// Login and logout against the customer endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    async fn logout(&self, session: &Session) -> Result<(), ApiError>;
}
