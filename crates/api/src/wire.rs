//! Request and response bodies for the storefront backend contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleura_core::{CustomerId, FlowerId, Order, TargetStatus};

/// Backend page size for the admin order listing. Fixed by the server.
pub const PAGE_SIZE: u64 = 8;

/// Body of `POST /order/create/`. `total_price` is derived client-side at
/// submission time and not re-verified afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateOrderRequest {
    pub customer: CustomerId,
    pub flower: FlowerId,
    pub quantity: u32,
    pub total_price: Decimal,
}

/// `POST /order/create/` response. The redirect target is where the external
/// payment hop begins; it is treated as opaque.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreateOrderResponse {
    pub redirect_url: String,
}

/// Body of `PUT /order/status/{id}`. The target state is explicit so client
/// and backend share one transition definition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StatusUpdateRequest {
    pub status: TargetStatus,
}

/// `GET /order/list/?page={n}` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub count: u64,
    pub results: Vec<Order>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    #[serde(default)]
    pub admin: bool,
}
