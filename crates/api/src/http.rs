//! reqwest implementation of the storefront backend contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use tracing::{debug, warn};
use uuid::Uuid;

use fleura_core::config::BackendConfig;
use fleura_core::{CustomerId, Flower, FlowerId, Order, OrderId, Session, TargetStatus};

use crate::error::ApiError;
use crate::wire::{
    CreateOrderRequest, CreateOrderResponse, LoginRequest, LoginResponse, OrderPage,
    StatusUpdateRequest,
};
use crate::{AuthApi, CatalogApi, OrderApi};

#[derive(Clone)]
pub struct HttpStorefront {
    base_url: String,
    client: Client,
}

impl HttpStorefront {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.header(header::AUTHORIZATION, token_header(session))
    }

    async fn fetch<T>(&self, operation: &'static str, path: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, operation, path, "fetching from backend");
        let response = self.client.get(self.url(path)).send().await?;
        decode(operation, expect_ok(operation, correlation_id, response)?).await
    }
}

/// The backend uses the DRF token scheme, not `Bearer`.
fn token_header(session: &Session) -> String {
    format!("Token {}", session.token.expose_secret())
}

/// Success is status 200 exactly, including order creation.
fn expect_ok(
    operation: &'static str,
    correlation_id: Uuid,
    response: Response,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status != StatusCode::OK {
        warn!(%correlation_id, operation, %status, "backend rejected request");
        return Err(ApiError::UnexpectedStatus { operation, status });
    }
    Ok(response)
}

async fn decode<T>(operation: &'static str, response: Response) -> Result<T, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    response.json().await.map_err(|source| ApiError::Decode { operation, source })
}

#[async_trait]
impl CatalogApi for HttpStorefront {
    async fn flower(&self, id: FlowerId) -> Result<Flower, ApiError> {
        self.fetch("flower.get", &format!("/flower/list/{id}")).await
    }
}

#[async_trait]
impl OrderApi for HttpStorefront {
    async fn create_order(
        &self,
        session: &Session,
        draft: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let operation = "order.create";
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, operation, flower = %draft.flower, quantity = draft.quantity,
            "submitting order");
        let request = self.client.post(self.url("/order/create/")).json(draft);
        let response = self.authorized(request, session).send().await?;
        decode(operation, expect_ok(operation, correlation_id, response)?).await
    }

    async fn update_status(
        &self,
        session: &Session,
        id: OrderId,
        target: TargetStatus,
    ) -> Result<(), ApiError> {
        let operation = "order.status";
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, operation, order = %id, ?target, "advancing order status");
        let body = StatusUpdateRequest { status: target };
        let request = self.client.put(self.url(&format!("/order/status/{id}"))).json(&body);
        let response = self.authorized(request, session).send().await?;
        expect_ok(operation, correlation_id, response)?;
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.fetch("order.get", &format!("/order/list/{id}")).await
    }

    async fn page(&self, page: u32) -> Result<OrderPage, ApiError> {
        self.fetch("order.page", &format!("/order/list/?page={page}")).await
    }

    async fn for_customer(&self, customer: CustomerId) -> Result<Vec<Order>, ApiError> {
        self.fetch("order.history", &format!("/order/list/?customer_id={}", customer.0)).await
    }
}

#[async_trait]
impl AuthApi for HttpStorefront {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let operation = "customer.login";
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, operation, username = %request.username, "logging in");
        let response = self.client.post(self.url("/customer/login/")).json(request).send().await?;
        decode(operation, expect_ok(operation, correlation_id, response)?).await
    }

    async fn logout(&self, session: &Session) -> Result<(), ApiError> {
        let operation = "customer.logout";
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, operation, "logging out");
        let request = self.client.get(self.url("/customer/logout/"));
        let response = self.authorized(request, session).send().await?;
        expect_ok(operation, correlation_id, response)?;
        Ok(())
    }
}
