//! Flower detail side of the workflow: load a flower, reconcile the
//! requested quantity, and turn the intent to buy into a persisted order.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use fleura_api::{ApiError, CatalogApi, CreateOrderRequest, OrderApi};
use fleura_core::{FailureKind, Flower, FlowerId, QuantitySelector, Session};

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("sign in before ordering")]
    NotSignedIn,
    #[error("no flower is loaded")]
    FlowerUnavailable,
    #[error("flower is out of stock")]
    OutOfStock,
    #[error("an order submission is already in flight")]
    SubmissionInFlight,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PlacementError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotSignedIn => FailureKind::Authorization,
            Self::FlowerUnavailable | Self::OutOfStock | Self::SubmissionInFlight => {
                FailureKind::Validation
            }
            Self::Api(error) => error.kind(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "Please login to order",
            Self::FlowerUnavailable => "Sorry, something went wrong",
            Self::OutOfStock => "Sorry, this flower is out of stock",
            Self::SubmissionInFlight => "Your order is already being placed",
            Self::Api(error) => error.user_message(),
        }
    }
}

/// Where the browser goes next; the payment hop happens behind this URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRedirect {
    pub redirect_url: String,
}

struct LoadedFlower {
    flower: Flower,
    selector: QuantitySelector,
}

/// One flower detail view. Holds the fetched record and the reconciled
/// quantity; submission is guarded against re-entry from a double-click,
/// advisory only.
#[derive(Default)]
pub struct OrderPlacement {
    loaded: Option<LoadedFlower>,
    in_flight: AtomicBool,
}

impl OrderPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the flower once. There is no re-fetch on quantity changes, so
    /// `available` is as stale as the page itself.
    pub async fn load(
        &mut self,
        catalog: &dyn CatalogApi,
        id: FlowerId,
    ) -> Result<(), ApiError> {
        let flower = catalog.flower(id).await?;
        let selector = QuantitySelector::for_flower(&flower);
        self.loaded = Some(LoadedFlower { flower, selector });
        Ok(())
    }

    pub fn flower(&self) -> Option<&Flower> {
        self.loaded.as_ref().map(|loaded| &loaded.flower)
    }

    pub fn selector(&self) -> Option<&QuantitySelector> {
        self.loaded.as_ref().map(|loaded| &loaded.selector)
    }

    pub fn selector_mut(&mut self) -> Option<&mut QuantitySelector> {
        self.loaded.as_mut().map(|loaded| &mut loaded.selector)
    }

    /// Submits the order. Preconditions run in a fixed sequence and each
    /// short-circuits without touching the network: signed-in, flower
    /// loaded, stock present. The backend answers with the payment redirect.
    pub async fn submit(
        &self,
        orders: &dyn OrderApi,
        session: Option<&Session>,
    ) -> Result<PlacementRedirect, PlacementError> {
        let session = session.ok_or(PlacementError::NotSignedIn)?;
        let loaded = self.loaded.as_ref().ok_or(PlacementError::FlowerUnavailable)?;
        if !loaded.flower.in_stock() {
            return Err(PlacementError::OutOfStock);
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(PlacementError::SubmissionInFlight);
        }

        let draft = CreateOrderRequest {
            customer: session.user_id,
            flower: loaded.flower.id,
            quantity: loaded.selector.quantity(),
            total_price: loaded.selector.total(),
        };

        let result = orders.create_order(session, &draft).await;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(response) => {
                info!(flower = %draft.flower, quantity = draft.quantity, "order placed");
                Ok(PlacementRedirect { redirect_url: response.redirect_url })
            }
            Err(error) => {
                warn!(flower = %draft.flower, kind = %error.kind(), %error, "order submission failed");
                Err(error.into())
            }
        }
    }

    #[cfg(test)]
    fn engage_guard(&self) {
        self.in_flight.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use fleura_api::{InMemoryStorefront, OrderApi};
    use fleura_core::{CustomerId, FailureKind, Flower, FlowerId, OrderId, OrderStatus, Session};

    use super::{OrderPlacement, PlacementError};

    fn session() -> Session {
        Session { user_id: CustomerId(7), token: "tok".to_owned().into(), is_admin: false }
    }

    fn flower(id: i64, price: i64, available: u32) -> Flower {
        Flower {
            id: FlowerId(id),
            title: "Newbury Arrangement".to_string(),
            description: "Seven day delivery".to_string(),
            category: "Rose".to_string(),
            price: Decimal::from(price),
            available,
            image_url: "https://img.example/newbury.jpg".to_string(),
        }
    }

    async fn loaded_placement(backend: &InMemoryStorefront, flower_id: i64) -> OrderPlacement {
        let mut placement = OrderPlacement::new();
        placement.load(backend, FlowerId(flower_id)).await.expect("load flower");
        placement
    }

    #[tokio::test]
    async fn detail_page_scenario_reconciles_quantity_and_total() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 600, 3)).await;
        let mut placement = loaded_placement(&backend, 5).await;

        let selector = placement.selector_mut().expect("selector after load");
        assert_eq!(selector.quantity(), 1);
        assert_eq!(selector.total(), Decimal::from(600));

        selector.increment().expect("1 -> 2");
        selector.increment().expect("2 -> 3");
        assert_eq!(selector.quantity(), 3);
        assert_eq!(selector.total(), Decimal::from(1800));

        selector.increment().expect_err("cap at available");
        assert_eq!(selector.quantity(), 3);
    }

    #[tokio::test]
    async fn submit_places_the_order_and_returns_the_redirect() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 600, 3)).await;
        let mut placement = loaded_placement(&backend, 5).await;
        placement.selector_mut().expect("selector").set("2");

        let redirect =
            placement.submit(&backend, Some(&session())).await.expect("submission succeeds");
        assert!(redirect.redirect_url.starts_with("https://pay.example/checkout/"));
        assert_eq!(backend.create_order_calls(), 1);
        assert_eq!(backend.order_status(OrderId(1)).await, Some(OrderStatus::Pending));

        let placed = backend.order(OrderId(1)).await.expect("order stored");
        assert_eq!(placed.quantity, 2);
        assert_eq!(placed.total_price, Decimal::from(1200));
    }

    #[tokio::test]
    async fn unsigned_submission_never_reaches_the_network() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 600, 2)).await;
        let placement = loaded_placement(&backend, 5).await;

        let error = placement.submit(&backend, None).await.expect_err("must require sign-in");
        assert!(matches!(error, PlacementError::NotSignedIn));
        assert_eq!(error.kind(), FailureKind::Authorization);
        assert_eq!(error.user_message(), "Please login to order");
        assert_eq!(backend.create_order_calls(), 0);
    }

    #[tokio::test]
    async fn submission_without_a_loaded_flower_fails_locally() {
        let backend = InMemoryStorefront::new();
        let placement = OrderPlacement::new();

        let error = placement.submit(&backend, Some(&session())).await.expect_err("no flower");
        assert!(matches!(error, PlacementError::FlowerUnavailable));
        assert_eq!(backend.create_order_calls(), 0);
    }

    #[tokio::test]
    async fn out_of_stock_submission_never_reaches_the_network() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 600, 0)).await;
        let mut placement = loaded_placement(&backend, 5).await;

        let selector = placement.selector_mut().expect("selector");
        selector.increment().expect_err("no stock, no increment");

        let error = placement.submit(&backend, Some(&session())).await.expect_err("out of stock");
        assert!(matches!(error, PlacementError::OutOfStock));
        assert_eq!(error.user_message(), "Sorry, this flower is out of stock");
        assert_eq!(backend.create_order_calls(), 0);
    }

    #[tokio::test]
    async fn the_reentry_guard_rejects_a_second_submission() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 600, 2)).await;
        let placement = loaded_placement(&backend, 5).await;

        placement.engage_guard();
        let error = placement.submit(&backend, Some(&session())).await.expect_err("guarded");
        assert!(matches!(error, PlacementError::SubmissionInFlight));
        assert_eq!(backend.create_order_calls(), 0);
    }

    #[tokio::test]
    async fn a_failed_submission_clears_the_guard_and_surfaces_the_kind() {
        let backend = InMemoryStorefront::new();
        backend.seed_flower(flower(5, 600, 2)).await;
        let placement = loaded_placement(&backend, 5).await;

        backend.fail_next(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let error = placement.submit(&backend, Some(&session())).await.expect_err("backend down");
        assert_eq!(error.kind(), FailureKind::Server);
        assert_eq!(backend.create_order_calls(), 1);

        // guard released, a retry goes through
        placement.submit(&backend, Some(&session())).await.expect("retry succeeds");
        assert_eq!(backend.create_order_calls(), 2);
    }
}
