//! Admin side of the workflow: the paged order table and the
//! confirmation-gated status transition.

use std::collections::HashSet;
use std::sync::Mutex;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use fleura_api::{ApiError, OrderApi, PAGE_SIZE};
use fleura_core::{FailureKind, Order, OrderId, Session, TargetStatus};

#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("page {0} is out of range")]
    PageOutOfRange(u32),
    #[error("order {0} is not on the current page")]
    UnknownOrder(OrderId),
    #[error("order {0} is not pending")]
    NotActionable(OrderId),
    #[error("a transition for order {0} is already in flight")]
    TransitionInFlight(OrderId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl DeskError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PageOutOfRange(_)
            | Self::UnknownOrder(_)
            | Self::NotActionable(_)
            | Self::TransitionInFlight(_) => FailureKind::Validation,
            Self::Api(error) => error.kind(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PageOutOfRange(_) => "That page does not exist",
            Self::UnknownOrder(_) => "Sorry, something went wrong",
            Self::NotActionable(_) => "Only pending orders can be advanced",
            Self::TransitionInFlight(_) => "That order is already being updated",
            Self::Api(error) => error.user_message(),
        }
    }
}

/// Result of the confirm dialog shown before a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Dismissed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Applied,
    Dismissed,
}

#[derive(Debug)]
struct PageState {
    page: u32,
    count: Option<u64>,
    orders: Vec<Order>,
}

impl Default for PageState {
    fn default() -> Self {
        Self { page: 1, count: None, orders: Vec::new() }
    }
}

/// The admin order table. Page state is replaced wholesale on every load;
/// in-flight transitions are tracked per order id so two rows can move
/// independently while each row stays single-flighted.
#[derive(Debug, Default)]
pub struct OrderDesk {
    state: RwLock<PageState>,
    in_flight: Mutex<HashSet<OrderId>>,
}

impl OrderDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn page(&self) -> u32 {
        self.state.read().await.page
    }

    pub async fn count(&self) -> Option<u64> {
        self.state.read().await.count
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    /// Total pages once a count is known; `None` before the first load.
    pub async fn total_pages(&self) -> Option<u32> {
        self.state.read().await.count.map(|count| count.div_ceil(PAGE_SIZE) as u32)
    }

    /// Drives the per-row spinner.
    pub fn is_in_flight(&self, id: OrderId) -> bool {
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).contains(&id)
    }

    /// Fetches page `n` and replaces the whole collection. Out-of-bounds
    /// pages are rejected before any request: below 1 always, above the
    /// last page once a count is known.
    pub async fn load_page(&self, api: &dyn OrderApi, n: u32) -> Result<(), DeskError> {
        if n < 1 {
            return Err(DeskError::PageOutOfRange(n));
        }
        if let Some(pages) = self.total_pages().await {
            if n > pages {
                return Err(DeskError::PageOutOfRange(n));
            }
        }

        self.fetch_into(api, n).await.map_err(DeskError::Api)
    }

    /// Advances a pending order to the explicit target state. On success the
    /// current page is reloaded in full rather than patched in place.
    pub async fn advance(
        &self,
        api: &dyn OrderApi,
        session: &Session,
        id: OrderId,
        target: TargetStatus,
        confirmation: Confirmation,
    ) -> Result<AdvanceOutcome, DeskError> {
        if confirmation == Confirmation::Dismissed {
            debug!(order = %id, "status transition dismissed at confirmation");
            return Ok(AdvanceOutcome::Dismissed);
        }

        let order = {
            let state = self.state.read().await;
            state
                .orders
                .iter()
                .find(|order| order.id == id)
                .cloned()
                .ok_or(DeskError::UnknownOrder(id))?
        };
        if !order.is_actionable() {
            return Err(DeskError::NotActionable(id));
        }
        if !self.begin(id) {
            return Err(DeskError::TransitionInFlight(id));
        }

        let result = api.update_status(session, id, target).await;
        self.finish(id);

        match result {
            Ok(()) => {
                info!(order = %id, ?target, "order status advanced");
                let current = self.state.read().await.page;
                self.fetch_into(api, current).await.map_err(DeskError::Api)?;
                Ok(AdvanceOutcome::Applied)
            }
            Err(error) => {
                warn!(order = %id, kind = %error.kind(), %error, "status transition failed");
                Err(error.into())
            }
        }
    }

    async fn fetch_into(&self, api: &dyn OrderApi, page: u32) -> Result<(), ApiError> {
        let fetched = api.page(page).await?;
        let mut state = self.state.write().await;
        state.page = page;
        state.count = Some(fetched.count);
        state.orders = fetched.results;
        Ok(())
    }

    fn begin(&self, id: OrderId) -> bool {
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).insert(id)
    }

    fn finish(&self, id: OrderId) {
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).remove(&id);
    }

    #[cfg(test)]
    fn force_in_flight(&self, id: OrderId) {
        self.begin(id);
    }
}
