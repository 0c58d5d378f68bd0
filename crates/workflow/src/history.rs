//! Customer-facing order reads: the profile history table and the single
//! order view with its payment badge.

use fleura_api::{ApiError, OrderApi};
use fleura_core::{Order, OrderId, Session};

/// All orders for the signed-in customer, oldest first. The non-paged list
/// endpoint; the profile page renders it as one table.
pub async fn order_history(
    api: &dyn OrderApi,
    session: &Session,
) -> Result<Vec<Order>, ApiError> {
    api.for_customer(session.user_id).await
}

pub async fn order_detail(api: &dyn OrderApi, id: OrderId) -> Result<Order, ApiError> {
    api.order(id).await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use fleura_api::InMemoryStorefront;
    use fleura_core::{CustomerId, FlowerId, Order, OrderId, OrderStatus, Session};

    use super::{order_detail, order_history};

    fn order(id: i64, customer: i64) -> Order {
        Order {
            id: OrderId(id),
            customer: CustomerId(customer),
            flower: FlowerId(1),
            quantity: 1,
            total_price: Decimal::from(600),
            status: OrderStatus::Pending,
            payment_status: id % 2 == 0,
            created_at: Utc::now(),
        }
    }

    fn session(customer: i64) -> Session {
        Session { user_id: CustomerId(customer), token: "tok".to_owned().into(), is_admin: false }
    }

    #[tokio::test]
    async fn history_only_returns_the_customers_orders() {
        let backend = InMemoryStorefront::new();
        backend.seed_order(order(1, 7)).await;
        backend.seed_order(order(2, 9)).await;
        backend.seed_order(order(3, 7)).await;

        let mine = order_history(&backend, &session(7)).await.expect("history");
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|order| order.customer == CustomerId(7)));
    }

    #[tokio::test]
    async fn detail_returns_the_payment_state() {
        let backend = InMemoryStorefront::new();
        backend.seed_order(order(2, 7)).await;

        let fetched = order_detail(&backend, OrderId(2)).await.expect("detail");
        assert!(fetched.payment_status);
    }
}
