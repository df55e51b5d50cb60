//! Delegation tests for the order service façade.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockOrderRepository;
use crate::test_support::InMemoryOrderRepository;

#[fixture]
fn order_seven() -> Order {
    Order::pending(OrderId::from(7), "customer-7", Vec::new())
}

#[rstest]
#[tokio::test]
async fn forwards_status_queries_unchanged() {
    let mut repo = MockOrderRepository::new();
    repo.expect_get_orders_by_status()
        .withf(|status| *status == Status::Processing)
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let service = OrderService::new(Arc::new(repo));
    let orders = service
        .get_orders_by_status(Status::Processing)
        .await
        .expect("query succeeds");
    assert!(orders.is_empty());
}

#[rstest]
#[tokio::test]
async fn surfaces_repository_errors_without_rewriting() {
    let mut repo = MockOrderRepository::new();
    repo.expect_get_order()
        .times(1)
        .returning(|_| Err(OrderRepositoryError::connection("socket closed")));

    let service = OrderService::new(Arc::new(repo));
    let err = service
        .get_order(&OrderId::from(1))
        .await
        .expect_err("connection failure propagates");
    assert_eq!(err, OrderRepositoryError::connection("socket closed"));
}

#[rstest]
#[tokio::test]
async fn forwards_insert_batches_whole(order_seven: Order) {
    let mut repo = MockOrderRepository::new();
    repo.expect_insert_orders()
        .withf(|orders| orders.len() == 1 && orders.iter().all(|o| o.order_id.as_str() == "7"))
        .times(1)
        .returning(|_| Ok(()));

    let service = OrderService::new(Arc::new(repo));
    service
        .insert_orders(&[order_seven])
        .await
        .expect("insert succeeds");
}

#[rstest]
#[tokio::test]
async fn lifecycle_scenario_moves_order_from_pending_to_complete(order_seven: Order) {
    let service = OrderService::new(Arc::new(InMemoryOrderRepository::default()));

    service
        .insert_orders(std::slice::from_ref(&order_seven))
        .await
        .expect("insert succeeds");
    let pending = service.get_pending_orders().await.expect("pending orders");
    assert_eq!(pending, vec![order_seven.clone()]);

    let shipped = order_seven.with_status(Status::Complete);
    service.update_order(&shipped).await.expect("update succeeds");

    let complete = service
        .get_orders_by_status(Status::Complete)
        .await
        .expect("complete orders");
    assert_eq!(complete, vec![shipped]);
    assert!(
        service
            .get_pending_orders()
            .await
            .expect("pending orders")
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn clones_share_one_repository(order_seven: Order) {
    let service = OrderService::new(Arc::new(InMemoryOrderRepository::default()));
    let clone = service.clone();

    clone
        .insert_orders(std::slice::from_ref(&order_seven))
        .await
        .expect("insert succeeds");
    let found = service
        .get_order(&order_seven.order_id)
        .await
        .expect("order visible through the original handle");
    assert_eq!(found, order_seven);
}
