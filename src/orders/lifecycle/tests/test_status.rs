use super::*;
use crate::orders::error::OrderError;

async fn paid_lifecycle() -> (OrderLifecycle, String) {
    let gateway = Arc::new(MockGateway::approving(
        "txn-1",
        vec![record(SP_SUCCESS, "Success")],
    ));
    let lifecycle = test_lifecycle(gateway).await;
    let order = settled_order(&lifecycle, "txn-1").await;
    let order_id = order.id_string();
    (lifecycle, order_id)
}

#[tokio::test]
async fn walks_the_happy_path_to_refunded() {
    let (lifecycle, order_id) = paid_lifecycle().await;

    let shipped = lifecycle
        .update_status(&order_id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(shipped.timeline.last().unwrap().status, OrderStatus::Shipped);

    let delivered = lifecycle
        .update_status(&order_id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let refunded = lifecycle
        .update_status(&order_id, OrderStatus::Refunded)
        .await
        .unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);

    // 时间线完整: Processing -> Paid -> Shipped -> Delivered -> Refunded
    assert_eq!(refunded.timeline.len(), 5);
}

#[tokio::test]
async fn shipped_order_cannot_return_to_processing() {
    let (lifecycle, order_id) = paid_lifecycle().await;
    lifecycle
        .update_status(&order_id, OrderStatus::Shipped)
        .await
        .unwrap();

    let err = lifecycle
        .update_status(&order_id, OrderStatus::Processing)
        .await
        .unwrap_err();
    match err {
        OrderError::InvalidTransition { from, allowed } => {
            assert_eq!(from, OrderStatus::Shipped);
            assert_eq!(allowed, vec![OrderStatus::Delivered, OrderStatus::Cancelled]);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn paid_is_never_a_manual_target() {
    let gateway = Arc::new(MockGateway::approving("txn-1", vec![]));
    let lifecycle = test_lifecycle(gateway).await;
    let product_id = seed_product(&lifecycle, 5).await;
    let session = lifecycle
        .create_order(&customer(), order_payload(&product_id, 1), "127.0.0.1")
        .await
        .unwrap();

    // Processing -> Paid is in the state machine but reserved for the
    // verification flow
    let err = lifecycle
        .update_status(&session.order_id, OrderStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(OrderStatus::Paid)));
}

#[tokio::test]
async fn refunded_rejects_every_transition() {
    let (lifecycle, order_id) = paid_lifecycle().await;
    lifecycle
        .update_status(&order_id, OrderStatus::Cancelled)
        .await
        .unwrap();
    lifecycle
        .update_status(&order_id, OrderStatus::Refunded)
        .await
        .unwrap();

    for target in [
        OrderStatus::Processing,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ] {
        let err = lifecycle.update_status(&order_id, target).await.unwrap_err();
        match err {
            OrderError::InvalidTransition { from, allowed } => {
                assert_eq!(from, OrderStatus::Refunded);
                assert!(allowed.is_empty());
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn missing_order_is_reported() {
    let gateway = Arc::new(MockGateway::approving("txn-1", vec![]));
    let lifecycle = test_lifecycle(gateway).await;

    let err = lifecycle
        .update_status("order:missing", OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));
}

#[tokio::test]
async fn status_and_timeline_stay_consistent() {
    let (lifecycle, order_id) = paid_lifecycle().await;

    let order = lifecycle
        .update_status(&order_id, OrderStatus::Shipped)
        .await
        .unwrap();
    // Invariant: the last timeline entry always mirrors the status field
    assert_eq!(order.timeline.last().unwrap().status, order.status);
}
