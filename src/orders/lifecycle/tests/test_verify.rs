use super::*;
use crate::orders::error::OrderError;

#[tokio::test]
async fn settles_processing_order_on_success_code() {
    let gateway = Arc::new(MockGateway::approving(
        "txn-1",
        vec![record(SP_SUCCESS, "Success")],
    ));
    let lifecycle = test_lifecycle(gateway).await;

    let order = settled_order(&lifecycle, "txn-1").await;

    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.timeline.len(), 2);
    assert_eq!(order.timeline.last().unwrap().status, OrderStatus::Paid);

    let txn = order.transaction.expect("transaction present");
    assert_eq!(txn.id, "txn-1");
    assert_eq!(txn.payment_status.as_deref(), Some("Paid"));
    assert_eq!(txn.bank_status.as_deref(), Some("Success"));
    assert_eq!(txn.method.as_deref(), Some("Visa"));
    assert_eq!(txn.sp_code, Some(SP_SUCCESS));
    // Checkout URL is no longer needed once paid
    assert_eq!(txn.checkout_url, "");
}

#[tokio::test]
async fn verification_is_idempotent() {
    let gateway = Arc::new(MockGateway::approving(
        "txn-1",
        vec![record(SP_SUCCESS, "Success")],
    ));
    let lifecycle = test_lifecycle(gateway.clone()).await;

    let first = settled_order(&lifecycle, "txn-1").await;
    let second = lifecycle.verify_payment("txn-1").await.unwrap();

    // Same state, no duplicated Paid entry
    assert_eq!(second.status, OrderStatus::Paid);
    assert_eq!(second.timeline.len(), first.timeline.len());
    assert_eq!(
        second
            .timeline
            .iter()
            .filter(|e| e.status == OrderStatus::Paid)
            .count(),
        1
    );
    assert_eq!(second.updated_at, first.updated_at);
    assert_eq!(gateway.verify_calls(), 2);
}

#[tokio::test]
async fn rejects_non_success_code_without_mutation() {
    let gateway = Arc::new(MockGateway::approving("txn-2", vec![record(2000, "Failed")]));
    let lifecycle = test_lifecycle(gateway).await;
    let product_id = seed_product(&lifecycle, 5).await;

    let session = lifecycle
        .create_order(&customer(), order_payload(&product_id, 1), "127.0.0.1")
        .await
        .unwrap();

    let err = lifecycle.verify_payment("txn-2").await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransaction(_)));

    // Untouched: still Processing, single timeline entry, URL intact
    let order = lifecycle
        .orders()
        .find_by_id(&session.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.timeline.len(), 1);
    let txn = order.transaction.unwrap();
    assert!(txn.payment_status.is_none());
    assert_eq!(txn.checkout_url, "https://pay.example.com/txn-2");
}

#[tokio::test]
async fn fails_for_unknown_transaction() {
    let gateway = Arc::new(MockGateway::approving(
        "txn-1",
        vec![record(SP_SUCCESS, "Success")],
    ));
    let lifecycle = test_lifecycle(gateway).await;

    let err = lifecycle.verify_payment("txn-unknown").await.unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));
}

#[tokio::test]
async fn surfaces_gateway_errors() {
    let gateway = Arc::new(MockGateway::unreachable_on_verify("txn-1"));
    let lifecycle = test_lifecycle(gateway).await;

    let err = lifecycle.verify_payment("txn-1").await.unwrap_err();
    assert!(matches!(err, OrderError::Gateway(_)));
}

#[tokio::test]
async fn empty_report_is_an_invalid_transaction() {
    let gateway = Arc::new(MockGateway::approving("txn-1", vec![]));
    let lifecycle = test_lifecycle(gateway).await;
    let product_id = seed_product(&lifecycle, 5).await;

    lifecycle
        .create_order(&customer(), order_payload(&product_id, 1), "127.0.0.1")
        .await
        .unwrap();

    let err = lifecycle.verify_payment("txn-1").await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransaction(_)));
}

#[tokio::test]
async fn repeated_settlement_writes_keep_a_single_paid_entry() {
    let gateway = Arc::new(MockGateway::approving("txn-1", vec![]));
    let lifecycle = test_lifecycle(gateway).await;
    let product_id = seed_product(&lifecycle, 5).await;
    let session = lifecycle
        .create_order(&customer(), order_payload(&product_id, 1), "127.0.0.1")
        .await
        .unwrap();

    // Two settlement writes racing past the settled check must still
    // produce exactly one Paid entry: the append is guarded in-statement
    let update = VerificationUpdate {
        sp_code: SP_SUCCESS,
        bank_status: Some("Success".to_string()),
        method: Some("Visa".to_string()),
        date_time: Some("2026-08-30 10:00:00".to_string()),
        transaction_status: Some("Completed".to_string()),
        payment_status: "Paid".to_string(),
    };
    lifecycle
        .orders()
        .apply_verification(&session.order_id, update.clone())
        .await
        .unwrap();
    let order = lifecycle
        .orders()
        .apply_verification(&session.order_id, update)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.timeline.len(), 2);
    assert_eq!(
        order
            .timeline
            .iter()
            .filter(|e| e.status == OrderStatus::Paid)
            .count(),
        1
    );
}

#[tokio::test]
async fn maps_bank_status_variants() {
    for (bank_status, expected) in [
        ("Success", "Paid"),
        ("Failed", "Pending"),
        ("Cancel", "Cancelled"),
        ("Something", ""),
    ] {
        let gateway = Arc::new(MockGateway::approving(
            "txn-1",
            vec![record(SP_SUCCESS, bank_status)],
        ));
        let lifecycle = test_lifecycle(gateway).await;

        let order = settled_order(&lifecycle, "txn-1").await;
        let txn = order.transaction.unwrap();
        assert_eq!(
            txn.payment_status.as_deref(),
            Some(expected),
            "bank_status {bank_status}"
        );
    }
}
