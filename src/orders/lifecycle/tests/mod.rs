use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::db::DbService;
use crate::db::models::ProductCreate;
use crate::payment::{GatewayCheckout, GatewayError, VerificationRecord};

mod test_status;
mod test_verify;

// ========================================================================
// Mock gateway
// ========================================================================

/// Scripted gateway: fixed initiate/verify outcomes plus call counters
pub(crate) struct MockGateway {
    checkout: Option<GatewayCheckout>,
    records: Result<Vec<VerificationRecord>, String>,
    verify_calls: AtomicUsize,
}

impl MockGateway {
    /// Initiate succeeds with `transaction_id`; verify reports `records`
    fn approving(transaction_id: &str, records: Vec<VerificationRecord>) -> Self {
        Self {
            checkout: Some(GatewayCheckout {
                transaction_id: transaction_id.to_string(),
                checkout_url: format!("https://pay.example.com/{transaction_id}"),
            }),
            records: Ok(records),
            verify_calls: AtomicUsize::new(0),
        }
    }

    /// Initiate fails with a provider rejection
    fn declining() -> Self {
        Self {
            checkout: None,
            records: Ok(vec![]),
            verify_calls: AtomicUsize::new(0),
        }
    }

    /// Verify fails with a gateway error
    fn unreachable_on_verify(transaction_id: &str) -> Self {
        Self {
            checkout: Some(GatewayCheckout {
                transaction_id: transaction_id.to_string(),
                checkout_url: format!("https://pay.example.com/{transaction_id}"),
            }),
            records: Err("token refused".to_string()),
            verify_calls: AtomicUsize::new(0),
        }
    }

    fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initiate(&self, _request: CheckoutRequest) -> Result<GatewayCheckout, GatewayError> {
        self.checkout
            .clone()
            .ok_or_else(|| GatewayError::Rejected("payment declined".to_string()))
    }

    async fn verify(&self, _transaction_id: &str) -> Result<Vec<VerificationRecord>, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        match &self.records {
            Ok(records) => Ok(records.clone()),
            Err(msg) => Err(GatewayError::Auth(msg.clone())),
        }
    }
}

// ========================================================================
// Helpers
// ========================================================================

fn record(sp_code: i64, bank_status: &str) -> VerificationRecord {
    VerificationRecord {
        sp_code,
        sp_message: None,
        bank_status: Some(bank_status.to_string()),
        method: Some("Visa".to_string()),
        date_time: Some("2026-08-30 10:00:00".to_string()),
        transaction_status: Some("Completed".to_string()),
        order_id: None,
        amount: None,
    }
}

async fn test_lifecycle(gateway: Arc<MockGateway>) -> OrderLifecycle {
    let db = DbService::memory()
        .await
        .expect("Failed to open in-memory db")
        .db;
    OrderLifecycle::new(db, gateway)
}

fn customer() -> CurrentUser {
    CurrentUser {
        id: "user:alice".to_string(),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        role: "customer".to_string(),
    }
}

async fn seed_product(lifecycle: &OrderLifecycle, quantity: i64) -> String {
    let product = lifecycle
        .products()
        .create(ProductCreate {
            name: "Test Product".to_string(),
            price: 50.0,
            quantity,
        })
        .await
        .expect("Failed to seed product");
    product.id.expect("seeded product has an id").to_string()
}

fn order_payload(product_id: &str, quantity: i64) -> OrderCreate {
    OrderCreate {
        product: product_id.to_string(),
        quantity,
        total_price: 50.0 * quantity as f64,
        shipping_address: "12 Harbour Road".to_string(),
        phone: "01700000000".to_string(),
    }
}

/// Create an order and settle it through verification
async fn settled_order(lifecycle: &OrderLifecycle, transaction_id: &str) -> Order {
    let product_id = seed_product(lifecycle, 10).await;
    lifecycle
        .create_order(&customer(), order_payload(&product_id, 1), "127.0.0.1")
        .await
        .expect("Failed to create order");
    lifecycle
        .verify_payment(transaction_id)
        .await
        .expect("Failed to verify payment")
}
