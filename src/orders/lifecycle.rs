//! Order Lifecycle Manager
//!
//! Orchestrates the two payment flows and the manual status path:
//!
//! ```text
//! create_order(user, payload, ip)
//!     ├─ 1. Product lookup + stock pre-check
//!     ├─ 2. Atomic inventory reservation (the only racy step,
//!     │      settled by a conditional UPDATE at the storage layer)
//!     ├─ 3. Persist order in Processing with initial timeline entry
//!     ├─ 4. Gateway initiate (amount, order reference, purchaser, ip)
//!     ├─ 5. Attach transaction id + checkout URL (set-once)
//!     └─ 6. Return {order_id, checkout_url}
//!
//! verify_payment(transaction_id)
//!     ├─ 1. Gateway verify
//!     ├─ 2. Locate order by transaction id
//!     ├─ 3. Already settled? return unchanged (idempotent)
//!     ├─ 4. sp_code == 1000: Processing -> Paid, merge gateway fields,
//!     │      clear checkout URL
//!     └─ 5. otherwise InvalidTransaction, no mutation
//! ```
//!
//! Every step is awaited sequentially; a failure aborts the rest of the
//! flow with no retry and no compensating rollback.

use std::sync::Arc;

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{CheckoutSession, Order, OrderCreate, OrderStatus, TimelineEntry};
use crate::db::repository::order::VerificationUpdate;
use crate::db::repository::{OrderRepository, ProductRepository, record_id};
use crate::payment::{CheckoutRequest, PaymentGateway, SP_SUCCESS};

use super::error::{OrderError, OrderResult};
use super::transitions;

const CURRENCY: &str = "BDT";

/// Derive the order's payment status from the gateway bank status
fn map_bank_status(bank_status: Option<&str>) -> String {
    match bank_status {
        Some("Success") => "Paid",
        Some("Failed") => "Pending",
        Some("Cancel") => "Cancelled",
        _ => "",
    }
    .to_string()
}

/// Orchestrator for order creation, payment verification and manual
/// status updates
#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderRepository,
    products: ProductRepository,
    gateway: Arc<dyn PaymentGateway>,
}

impl OrderLifecycle {
    pub fn new(db: Surreal<Db>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db),
            gateway,
        }
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    /// Creation flow: reserve stock, persist the order, open a checkout
    ///
    /// The reservation strictly precedes order persistence, which strictly
    /// precedes payment initiation — a returned checkout URL always belongs
    /// to an order that already holds its reserved stock.
    ///
    /// If the gateway call fails after the order was persisted, the order
    /// stays in Processing without a transaction; the reservation is not
    /// rolled back.
    pub async fn create_order(
        &self,
        purchaser: &CurrentUser,
        data: OrderCreate,
        client_ip: &str,
    ) -> OrderResult<CheckoutSession> {
        // 1. Pre-check, independent of the reservation's own guard
        let product = self
            .products
            .find_by_id(&data.product)
            .await?
            .ok_or_else(|| OrderError::ProductNotFound(data.product.clone()))?;
        if product.quantity <= 0 {
            return Err(OrderError::OutOfStock(data.product.clone()));
        }

        // 2. Atomic conditional decrement; losing the race is terminal
        let reserved = self
            .products
            .reserve(&data.product, data.quantity)
            .await?
            .ok_or_else(|| OrderError::InsufficientStock(data.product.clone()))?;
        tracing::debug!(
            product = %data.product,
            remaining = reserved.quantity,
            "Stock reserved"
        );

        // 3. Persist the order in Processing
        let now = Utc::now();
        let order = self
            .orders
            .create(Order {
                id: None,
                product: record_id("product", &data.product),
                user: record_id("user", &purchaser.id),
                quantity: data.quantity,
                total_price: data.total_price,
                shipping_address: data.shipping_address.clone(),
                phone: data.phone.clone(),
                status: OrderStatus::Processing,
                timeline: vec![TimelineEntry {
                    status: OrderStatus::Processing,
                    date_time: now,
                }],
                transaction: None,
                created_at: now,
                updated_at: now,
            })
            .await?;
        let order_id = order.id_string();

        // 4. Open the checkout with the gateway
        let checkout = match self
            .gateway
            .initiate(CheckoutRequest {
                amount: data.total_price,
                order_id: order_id.clone(),
                currency: CURRENCY.to_string(),
                customer_name: purchaser.name.clone(),
                customer_email: purchaser.email.clone(),
                customer_address: data.shipping_address,
                customer_phone: data.phone,
                client_ip: client_ip.to_string(),
            })
            .await
        {
            Ok(checkout) => checkout,
            Err(e) => {
                // Known partial-failure state: the order keeps its reserved
                // stock and waits for out-of-band reconciliation
                tracing::warn!(
                    order_id = %order_id,
                    error = %e,
                    "Payment initiation failed; order remains in Processing without a transaction"
                );
                return Err(e.into());
            }
        };

        // 5. Attach the transaction reference (id is set-once)
        self.orders
            .attach_transaction(&order_id, &checkout.transaction_id, &checkout.checkout_url)
            .await?;

        tracing::info!(
            order_id = %order_id,
            transaction_id = %checkout.transaction_id,
            "Order created, checkout opened"
        );

        Ok(CheckoutSession {
            order_id,
            checkout_url: checkout.checkout_url,
        })
    }

    /// Verification flow: reconcile the order with the gateway's report
    ///
    /// Idempotent — repeated calls for an already settled order return it
    /// unchanged and never duplicate timeline entries.
    pub async fn verify_payment(&self, transaction_id: &str) -> OrderResult<Order> {
        let records = self.gateway.verify(transaction_id).await?;

        let order = self
            .orders
            .find_by_transaction(transaction_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(transaction_id.to_string()))?;

        if order.is_settled() {
            tracing::debug!(transaction_id, "Order already settled, returning as-is");
            return Ok(order);
        }

        let first = records.first().ok_or_else(|| {
            OrderError::InvalidTransaction(format!(
                "gateway returned no records for {}",
                transaction_id
            ))
        })?;

        if first.sp_code != SP_SUCCESS {
            return Err(OrderError::InvalidTransaction(format!(
                "gateway status code {} for {}",
                first.sp_code, transaction_id
            )));
        }

        // The only path that moves Processing -> Paid
        let order_id = order.id_string();
        let updated = self
            .orders
            .apply_verification(
                &order_id,
                VerificationUpdate {
                    sp_code: first.sp_code,
                    bank_status: first.bank_status.clone(),
                    method: first.method.clone(),
                    date_time: first.date_time.clone(),
                    transaction_status: first.transaction_status.clone(),
                    payment_status: map_bank_status(first.bank_status.as_deref()),
                },
            )
            .await?;

        tracing::info!(order_id = %order_id, transaction_id, "Payment verified, order settled");
        Ok(updated)
    }

    /// Manual (admin) status update, guarded by the transition table
    pub async fn update_status(
        &self,
        order_id: &str,
        requested: OrderStatus,
    ) -> OrderResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if !transitions::can_transition(order.status, requested) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                allowed: transitions::allowed_transitions(order.status).to_vec(),
            });
        }

        // Paid (and Processing) stay automatic-only even where the state
        // machine would permit them
        if !transitions::is_manual_target(requested) {
            return Err(OrderError::InvalidStatus(requested));
        }

        let updated = self
            .orders
            .record_status(&order.id_string(), requested, Utc::now())
            .await?;
        tracing::info!(order_id = %order.id_string(), status = %requested, "Order status updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests;
