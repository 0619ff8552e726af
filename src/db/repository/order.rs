//! Order Repository
//!
//! Persistence for the order lifecycle. Mutations are targeted UPDATE
//! statements so the timeline stays append-only and the embedded
//! transaction id is written exactly once.

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Order, OrderStatus, TimelineEntry};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "order";

/// Gateway-reported fields merged into the order on successful verification
#[derive(Debug, Clone)]
pub struct VerificationUpdate {
    pub sp_code: i64,
    pub bank_status: Option<String>,
    pub method: Option<String>,
    pub date_time: Option<String>,
    pub transaction_status: Option<String>,
    /// Derived from bank_status: "Paid" | "Pending" | "Cancelled" | ""
    pub payment_status: String,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = record_id(ORDER_TABLE, id);
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    /// Find the order holding the given gateway transaction id
    pub async fn find_by_transaction(&self, transaction_id: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE transaction.id = $txn LIMIT 1")
            .bind(("txn", transaction_id.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Attach the gateway transaction reference after payment initiation
    ///
    /// Set-once: the conditional write refuses to replace an existing
    /// transaction id.
    pub async fn attach_transaction(
        &self,
        order_id: &str,
        transaction_id: &str,
        checkout_url: &str,
    ) -> RepoResult<Order> {
        let rid = record_id(ORDER_TABLE, order_id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET \
                   transaction = { id: $txn, checkout_url: $url }, \
                   updated_at = $now \
                 WHERE transaction = NONE RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("txn", transaction_id.to_string()))
            .bind(("url", checkout_url.to_string()))
            .bind(("now", Utc::now()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders.into_iter().next().ok_or_else(|| {
            RepoError::Validation(format!(
                "Order {} already holds a transaction",
                order_id
            ))
        })
    }

    /// Append a timeline entry and move the order to `status` in one update
    pub async fn record_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> RepoResult<Order> {
        let rid = record_id(ORDER_TABLE, order_id);
        let entry = TimelineEntry {
            status,
            date_time: at,
        };
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET status = $status, timeline += $entry, updated_at = $now \
                 RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("status", status))
            .bind(("entry", entry))
            .bind(("now", at))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Merge successful verification data into the order
    ///
    /// Moves the order to Paid, merges the gateway-reported fields into the
    /// embedded transaction (the id itself is untouched) and clears the
    /// checkout URL. The Paid timeline append is guarded inside the
    /// statement, so concurrent settlement writes never duplicate the entry.
    pub async fn apply_verification(
        &self,
        order_id: &str,
        update: VerificationUpdate,
    ) -> RepoResult<Order> {
        let rid = record_id(ORDER_TABLE, order_id);
        let now = Utc::now();

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET \
                   status = $status, \
                   transaction.sp_code = $sp_code, \
                   transaction.bank_status = $bank_status, \
                   transaction.method = $method, \
                   transaction.date_time = $date_time, \
                   transaction.status = $txn_status, \
                   transaction.payment_status = $payment_status, \
                   transaction.checkout_url = '', \
                   timeline = IF timeline[WHERE status = $status] THEN timeline \
                              ELSE timeline + [$entry] END, \
                   updated_at = $now \
                 RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("status", OrderStatus::Paid))
            .bind(("sp_code", update.sp_code))
            .bind(("bank_status", update.bank_status))
            .bind(("method", update.method))
            .bind(("date_time", update.date_time))
            .bind(("txn_status", update.transaction_status))
            .bind(("payment_status", update.payment_status))
            .bind((
                "entry",
                TimelineEntry {
                    status: OrderStatus::Paid,
                    date_time: now,
                },
            ))
            .bind(("now", now))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Paginated order list, newest first
    ///
    /// `user` scopes the list to one purchaser; `None` returns all orders.
    pub async fn find_page(
        &self,
        user: Option<&str>,
        limit: i64,
        start: i64,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = match user {
            Some(user_id) => {
                let uid = record_id("user", user_id);
                self.base
                    .db()
                    .query(
                        "SELECT * FROM order WHERE user = $user \
                         ORDER BY created_at DESC LIMIT $limit START $start",
                    )
                    .bind(("user", uid))
                    .bind(("limit", limit))
                    .bind(("start", start))
                    .await?
                    .take(0)?
            }
            None => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM order \
                         ORDER BY created_at DESC LIMIT $limit START $start",
                    )
                    .bind(("limit", limit))
                    .bind(("start", start))
                    .await?
                    .take(0)?
            }
        };
        Ok(orders)
    }

    /// Total revenue: sum of total_price across all orders
    pub async fn revenue(&self) -> RepoResult<f64> {
        #[derive(Debug, Deserialize)]
        struct RevenueRow {
            total: Option<f64>,
        }
        let mut result = self
            .base
            .db()
            .query("SELECT math::sum(total_price) AS total FROM order GROUP ALL")
            .await?;
        let rows: Vec<RevenueRow> = result.take(0)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| r.total)
            .unwrap_or(0.0))
    }
}
