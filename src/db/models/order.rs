//! Order Model
//!
//! 订单实体：状态机 + 追加式时间线 + 内嵌支付交易子记录

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use surrealdb::RecordId;
use validator::Validate;

// =============================================================================
// Order Status
// =============================================================================

/// Order status enum
///
/// Refunded is terminal. The full transition table lives in
/// [`crate::orders::transitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Paid => "Paid",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// One entry of the append-only status timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: OrderStatus,
    pub date_time: DateTime<Utc>,
}

// =============================================================================
// Payment Transaction (embedded sub-record)
// =============================================================================

/// Gateway transaction embedded in the order
///
/// `id` is set exactly once when payment is initiated; verification merges
/// the reconciliation fields into the same record and never replaces `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Gateway-assigned transaction id
    pub id: String,
    /// Checkout URL returned by the gateway (cleared once paid)
    #[serde(default)]
    pub checkout_url: String,
    /// Gateway transaction status string
    pub status: Option<String>,
    /// Gateway status code (1000 = success)
    pub sp_code: Option<i64>,
    /// Gateway-reported payment timestamp
    pub date_time: Option<String>,
    /// Payment method reported by the gateway
    pub method: Option<String>,
    /// Bank status: "Success" | "Failed" | "Cancel"
    pub bank_status: Option<String>,
    /// Derived payment status: "Paid" | "Pending" | "Cancelled" | ""
    pub payment_status: Option<String>,
}

// =============================================================================
// Order (主表)
// =============================================================================

/// Persisted order entity
///
/// References product and user records but does not own them.
/// Orders are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub quantity: i64,
    pub total_price: f64,
    pub shipping_address: String,
    pub phone: String,
    pub status: OrderStatus,
    /// Append-only; the last entry's status always equals `status`
    pub timeline: Vec<TimelineEntry>,
    pub transaction: Option<PaymentTransaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// String form of the record id ("order:xxx"), empty if unsaved
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    /// Whether verification already settled this order
    pub fn is_settled(&self) -> bool {
        self.transaction
            .as_ref()
            .and_then(|t| t.payment_status.as_deref())
            == Some("Paid")
    }
}

// =============================================================================
// API Request / Response Types
// =============================================================================

/// Create order payload (validated at the API boundary)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderCreate {
    /// Product record id ("product:xxx" or bare id)
    #[validate(length(min = 1, message = "Product is required"))]
    pub product: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    #[validate(range(min = 0.0, message = "Total price must not be negative"))]
    pub total_price: f64,
    #[validate(length(min = 1, message = "Shipping address is required"))]
    pub shipping_address: String,
    pub phone: String,
}

/// Response of the creation flow: where to send the customer next
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub order_id: String,
    pub checkout_url: String,
}
