//! Status Transition Guard
//!
//! 订单状态机：
//!
//! ```text
//! Processing ──► Paid ──► Shipped ──► Delivered ──► Refunded
//!     │            │          │
//!     └────────────┴──────────┴──► Cancelled ──► Refunded
//! ```
//!
//! Refunded is absorbing. Paid is only reachable through payment
//! verification, never through the manual admin path.

use crate::db::models::OrderStatus;

/// Statuses an admin may request on the manual update path
pub const MANUAL_TARGETS: [OrderStatus; 4] = [
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
    OrderStatus::Refunded,
];

/// The allowed next statuses for `from`
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Processing => &[OrderStatus::Paid, OrderStatus::Cancelled],
        OrderStatus::Paid => &[OrderStatus::Shipped, OrderStatus::Cancelled],
        OrderStatus::Shipped => &[OrderStatus::Delivered, OrderStatus::Cancelled],
        OrderStatus::Delivered => &[OrderStatus::Refunded],
        OrderStatus::Cancelled => &[OrderStatus::Refunded],
        OrderStatus::Refunded => &[],
    }
}

/// Whether the state machine permits `from -> to`
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Whether `status` is a permitted manual (admin-driven) target
pub fn is_manual_target(status: OrderStatus) -> bool {
    MANUAL_TARGETS.contains(&status)
}

/// Render an allowed-set for error messages; empty becomes "none"
pub fn describe_allowed(allowed: &[OrderStatus]) -> String {
    if allowed.is_empty() {
        return "none".to_string();
    }
    allowed
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
