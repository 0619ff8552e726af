//! Order lifecycle errors

use crate::db::models::OrderStatus;
use crate::db::repository::RepoError;
use crate::orders::transitions;
use crate::payment::GatewayError;
use crate::utils::AppError;
use thiserror::Error;

/// Errors of the order lifecycle flows
///
/// Every failure aborts the remainder of its flow; nothing is retried.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("No stock available for product {0}")]
    OutOfStock(String),

    #[error("Insufficient stock for product {0}")]
    InsufficientStock(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Payment verification did not report success: {0}")]
    InvalidTransaction(String),

    #[error("Cannot change status from {from} (allowed next: {})", transitions::describe_allowed(.allowed))]
    InvalidTransition {
        from: OrderStatus,
        allowed: Vec<OrderStatus>,
    },

    #[error("Status {0} cannot be set manually")]
    InvalidStatus(OrderStatus),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::ProductNotFound(_) | OrderError::OrderNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            OrderError::OutOfStock(_)
            | OrderError::InsufficientStock(_)
            | OrderError::InvalidTransition { .. }
            | OrderError::InvalidTransaction(_) => AppError::BusinessRule(err.to_string()),
            OrderError::InvalidStatus(_) => AppError::Validation(err.to_string()),
            OrderError::Gateway(e) => AppError::Gateway(e.to_string()),
            OrderError::Repo(RepoError::NotFound(msg)) => AppError::NotFound(msg),
            OrderError::Repo(RepoError::Validation(msg)) => AppError::Validation(msg),
            OrderError::Repo(RepoError::Database(msg)) => AppError::Database(msg),
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
