//! Order API Handlers
//!
//! Thin layer over [`OrderLifecycle`]: payload validation, role gates and
//! the response envelope. All business rules live in the orders module.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CheckoutSession, Order, OrderCreate, OrderStatus};
use crate::db::repository::record_id;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// Create a new order and open a gateway checkout
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<CheckoutSession>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = state
        .lifecycle()
        .create_order(&user, payload, &addr.ip().to_string())
        .await?;
    Ok(ok_with_message(session, "Order created successfully"))
}

/// Query params for payment verification
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// Gateway transaction id (the provider calls it order_id on redirect)
    #[serde(alias = "order_id")]
    pub transaction_id: String,
}

/// Verify a payment and reconcile the order (idempotent)
pub async fn verify(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state
        .lifecycle()
        .verify_payment(&query.transaction_id)
        .await?;
    Ok(ok_with_message(order, "Payment verified successfully"))
}

/// Manual status update payload
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Update order status (admin only, guarded by the transition table)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins may update order status".into(),
        ));
    }

    let order = state.lifecycle().update_status(&id, payload.status).await?;
    Ok(ok(order))
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// List orders (paginated; customers see their own, admins see all)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let limit = query.limit.clamp(1, 100);
    let start = (query.page.max(1) - 1) * limit;

    let scope = if user.is_admin() {
        None
    } else {
        Some(user.id.as_str())
    };
    let orders = state
        .lifecycle()
        .orders()
        .find_page(scope, limit, start)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(ok(orders))
}

/// Get order details by id (owner or admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state
        .lifecycle()
        .orders()
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

    if !user.is_admin() && order.user != record_id("user", &user.id) {
        return Err(AppError::Forbidden("Not your order".into()));
    }

    Ok(ok(order))
}

/// Revenue aggregate response
#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    pub total: f64,
}

/// Total revenue across all orders (admin only)
pub async fn revenue(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<RevenueResponse>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins may view revenue".into(),
        ));
    }

    let total = state
        .lifecycle()
        .orders()
        .revenue()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(ok_with_message(
        RevenueResponse { total },
        "Revenue calculated successfully",
    ))
}
