//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单生命周期接口

pub mod health;
pub mod orders;

use axum::Router;

use crate::core::ServerState;

/// Compose all API routers
pub fn router() -> Router<ServerState> {
    Router::new().merge(health::router()).merge(orders::router())
}
