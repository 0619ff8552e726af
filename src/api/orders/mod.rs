//! Order API Module
//!
//! Creation, verification and admin status updates all funnel through the
//! order lifecycle manager; listing and detail reads hit the repository.

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        // 固定路径必须注册在 /{id} 之前
        .route("/verify", get(handler::verify))
        .route("/revenue", get(handler::revenue))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
}
