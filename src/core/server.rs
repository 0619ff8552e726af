//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower::{BoxError, ServiceBuilder};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::{AppError, AppResponse};

/// 单个请求的处理时限
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// 并发请求上限
const MAX_IN_FLIGHT: usize = 1024;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        let app = build_app(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Shop server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        // ConnectInfo 用于向支付网关上报客户端 IP
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

        Ok(())
    }
}

/// Assemble the router with the full middleware stack
pub fn build_app(state: ServerState) -> axum::Router {
    api::router()
        .layer(
            // HandleErrorLayer 必须在 timeout 外层，把 BoxError 转回响应
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(REQUEST_TIMEOUT)
                .concurrency_limit(MAX_IN_FLIGHT)
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(AppResponse::<()> {
                code: "E9003".to_string(),
                message: "Request timed out".to_string(),
                data: None,
            }),
        )
            .into_response()
    } else {
        AppError::Internal(err.to_string()).into_response()
    }
}
