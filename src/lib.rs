//! Shop Server - 电商订单服务
//!
//! # 架构概述
//!
//! 本服务的核心是订单生命周期与支付对账：库存预留、订单状态机、
//! 支付网关往返以及幂等的支付校验。商品/用户 CRUD 与认证签发属于
//! 外围协作者，不在核心范围内。
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 校验与用户提取
//! ├── db/            # 嵌入式 SurrealDB、模型、仓库
//! ├── orders/        # 订单生命周期、状态机
//! ├── payment/       # 支付网关适配器
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod payment;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderError, OrderLifecycle};
pub use payment::{GatewayConfig, PaymentGateway, ShurjopayGateway};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_  ____  ____
  \__ \/ __ \/ __ \/ __ \
 ___/ / / / / /_/ / /_/ /
/____/_/ /_/\____/ .___/
                /_/
    "#
    );
}
