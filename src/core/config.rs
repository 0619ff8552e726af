//! 服务器配置
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/shop | 工作目录 (数据库、日志) |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | ENVIRONMENT | development | 运行环境 |
//! | SP_ENDPOINT | https://sandbox.shurjopayment.com | 支付网关地址 |
//! | SP_USERNAME | - | 网关账号 |
//! | SP_PASSWORD | - | 网关密码 |
//! | SP_PREFIX | - | 商户订单前缀 |
//! | SP_RETURN_URL | - | 支付完成回跳地址 |

use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::payment::GatewayConfig;

/// Server configuration, loaded once at startup and treated as immutable
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库与日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 支付网关配置 (显式构造，不读全局状态)
    pub gateway: GatewayConfig,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/shop".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::default(),
            gateway: GatewayConfig {
                endpoint: std::env::var("SP_ENDPOINT")
                    .unwrap_or_else(|_| "https://sandbox.shurjopayment.com".into()),
                username: std::env::var("SP_USERNAME").unwrap_or_default(),
                password: std::env::var("SP_PASSWORD").unwrap_or_default(),
                prefix: std::env::var("SP_PREFIX").unwrap_or_default(),
                return_url: std::env::var("SP_RETURN_URL").unwrap_or_default(),
            },
        }
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录: work_dir/logs
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
