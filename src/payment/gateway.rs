//! Payment Gateway Adapter
//!
//! Bridges the provider's callback-style payment API into a plain
//! request/response contract so the order lifecycle can await payment like
//! any other dependency. Two operations: initiate a checkout, verify a
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Provider status code denoting a successfully completed payment
pub const SP_SUCCESS: i64 = 1000;

/// Gateway credentials and endpoints
///
/// Constructed explicitly at startup and handed to the adapter — gateway
/// settings are never read from ambient global state.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Provider base URL, e.g. "https://sandbox.shurjopayment.com"
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Merchant order-id prefix assigned by the provider
    pub prefix: String,
    /// URL the provider redirects the customer back to
    pub return_url: String,
}

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway authentication failed: {0}")]
    Auth(String),

    #[error("Gateway rejected the request: {0}")]
    Rejected(String),

    #[error("Gateway response malformed: {0}")]
    Malformed(String),
}

/// Checkout initiation payload
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub amount: f64,
    /// Our order id, used as the merchant order reference
    pub order_id: String,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub customer_phone: String,
    pub client_ip: String,
}

/// Successful checkout initiation
#[derive(Debug, Clone)]
pub struct GatewayCheckout {
    /// Gateway-assigned transaction id
    pub transaction_id: String,
    pub checkout_url: String,
}

/// One gateway-reported verification leg
///
/// The provider may report several records for a single transaction id;
/// callers inspect the first record's `sp_code`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationRecord {
    #[serde(default, deserialize_with = "flexible_code")]
    pub sp_code: i64,
    #[serde(default)]
    pub sp_message: Option<String>,
    #[serde(default)]
    pub bank_status: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// The provider sends status codes as either numbers or strings
fn flexible_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Int(i64),
        Str(String),
    }
    match Code::deserialize(deserializer)? {
        Code::Int(i) => Ok(i),
        Code::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid status code: {}", s))),
    }
}

/// Payment gateway contract consumed by the order lifecycle
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Initiate a checkout; a provider-reported failure must surface as an
    /// error, never as a silent success.
    async fn initiate(&self, request: CheckoutRequest) -> Result<GatewayCheckout, GatewayError>;

    /// Fetch the verification records for a transaction id
    async fn verify(&self, transaction_id: &str) -> Result<Vec<VerificationRecord>, GatewayError>;
}

// =============================================================================
// ShurjoPay HTTP implementation
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    token_type: Option<String>,
    /// Token lifetime in seconds
    expires_in: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    token_type: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        // 30s slack so a token never expires mid-request
        Utc::now() + Duration::seconds(30) < self.expires_at
    }

    fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.token)
    }
}

#[derive(Debug, Serialize)]
struct SecretPayRequest {
    token: String,
    prefix: String,
    currency: String,
    return_url: String,
    cancel_url: String,
    amount: f64,
    order_id: String,
    customer_name: String,
    customer_email: String,
    customer_address: String,
    customer_phone: String,
    customer_city: String,
    client_ip: String,
}

#[derive(Debug, Deserialize)]
struct SecretPayResponse {
    sp_order_id: Option<String>,
    checkout_url: Option<String>,
    message: Option<String>,
}

/// ShurjoPay-style HTTP gateway
pub struct ShurjopayGateway {
    config: GatewayConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl ShurjopayGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            token: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// Fetch a bearer token, reusing the cached one while it is valid
    async fn ensure_token(&self) -> Result<CachedToken, GatewayError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref()
            && cached.is_valid()
        {
            return Ok(cached.clone());
        }

        let response: TokenResponse = self
            .http
            .post(self.url("get_token"))
            .json(&serde_json::json!({
                "username": self.config.username,
                "password": self.config.password,
            }))
            .send()
            .await?
            .json()
            .await?;

        let (token, expires_in) = match (response.token, response.expires_in) {
            (Some(t), Some(exp)) => (t, exp),
            _ => {
                return Err(GatewayError::Auth(
                    response
                        .message
                        .unwrap_or_else(|| "no token in response".to_string()),
                ));
            }
        };

        let cached = CachedToken {
            token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        };
        *guard = Some(cached.clone());
        Ok(cached)
    }
}

#[async_trait]
impl PaymentGateway for ShurjopayGateway {
    async fn initiate(&self, request: CheckoutRequest) -> Result<GatewayCheckout, GatewayError> {
        let token = self.ensure_token().await?;

        let payload = SecretPayRequest {
            token: token.token.clone(),
            prefix: self.config.prefix.clone(),
            currency: request.currency,
            return_url: self.config.return_url.clone(),
            cancel_url: self.config.return_url.clone(),
            amount: request.amount,
            order_id: request.order_id,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_address: request.customer_address,
            customer_phone: request.customer_phone,
            customer_city: "N/A".to_string(),
            client_ip: request.client_ip,
        };

        let response: SecretPayResponse = self
            .http
            .post(self.url("secret-pay"))
            .header(http::header::AUTHORIZATION, token.header_value())
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        match (response.sp_order_id, response.checkout_url) {
            (Some(transaction_id), Some(checkout_url)) => Ok(GatewayCheckout {
                transaction_id,
                checkout_url,
            }),
            _ => Err(GatewayError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "checkout was not created".to_string()),
            )),
        }
    }

    async fn verify(&self, transaction_id: &str) -> Result<Vec<VerificationRecord>, GatewayError> {
        let token = self.ensure_token().await?;

        let body = self
            .http
            .post(self.url("verification"))
            .header(http::header::AUTHORIZATION, token.header_value())
            .json(&serde_json::json!({ "order_id": transaction_id }))
            .send()
            .await?
            .text()
            .await?;

        // 成功时返回记录数组；错误时返回单个对象
        serde_json::from_str::<Vec<VerificationRecord>>(&body).map_err(|_| {
            let mut detail = body;
            detail.truncate(200);
            GatewayError::Malformed(detail)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_record_accepts_numeric_and_string_codes() {
        let numeric: VerificationRecord =
            serde_json::from_str(r#"{"sp_code": 1000, "bank_status": "Success"}"#).unwrap();
        assert_eq!(numeric.sp_code, SP_SUCCESS);

        let stringy: VerificationRecord =
            serde_json::from_str(r#"{"sp_code": "1000", "bank_status": "Success"}"#).unwrap();
        assert_eq!(stringy.sp_code, SP_SUCCESS);
    }

    #[test]
    fn verification_record_defaults_missing_code() {
        let record: VerificationRecord = serde_json::from_str(r#"{}"#).unwrap();
        assert_ne!(record.sp_code, SP_SUCCESS);
    }

    #[test]
    fn cached_token_expiry_includes_slack() {
        let expired = CachedToken {
            token: "t".into(),
            token_type: "Bearer".into(),
            expires_at: Utc::now() + Duration::seconds(10),
        };
        assert!(!expired.is_valid());

        let fresh = CachedToken {
            token: "t".into(),
            token_type: "Bearer".into(),
            expires_at: Utc::now() + Duration::seconds(3600),
        };
        assert!(fresh.is_valid());
    }
}
