//! Payment Module
//!
//! The gateway adapter behind the order lifecycle's payment steps.

pub mod gateway;

pub use gateway::{
    CheckoutRequest, GatewayCheckout, GatewayConfig, GatewayError, PaymentGateway,
    ShurjopayGateway, VerificationRecord, SP_SUCCESS,
};
