//! Authentication Module
//!
//! JWT verification and the CurrentUser extractor. Credential management
//! and token issuance endpoints live outside this service.

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
