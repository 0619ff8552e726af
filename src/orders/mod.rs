//! Orders Module
//!
//! Order lifecycle orchestration and the status state machine.

pub mod error;
pub mod lifecycle;
pub mod transitions;

pub use error::{OrderError, OrderResult};
pub use lifecycle::OrderLifecycle;
