//! Product Model (stock-relevant collaborator state)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product entity
///
/// Only the stock fields matter to the order lifecycle: `quantity` and
/// `in_stock` (true iff quantity > 0). Both are mutated exclusively through
/// the atomic conditional decrement in the product repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub in_stock: bool,
}

/// Create product payload (catalog seeding)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}
