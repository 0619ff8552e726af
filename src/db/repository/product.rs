//! Product Repository
//!
//! Catalog reads plus the single stock mutation the order lifecycle needs:
//! an atomic conditional decrement.

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Product, ProductCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = record_id(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select(rid).await?;
        Ok(product)
    }

    /// Create a product (catalog seeding / admin tooling)
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.quantity < 0 {
            return Err(RepoError::Validation("quantity must not be negative".into()));
        }
        let product = Product {
            id: None,
            name: data.name,
            price: data.price,
            in_stock: data.quantity > 0,
            quantity: data.quantity,
        };
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Reserve stock: atomic conditional decrement
    ///
    /// The sufficiency check and the decrement are one conditional UPDATE,
    /// so two concurrent reservations can never drive the quantity negative.
    /// SET clauses apply in order, so `in_stock` sees the decremented value.
    ///
    /// Returns `None` when the product is missing or the stock is
    /// insufficient; in that case nothing was written.
    pub async fn reserve(&self, id: &str, quantity: i64) -> RepoResult<Option<Product>> {
        if quantity <= 0 {
            return Err(RepoError::Validation("quantity must be positive".into()));
        }
        let rid = record_id(PRODUCT_TABLE, id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE product SET quantity -= $qty, in_stock = quantity > 0 \
                 WHERE id = $id AND quantity >= $qty RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("qty", quantity))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::ProductCreate;

    async fn repo_with_product(quantity: i64) -> (ProductRepository, String) {
        let db = DbService::memory().await.unwrap().db;
        let repo = ProductRepository::new(db);
        let product = repo
            .create(ProductCreate {
                name: "Widget".to_string(),
                price: 9.5,
                quantity,
            })
            .await
            .unwrap();
        (repo, product.id.unwrap().to_string())
    }

    #[tokio::test]
    async fn reserve_decrements_stock() {
        let (repo, id) = repo_with_product(10).await;

        let after = repo.reserve(&id, 4).await.unwrap().unwrap();
        assert_eq!(after.quantity, 6);
        assert!(after.in_stock);
    }

    #[tokio::test]
    async fn reserve_clears_in_stock_at_zero() {
        let (repo, id) = repo_with_product(3).await;

        let after = repo.reserve(&id, 3).await.unwrap().unwrap();
        assert_eq!(after.quantity, 0);
        assert!(!after.in_stock);
    }

    #[tokio::test]
    async fn reserve_refuses_oversized_request_without_side_effects() {
        let (repo, id) = repo_with_product(2).await;

        assert!(repo.reserve(&id, 3).await.unwrap().is_none());

        let product = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(product.quantity, 2);
        assert!(product.in_stock);
    }

    #[tokio::test]
    async fn reserve_on_missing_product_is_none() {
        let db = DbService::memory().await.unwrap().db;
        let repo = ProductRepository::new(db);
        assert!(repo.reserve("product:nope", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reserve_rejects_non_positive_quantity() {
        let (repo, id) = repo_with_product(2).await;
        assert!(repo.reserve(&id, 0).await.is_err());
    }
}
