use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::RepoError;
use crate::products::repo_types::Product;

/// Read-only product catalogue.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepoError>;
}

#[derive(Clone)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepoError> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, image, price, quantity, created_at
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
