use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::regions::models::Region;

/// Persistence for the `regions` table
#[async_trait]
pub trait RegionRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Region>>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Region>>;
    async fn exists(&self, id: i32) -> Result<bool>;
    async fn insert(&self, name: &str) -> Result<Region>;
    /// Returns `None` when no row has the given id
    async fn update(&self, id: i32, name: &str) -> Result<Option<Region>>;
    /// Returns the number of deleted rows
    async fn delete(&self, id: i32) -> Result<u64>;
}

pub struct PgRegionRepository {
    pool: PgPool,
}

impl PgRegionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegionRepository for PgRegionRepository {
    async fn list(&self) -> Result<Vec<Region>> {
        sqlx::query_as::<_, Region>("SELECT id, name FROM regions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list regions: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Region>> {
        sqlx::query_as::<_, Region>("SELECT id, name FROM regions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch region {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM regions WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check region {} existence: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn insert(&self, name: &str) -> Result<Region> {
        sqlx::query_as::<_, Region>("INSERT INTO regions (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert region: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Region>> {
        sqlx::query_as::<_, Region>(
            "UPDATE regions SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update region {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM regions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete region {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }
}
