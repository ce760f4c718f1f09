use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::cities::models::{City, CityFields, CityWithRegion};

const CITY_COLUMNS: &str =
    "id, name, region_id, distance_to_moscow, population, image_path, latitude, longitude";

const CITY_WITH_REGION_SELECT: &str = r#"
    SELECT c.id, c.name, c.region_id, c.distance_to_moscow, c.population,
           c.image_path, c.latitude, c.longitude, r.name AS region_name
    FROM cities c
    JOIN regions r ON c.region_id = r.id
"#;

/// Persistence for the `cities` table
#[async_trait]
pub trait CityRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<CityWithRegion>>;
    async fn find_by_id(&self, id: i32) -> Result<Option<CityWithRegion>>;
    async fn insert(&self, fields: &CityFields) -> Result<City>;
    /// Full replace of every mutable column. `None` when no row has the id.
    async fn update(&self, id: i32, fields: &CityFields) -> Result<Option<City>>;
    /// Returns the number of deleted rows
    async fn delete(&self, id: i32) -> Result<u64>;
    /// `None` when the city does not exist, `Some(None)` when it has no image
    async fn find_image_path(&self, id: i32) -> Result<Option<Option<String>>>;
    /// Returns the number of updated rows
    async fn set_image_path(&self, id: i32, path: &str) -> Result<u64>;
}

pub struct PgCityRepository {
    pool: PgPool,
}

impl PgCityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CityRepository for PgCityRepository {
    async fn list(&self) -> Result<Vec<CityWithRegion>> {
        sqlx::query_as::<_, CityWithRegion>(CITY_WITH_REGION_SELECT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list cities: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CityWithRegion>> {
        let sql = format!("{} WHERE c.id = $1", CITY_WITH_REGION_SELECT);

        sqlx::query_as::<_, CityWithRegion>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch city {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn insert(&self, fields: &CityFields) -> Result<City> {
        let sql = format!(
            r#"
            INSERT INTO cities (name, region_id, distance_to_moscow, population, image_path, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CITY_COLUMNS
        );

        sqlx::query_as::<_, City>(&sql)
            .bind(&fields.name)
            .bind(fields.region_id)
            .bind(fields.distance_to_moscow)
            .bind(fields.population)
            .bind(&fields.image_path)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert city: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update(&self, id: i32, fields: &CityFields) -> Result<Option<City>> {
        let sql = format!(
            r#"
            UPDATE cities
            SET name = $1, region_id = $2, distance_to_moscow = $3, population = $4,
                image_path = $5, latitude = $6, longitude = $7
            WHERE id = $8
            RETURNING {}
            "#,
            CITY_COLUMNS
        );

        sqlx::query_as::<_, City>(&sql)
            .bind(&fields.name)
            .bind(fields.region_id)
            .bind(fields.distance_to_moscow)
            .bind(fields.population)
            .bind(&fields.image_path)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update city {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn delete(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete city {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn find_image_path(&self, id: i32) -> Result<Option<Option<String>>> {
        sqlx::query_scalar::<_, Option<String>>("SELECT image_path FROM cities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch image path for city {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn set_image_path(&self, id: i32, path: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE cities SET image_path = $1 WHERE id = $2")
            .bind(path)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to set image path for city {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }
}
