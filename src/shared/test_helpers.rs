#![cfg(test)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::core::error::{AppError, Result};
use crate::features::cities::models::{City, CityFields, CityWithRegion};
use crate::features::cities::repositories::CityRepository;
use crate::features::cities::{self, CityService};
use crate::features::regions::models::Region;
use crate::features::regions::repositories::RegionRepository;
use crate::features::regions::{self, RegionService};
use crate::modules::storage::ImageStore;

pub const TEST_MAX_UPLOAD_SIZE: usize = 1024 * 1024;

#[derive(Default)]
struct Tables {
    regions: BTreeMap<i32, Region>,
    cities: BTreeMap<i32, City>,
    next_region_id: i32,
    next_city_id: i32,
}

/// In-memory stand-in for both tables, including the `cities.region_id`
/// foreign key. Writes naming an unknown region surface as database errors,
/// and deleting a region cascades to its cities, like Postgres would.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
}

fn foreign_key_violation(detail: &str) -> AppError {
    AppError::Database(sqlx::Error::Protocol(format!(
        "foreign key violation: {}",
        detail
    )))
}

impl Tables {
    fn joined(&self, city: &City) -> CityWithRegion {
        CityWithRegion {
            city: city.clone(),
            region_name: self
                .regions
                .get(&city.region_id)
                .map(|r| r.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn city_from(id: i32, fields: &CityFields) -> City {
    City {
        id,
        name: fields.name.clone(),
        region_id: fields.region_id,
        distance_to_moscow: fields.distance_to_moscow,
        population: fields.population,
        image_path: fields.image_path.clone(),
        latitude: fields.latitude,
        longitude: fields.longitude,
    }
}

#[async_trait]
impl RegionRepository for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<Region>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.regions.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Region>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.regions.get(&id).cloned())
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.regions.contains_key(&id))
    }

    async fn insert(&self, name: &str) -> Result<Region> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_region_id += 1;
        let region = Region {
            id: tables.next_region_id,
            name: name.to_string(),
        };
        tables.regions.insert(region.id, region.clone());
        Ok(region)
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Region>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.regions.get_mut(&id).map(|region| {
            region.name = name.to_string();
            region.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        if tables.regions.remove(&id).is_none() {
            return Ok(0);
        }
        // ON DELETE CASCADE
        tables.cities.retain(|_, c| c.region_id != id);
        Ok(1)
    }
}

#[async_trait]
impl CityRepository for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<CityWithRegion>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.cities.values().map(|c| tables.joined(c)).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CityWithRegion>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.cities.get(&id).map(|c| tables.joined(c)))
    }

    async fn insert(&self, fields: &CityFields) -> Result<City> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.regions.contains_key(&fields.region_id) {
            return Err(foreign_key_violation("unknown region_id"));
        }
        tables.next_city_id += 1;
        let city = city_from(tables.next_city_id, fields);
        tables.cities.insert(city.id, city.clone());
        Ok(city)
    }

    async fn update(&self, id: i32, fields: &CityFields) -> Result<Option<City>> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.cities.contains_key(&id) {
            return Ok(None);
        }
        if !tables.regions.contains_key(&fields.region_id) {
            return Err(foreign_key_violation("unknown region_id"));
        }
        let city = city_from(id, fields);
        tables.cities.insert(id, city.clone());
        Ok(Some(city))
    }

    async fn delete(&self, id: i32) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.cities.remove(&id).map_or(0, |_| 1))
    }

    async fn find_image_path(&self, id: i32) -> Result<Option<Option<String>>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.cities.get(&id).map(|c| c.image_path.clone()))
    }

    async fn set_image_path(&self, id: i32, path: &str) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.cities.get_mut(&id).map_or(0, |city| {
            city.image_path = Some(path.to_string());
            1
        }))
    }
}

pub struct TestServices {
    pub regions: Arc<RegionService>,
    pub cities: Arc<CityService>,
}

/// Both services sharing one in-memory database, with images under `upload_dir`
pub fn in_memory_services(upload_dir: &Path) -> TestServices {
    let db = Arc::new(InMemoryDatabase::default());
    let images = Arc::new(ImageStore::new(upload_dir));

    TestServices {
        regions: Arc::new(RegionService::new(db.clone())),
        cities: Arc::new(CityService::new(db.clone(), db, images)),
    }
}

/// The full HTTP surface over in-memory storage
pub fn test_router(upload_dir: &Path) -> Router {
    let services = in_memory_services(upload_dir);

    Router::new()
        .merge(regions::routes::routes(services.regions))
        .merge(cities::routes::routes(
            services.cities,
            TEST_MAX_UPLOAD_SIZE,
        ))
}
