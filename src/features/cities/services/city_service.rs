use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::cities::dtos::{
    CityResponseDto, CityWithRegionDto, CreateCityDto, ImageUpload, UpdateCityDto,
    UploadImageResponseDto,
};
use crate::features::cities::models::CityFields;
use crate::features::cities::repositories::CityRepository;
use crate::features::regions::repositories::RegionRepository;
use crate::modules::storage::{ImageStore, StoredImage};
use crate::shared::geo::distance_to_moscow_km;

/// Service for city CRUD and city images
pub struct CityService {
    cities: Arc<dyn CityRepository>,
    regions: Arc<dyn RegionRepository>,
    images: Arc<ImageStore>,
}

impl CityService {
    pub fn new(
        cities: Arc<dyn CityRepository>,
        regions: Arc<dyn RegionRepository>,
        images: Arc<ImageStore>,
    ) -> Self {
        Self {
            cities,
            regions,
            images,
        }
    }

    /// List all cities with their region name
    pub async fn list(&self) -> Result<Vec<CityWithRegionDto>> {
        let cities = self.cities.list().await?;
        Ok(cities.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: i32) -> Result<CityWithRegionDto> {
        self.cities
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(city_not_found)
    }

    /// Create a city, storing the optional image and computing the distance
    /// to Moscow from the coordinates.
    ///
    /// The region existence check and the insert are separate statements; a
    /// region deleted in between makes the insert fail on the foreign key.
    pub async fn create(&self, dto: CreateCityDto) -> Result<CityResponseDto> {
        validate_name(&dto.name)?;
        self.ensure_region_exists(dto.region_id).await?;
        validate_population(dto.population)?;

        let image_path = match &dto.image {
            Some(image) => Some(
                self.images
                    .store_timestamped(&image.file_name, &image.data)
                    .await?,
            ),
            None => None,
        };

        let fields = CityFields {
            name: dto.name,
            region_id: dto.region_id,
            distance_to_moscow: distance_to_moscow_km(dto.latitude, dto.longitude),
            population: dto.population,
            image_path,
            latitude: dto.latitude,
            longitude: dto.longitude,
        };

        let city = match self.cities.insert(&fields).await {
            Ok(city) => city,
            Err(e) => {
                if let Some(path) = &fields.image_path {
                    self.images.remove(path).await;
                }
                return Err(e);
            }
        };

        info!(
            "City created: id={}, name={}, region_id={}, distance_to_moscow={:.1}",
            city.id, city.name, city.region_id, city.distance_to_moscow
        );

        Ok(city.into())
    }

    /// Replace every mutable field of a city.
    ///
    /// `distance_to_moscow` is stored as supplied and not recomputed from the
    /// coordinates. `image_path` may only keep a stored image or clear it.
    pub async fn update(&self, id: i32, dto: UpdateCityDto) -> Result<CityResponseDto> {
        validate_name(&dto.name)?;
        self.ensure_region_exists(dto.region_id).await?;
        if dto.distance_to_moscow < 0.0 {
            return Err(AppError::Validation(
                "Distance to Moscow cannot be negative".to_string(),
            ));
        }
        validate_population(dto.population)?;

        if let Some(path) = &dto.image_path {
            if !self.images.contains(path) {
                return Err(AppError::Validation(
                    "Image path must reference an uploaded image".to_string(),
                ));
            }
        }

        let fields = CityFields {
            name: dto.name,
            region_id: dto.region_id,
            distance_to_moscow: dto.distance_to_moscow,
            population: dto.population,
            image_path: dto.image_path,
            latitude: dto.latitude,
            longitude: dto.longitude,
        };

        let city = self
            .cities
            .update(id, &fields)
            .await?
            .ok_or_else(city_not_found)?;
        info!("City updated: id={}, name={}", city.id, city.name);

        Ok(city.into())
    }

    /// Delete a city and, best-effort, its image file
    pub async fn delete(&self, id: i32) -> Result<()> {
        let image_path = match self.cities.find_image_path(id).await {
            Ok(path) => path.flatten(),
            Err(e) => {
                warn!("Could not look up image for city {}: {}", id, e);
                None
            }
        };

        if self.cities.delete(id).await? == 0 {
            return Err(city_not_found());
        }
        info!("City deleted: id={}", id);

        if let Some(path) = image_path {
            self.images.remove(&path).await;
        }

        Ok(())
    }

    /// Store an image for an existing city and record its path.
    ///
    /// A previously stored file under a different name is removed afterwards.
    pub async fn upload_image(
        &self,
        id: i32,
        image: Option<ImageUpload>,
    ) -> Result<UploadImageResponseDto> {
        let image =
            image.ok_or_else(|| AppError::Validation("No image file uploaded".to_string()))?;

        let previous = self
            .cities
            .find_image_path(id)
            .await?
            .ok_or_else(city_not_found)?;

        let path = self
            .images
            .store_for_city(id, &image.file_name, &image.data)
            .await?;

        if self.cities.set_image_path(id, &path).await? == 0 {
            // City removed between the lookup and the update
            self.images.remove(&path).await;
            return Err(city_not_found());
        }
        info!("City image uploaded: id={}, path={}", id, path);

        if let Some(old) = previous.filter(|old| *old != path) {
            self.images.remove(&old).await;
        }

        Ok(UploadImageResponseDto {
            message: "Image uploaded successfully".to_string(),
            image_path: path,
        })
    }

    /// Read the stored image of a city.
    ///
    /// A city without an image is `NotFound`; a recorded file that cannot be
    /// read is a storage failure.
    pub async fn fetch_image(&self, id: i32) -> Result<StoredImage> {
        let path = self
            .cities
            .find_image_path(id)
            .await?
            .ok_or_else(city_not_found)?
            .ok_or_else(|| AppError::NotFound("No image available".to_string()))?;

        debug!("Serving image for city {}: {}", id, path);
        self.images.read(&path).await
    }

    async fn ensure_region_exists(&self, region_id: i32) -> Result<()> {
        if region_id <= 0 {
            return Err(AppError::Validation("Region ID is required".to_string()));
        }

        if !self.regions.exists(region_id).await? {
            return Err(AppError::NotFound("Region not found".to_string()));
        }

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::Validation("City name is required".to_string()));
    }
    Ok(())
}

fn validate_population(population: i64) -> Result<()> {
    match population {
        0 => Err(AppError::Validation(
            "Population cannot be zero".to_string(),
        )),
        p if p < 0 => Err(AppError::Validation(
            "Population cannot be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

fn city_not_found() -> AppError {
    AppError::NotFound("City not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::regions::dtos::RegionRequestDto;
    use crate::shared::geo::haversine_km;
    use crate::shared::test_helpers::{in_memory_services, TestServices};
    use std::path::Path;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    async fn region(services: &TestServices, name: &str) -> i32 {
        services
            .regions
            .create(RegionRequestDto {
                name: name.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn novosibirsk(region_id: i32) -> CreateCityDto {
        CreateCityDto {
            name: "Novosibirsk".to_string(),
            region_id,
            population: 1_600_000,
            latitude: 55.0084,
            longitude: 82.9357,
            image: None,
        }
    }

    fn png(name: &str) -> Option<ImageUpload> {
        Some(ImageUpload {
            file_name: name.to_string(),
            data: b"\x89PNG".to_vec(),
        })
    }

    fn update_from(city: &CityResponseDto) -> UpdateCityDto {
        UpdateCityDto {
            name: city.name.clone(),
            region_id: city.region_id,
            distance_to_moscow: city.distance_to_moscow,
            population: city.population,
            image_path: city.image_path.clone(),
            latitude: city.latitude,
            longitude: city.longitude,
        }
    }

    #[tokio::test]
    async fn test_siberia_scenario() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let siberia = region(&services, "Siberia").await;
        assert_eq!(siberia, 1);

        let city = services.cities.create(novosibirsk(siberia)).await.unwrap();
        assert!(city.id > 0);
        assert!((city.distance_to_moscow - 2813.0).abs() <= 5.0);

        services.regions.delete(siberia).await.unwrap();
        assert!(matches!(
            services.cities.get(city.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        let err = services
            .cities
            .create(CreateCityDto {
                name: "Tomsk".to_string(),
                ..novosibirsk(siberia)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Region not found"));
    }

    #[tokio::test]
    async fn test_distance_matches_haversine() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Anywhere").await;

        for &(lat, lon) in &[(59.9343, 30.3351), (43.1155, 131.8855), (-33.8688, 151.2093)] {
            let city = services
                .cities
                .create(CreateCityDto {
                    latitude: lat,
                    longitude: lon,
                    ..novosibirsk(region_id)
                })
                .await
                .unwrap();

            let expected = haversine_km(55.7558, 37.6173, lat, lon);
            assert!((city.distance_to_moscow - expected).abs() <= expected * 1e-6);
        }
    }

    #[tokio::test]
    async fn test_create_with_missing_region_persists_nothing() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());

        let err = services.cities.create(novosibirsk(7)).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(services.cities.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_validation_order() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());

        let nameless = CreateCityDto {
            name: String::new(),
            region_id: 0,
            population: 0,
            ..Default::default()
        };
        let err = services.cities.create(nameless).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "City name is required"));

        let no_region = CreateCityDto {
            region_id: 0,
            ..novosibirsk(0)
        };
        let err = services.cities.create(no_region).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Region ID is required"));

        // A missing region is reported before a bad population
        let err = services
            .cities
            .create(CreateCityDto {
                population: 0,
                ..novosibirsk(5)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_population_boundary() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;

        let err = services
            .cities
            .create(CreateCityDto {
                population: 0,
                ..novosibirsk(region_id)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let city = services
            .cities
            .create(CreateCityDto {
                population: 1,
                ..novosibirsk(region_id)
            })
            .await
            .unwrap();
        assert_eq!(city.population, 1);
    }

    #[tokio::test]
    async fn test_create_with_image_records_timestamped_path() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;

        let city = services
            .cities
            .create(CreateCityDto {
                image: png("novosibirsk.png"),
                ..novosibirsk(region_id)
            })
            .await
            .unwrap();

        let path = city.image_path.expect("image path recorded");
        assert!(path.ends_with("_novosibirsk.png"));
        assert!(Path::new(&path).exists());

        let fetched = services.cities.get(city.id).await.unwrap();
        assert_eq!(fetched.image_path.as_deref(), Some(path.as_str()));
        assert_eq!(fetched.region_name, "Siberia");
    }

    #[tokio::test]
    async fn test_update_keeps_given_distance() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services.cities.create(novosibirsk(region_id)).await.unwrap();

        let updated = services
            .cities
            .update(
                city.id,
                UpdateCityDto {
                    distance_to_moscow: 0.0,
                    latitude: 10.0,
                    ..update_from(&city)
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.distance_to_moscow, 0.0);
        assert_eq!(updated.latitude, 10.0);
    }

    #[tokio::test]
    async fn test_update_rejects_negative_distance() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services.cities.create(novosibirsk(region_id)).await.unwrap();

        let err = services
            .cities
            .update(
                city.id,
                UpdateCityDto {
                    distance_to_moscow: -0.5,
                    ..update_from(&city)
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        let stored = services.cities.get(city.id).await.unwrap();
        assert_eq!(stored.distance_to_moscow, city.distance_to_moscow);
    }

    #[tokio::test]
    async fn test_update_missing_city_and_region() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services.cities.create(novosibirsk(region_id)).await.unwrap();

        let err = services
            .cities
            .update(999, update_from(&city))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "City not found"));

        let err = services
            .cities
            .update(
                city.id,
                UpdateCityDto {
                    region_id: 999,
                    ..update_from(&city)
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Region not found"));
    }

    #[tokio::test]
    async fn test_update_image_path_keep_clear_and_reject_foreign() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services
            .cities
            .create(CreateCityDto {
                image: png("a.png"),
                ..novosibirsk(region_id)
            })
            .await
            .unwrap();

        let kept = assert_ok!(services.cities.update(city.id, update_from(&city)).await);
        assert_eq!(kept.image_path, city.image_path);

        let err = services
            .cities
            .update(
                city.id,
                UpdateCityDto {
                    image_path: Some("/etc/passwd".to_string()),
                    ..update_from(&city)
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let cleared = services
            .cities
            .update(
                city.id,
                UpdateCityDto {
                    image_path: None,
                    ..update_from(&city)
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.image_path, None);
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_image() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services
            .cities
            .create(CreateCityDto {
                image: png("gone.png"),
                ..novosibirsk(region_id)
            })
            .await
            .unwrap();
        let path = city.image_path.clone().unwrap();

        services.cities.delete(city.id).await.unwrap();

        assert!(!Path::new(&path).exists());
        assert!(matches!(
            services.cities.get(city.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_without_image_or_with_missing_file() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;

        let plain = services.cities.create(novosibirsk(region_id)).await.unwrap();
        assert_ok!(services.cities.delete(plain.id).await);

        let with_image = services
            .cities
            .create(CreateCityDto {
                image: png("x.png"),
                ..novosibirsk(region_id)
            })
            .await
            .unwrap();
        std::fs::remove_file(with_image.image_path.as_ref().unwrap()).unwrap();
        assert_ok!(services.cities.delete(with_image.id).await);

        assert!(matches!(
            services.cities.delete(with_image.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_upload_image_uses_city_id_prefix() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services.cities.create(novosibirsk(region_id)).await.unwrap();

        let uploaded = services
            .cities
            .upload_image(city.id, png("skyline.png"))
            .await
            .unwrap();

        assert_eq!(uploaded.message, "Image uploaded successfully");
        assert_eq!(
            uploaded.image_path,
            tmp.path()
                .join(format!("{}_skyline.png", city.id))
                .to_string_lossy()
        );

        let image = services.cities.fetch_image(city.id).await.unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.data, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_upload_image_replaces_previous_file() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services
            .cities
            .create(CreateCityDto {
                image: png("first.png"),
                ..novosibirsk(region_id)
            })
            .await
            .unwrap();
        let first = city.image_path.unwrap();

        let second = services
            .cities
            .upload_image(city.id, png("second.gif"))
            .await
            .unwrap()
            .image_path;

        assert!(!Path::new(&first).exists());
        assert!(Path::new(&second).exists());
        assert_eq!(
            services.cities.fetch_image(city.id).await.unwrap().content_type,
            "image/gif"
        );
    }

    #[tokio::test]
    async fn test_upload_image_errors() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services.cities.create(novosibirsk(region_id)).await.unwrap();

        let err = services.cities.upload_image(city.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = services
            .cities
            .upload_image(404, png("nobody.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!tmp.path().join("404_nobody.png").exists());
    }

    #[tokio::test]
    async fn test_fetch_image_failure_classes() {
        let tmp = TempDir::new().unwrap();
        let services = in_memory_services(tmp.path());
        let region_id = region(&services, "Siberia").await;
        let city = services.cities.create(novosibirsk(region_id)).await.unwrap();

        let err = services.cities.fetch_image(city.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "No image available"));

        let err = services.cities.fetch_image(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "City not found"));

        let path = services
            .cities
            .upload_image(city.id, png("deleted.png"))
            .await
            .unwrap()
            .image_path;
        std::fs::remove_file(path).unwrap();

        let err = services.cities.fetch_image(city.id).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
