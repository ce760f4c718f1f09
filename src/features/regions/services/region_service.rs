use std::sync::Arc;

use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::regions::dtos::{RegionRequestDto, RegionResponseDto};
use crate::features::regions::repositories::RegionRepository;
use crate::shared::validation::validate_dto;

/// Service for region CRUD
pub struct RegionService {
    repository: Arc<dyn RegionRepository>,
}

impl RegionService {
    pub fn new(repository: Arc<dyn RegionRepository>) -> Self {
        Self { repository }
    }

    /// List all regions in storage order
    pub async fn list(&self) -> Result<Vec<RegionResponseDto>> {
        let regions = self.repository.list().await?;
        Ok(regions.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, dto: RegionRequestDto) -> Result<RegionResponseDto> {
        validate_dto(&dto)?;

        let region = self.repository.insert(&dto.name).await?;
        info!("Region created: id={}, name={}", region.id, region.name);

        Ok(region.into())
    }

    pub async fn get(&self, id: i32) -> Result<RegionResponseDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(region_not_found)
    }

    /// Replace the region name
    pub async fn update(&self, id: i32, dto: RegionRequestDto) -> Result<RegionResponseDto> {
        validate_dto(&dto)?;

        let region = self
            .repository
            .update(id, &dto.name)
            .await?
            .ok_or_else(region_not_found)?;
        info!("Region updated: id={}, name={}", region.id, region.name);

        Ok(region.into())
    }

    /// Delete a region. Its cities are removed with it by the
    /// `ON DELETE CASCADE` on `cities.region_id`; their image files stay on disk.
    pub async fn delete(&self, id: i32) -> Result<()> {
        if self.repository.delete(id).await? == 0 {
            return Err(region_not_found());
        }

        info!("Region deleted: id={}", id);
        Ok(())
    }
}

fn region_not_found() -> AppError {
    AppError::NotFound("Region not found".to_string())
}
