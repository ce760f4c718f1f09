use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, PathId};
use crate::features::regions::dtos::{RegionRequestDto, RegionResponseDto};
use crate::features::regions::services::RegionService;

/// List all regions
#[utoipa::path(
    get,
    path = "/regions",
    responses(
        (status = 200, description = "List of regions", body = Vec<RegionResponseDto>),
        (status = 500, description = "Database error")
    ),
    tag = "regions"
)]
pub async fn list_regions(
    State(service): State<Arc<RegionService>>,
) -> Result<Json<Vec<RegionResponseDto>>> {
    let regions = service.list().await?;
    Ok(Json(regions))
}

/// Create a region
#[utoipa::path(
    post,
    path = "/regions",
    request_body = RegionRequestDto,
    responses(
        (status = 201, description = "Region created", body = RegionResponseDto),
        (status = 400, description = "Malformed body or empty name")
    ),
    tag = "regions"
)]
pub async fn create_region(
    State(service): State<Arc<RegionService>>,
    AppJson(dto): AppJson<RegionRequestDto>,
) -> Result<(StatusCode, Json<RegionResponseDto>)> {
    let region = service.create(dto).await?;
    Ok((StatusCode::CREATED, Json(region)))
}

/// Get a region by id
#[utoipa::path(
    get,
    path = "/regions/{id}",
    params(
        ("id" = u32, Path, description = "Region id")
    ),
    responses(
        (status = 200, description = "Region details", body = RegionResponseDto),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Region not found")
    ),
    tag = "regions"
)]
pub async fn get_region(
    State(service): State<Arc<RegionService>>,
    PathId(id): PathId,
) -> Result<Json<RegionResponseDto>> {
    let region = service.get(id).await?;
    Ok(Json(region))
}

/// Replace a region's name
#[utoipa::path(
    put,
    path = "/regions/{id}",
    params(
        ("id" = u32, Path, description = "Region id")
    ),
    request_body = RegionRequestDto,
    responses(
        (status = 200, description = "Region updated", body = RegionResponseDto),
        (status = 400, description = "Invalid id, malformed body or empty name"),
        (status = 404, description = "Region not found")
    ),
    tag = "regions"
)]
pub async fn update_region(
    State(service): State<Arc<RegionService>>,
    PathId(id): PathId,
    AppJson(dto): AppJson<RegionRequestDto>,
) -> Result<Json<RegionResponseDto>> {
    let region = service.update(id, dto).await?;
    Ok(Json(region))
}

/// Delete a region together with its cities
#[utoipa::path(
    delete,
    path = "/regions/{id}",
    params(
        ("id" = u32, Path, description = "Region id")
    ),
    responses(
        (status = 204, description = "Region deleted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Region not found")
    ),
    tag = "regions"
)]
pub async fn delete_region(
    State(service): State<Arc<RegionService>>,
    PathId(id): PathId,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
