use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{multipart_error, AppJson, PathId};
use crate::features::cities::dtos::{
    CityResponseDto, CityWithRegionDto, CreateCityDto, CreateCityForm, ImageUpload,
    UpdateCityDto, UploadImageForm, UploadImageResponseDto,
};
use crate::features::cities::services::CityService;

const MULTIPART_REQUIRED: &str =
    "Use POST method with multipart/form-data Content-Type for city creation with image";

/// List all cities with their region name
#[utoipa::path(
    get,
    path = "/cities",
    responses(
        (status = 200, description = "List of cities", body = Vec<CityWithRegionDto>),
        (status = 500, description = "Database error")
    ),
    tag = "cities"
)]
pub async fn list_cities(
    State(service): State<Arc<CityService>>,
) -> Result<Json<Vec<CityWithRegionDto>>> {
    let cities = service.list().await?;
    Ok(Json(cities))
}

/// Create a city
///
/// Accepts multipart/form-data with `name`, `region_id`, `population`,
/// `latitude`, `longitude` and an optional `image` file. The distance to
/// Moscow is computed from the coordinates.
#[utoipa::path(
    post,
    path = "/cities",
    request_body(
        content = CreateCityForm,
        content_type = "multipart/form-data",
        description = "City fields with an optional image file"
    ),
    responses(
        (status = 201, description = "City created", body = CityResponseDto),
        (status = 400, description = "Invalid form or field values"),
        (status = 404, description = "Region not found"),
        (status = 413, description = "Upload too large"),
        (status = 415, description = "Body is not multipart/form-data")
    ),
    tag = "cities"
)]
pub async fn create_city(
    State(service): State<Arc<CityService>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CityResponseDto>)> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected city creation body: {}", e);
        AppError::UnsupportedMediaType(MULTIPART_REQUIRED.to_string())
    })?;

    let mut dto = CreateCityDto::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                // A file input left empty is sent without a filename
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let data = field.bytes().await.map_err(multipart_error)?;
                dto.image = Some(ImageUpload {
                    file_name,
                    data: data.to_vec(),
                });
            }
            "name" | "region_id" | "population" | "latitude" | "longitude" => {
                let value = field.text().await.map_err(multipart_error)?;
                match name.as_str() {
                    "name" => dto.name = value,
                    "region_id" => dto.region_id = parse_form_number(&name, &value)?,
                    "population" => dto.population = parse_form_number(&name, &value)?,
                    "latitude" => dto.latitude = parse_form_coordinate(&name, &value)?,
                    _ => dto.longitude = parse_form_coordinate(&name, &value)?,
                }
            }
            other => debug!("Ignoring unknown form field: {}", other),
        }
    }

    let city = service.create(dto).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

/// Get a city by id
#[utoipa::path(
    get,
    path = "/cities/{id}",
    params(
        ("id" = u32, Path, description = "City id")
    ),
    responses(
        (status = 200, description = "City details", body = CityWithRegionDto),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "City not found")
    ),
    tag = "cities"
)]
pub async fn get_city(
    State(service): State<Arc<CityService>>,
    PathId(id): PathId,
) -> Result<Json<CityWithRegionDto>> {
    let city = service.get(id).await?;
    Ok(Json(city))
}

/// Replace a city
///
/// `distance_to_moscow` is stored as given and not recomputed.
#[utoipa::path(
    put,
    path = "/cities/{id}",
    params(
        ("id" = u32, Path, description = "City id")
    ),
    request_body = UpdateCityDto,
    responses(
        (status = 200, description = "City updated", body = CityResponseDto),
        (status = 400, description = "Invalid id, body or field values"),
        (status = 404, description = "City or region not found")
    ),
    tag = "cities"
)]
pub async fn update_city(
    State(service): State<Arc<CityService>>,
    PathId(id): PathId,
    AppJson(dto): AppJson<UpdateCityDto>,
) -> Result<Json<CityResponseDto>> {
    let city = service.update(id, dto).await?;
    Ok(Json(city))
}

/// Delete a city and its image
#[utoipa::path(
    delete,
    path = "/cities/{id}",
    params(
        ("id" = u32, Path, description = "City id")
    ),
    responses(
        (status = 204, description = "City deleted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "City not found")
    ),
    tag = "cities"
)]
pub async fn delete_city(
    State(service): State<Arc<CityService>>,
    PathId(id): PathId,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload or replace the image of a city
#[utoipa::path(
    post,
    path = "/cities/{id}/upload-image",
    params(
        ("id" = u32, Path, description = "City id")
    ),
    request_body(
        content = UploadImageForm,
        content_type = "multipart/form-data",
        description = "Image file in the `image` field"
    ),
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponseDto),
        (status = 400, description = "Invalid id, form or missing image"),
        (status = 404, description = "City not found"),
        (status = 413, description = "Upload too large")
    ),
    tag = "cities"
)]
pub async fn upload_city_image(
    State(service): State<Arc<CityService>>,
    PathId(id): PathId,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadImageResponseDto>> {
    let mut multipart =
        multipart.map_err(|e| AppError::BadRequest(format!("Unable to parse form: {}", e)))?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(multipart_error)?;
        image = Some(ImageUpload {
            file_name,
            data: data.to_vec(),
        });
    }

    let uploaded = service.upload_image(id, image).await?;
    Ok(Json(uploaded))
}

/// Fetch the stored image of a city
#[utoipa::path(
    get,
    path = "/images/{id}",
    params(
        ("id" = u32, Path, description = "City id")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "City not found or no image available"),
        (status = 500, description = "Stored file could not be read")
    ),
    tag = "images"
)]
pub async fn get_city_image(
    State(service): State<Arc<CityService>>,
    PathId(id): PathId,
) -> Result<Response> {
    let image = service.fetch_image(id).await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.data).into_response())
}

/// Parse a numeric form value. An empty value counts as zero and is left to
/// the service's field checks.
fn parse_form_number<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr + Default,
{
    let value = value.trim();
    if value.is_empty() {
        return Ok(T::default());
    }

    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, value)))
}

/// Parse a latitude or longitude. `NaN` and infinities parse as `f64` but
/// are not coordinates.
fn parse_form_coordinate(field: &str, value: &str) -> Result<f64> {
    let parsed: f64 = parse_form_number(field, value)?;
    if !parsed.is_finite() {
        return Err(AppError::BadRequest(format!(
            "Invalid {}: {}",
            field,
            value.trim()
        )));
    }
    Ok(parsed)
}
