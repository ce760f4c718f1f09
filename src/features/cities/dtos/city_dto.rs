use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::cities::models::{City, CityWithRegion};

/// Response DTO for a city row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CityResponseDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Novosibirsk")]
    pub name: String,
    #[schema(example = 1)]
    pub region_id: i32,
    /// Great-circle distance to Moscow in kilometers
    #[schema(example = 2812.56)]
    pub distance_to_moscow: f64,
    #[schema(example = 1600000)]
    pub population: i64,
    /// Path of the stored image, if one was uploaded
    pub image_path: Option<String>,
    #[schema(example = 55.0084)]
    pub latitude: f64,
    #[schema(example = 82.9357)]
    pub longitude: f64,
}

impl From<City> for CityResponseDto {
    fn from(c: City) -> Self {
        Self {
            id: c.id,
            name: c.name,
            region_id: c.region_id,
            distance_to_moscow: c.distance_to_moscow,
            population: c.population,
            image_path: c.image_path,
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

/// Response DTO for a city together with its region name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CityWithRegionDto {
    pub id: i32,
    pub name: String,
    pub region_id: i32,
    pub distance_to_moscow: f64,
    pub population: i64,
    pub image_path: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[schema(example = "Siberia")]
    pub region_name: String,
}

impl From<CityWithRegion> for CityWithRegionDto {
    fn from(row: CityWithRegion) -> Self {
        let c = row.city;
        Self {
            id: c.id,
            name: c.name,
            region_id: c.region_id,
            distance_to_moscow: c.distance_to_moscow,
            population: c.population,
            image_path: c.image_path,
            latitude: c.latitude,
            longitude: c.longitude,
            region_name: row.region_name,
        }
    }
}

/// Binary image received in a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Input for city creation, assembled from the multipart form
#[derive(Debug, Clone, Default)]
pub struct CreateCityDto {
    pub name: String,
    pub region_id: i32,
    pub population: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<ImageUpload>,
}

/// Full replacement of a city. `distance_to_moscow` is taken as given.
///
/// Missing fields deserialize to their zero value so they are reported by the
/// service's field checks rather than as a JSON error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateCityDto {
    #[schema(example = "Novosibirsk")]
    pub name: String,
    #[schema(example = 1)]
    pub region_id: i32,
    #[schema(example = 2812.56)]
    pub distance_to_moscow: f64,
    #[schema(example = 1600000)]
    pub population: i64,
    /// Keep the currently stored image path, or `null` to clear it
    pub image_path: Option<String>,
    #[schema(example = 55.0084)]
    pub latitude: f64,
    #[schema(example = 82.9357)]
    pub longitude: f64,
}

/// Create city form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateCityForm {
    #[schema(example = "Novosibirsk")]
    pub name: String,
    #[schema(example = 1)]
    pub region_id: i32,
    #[schema(example = 1600000)]
    pub population: i64,
    #[schema(example = 55.0084)]
    pub latitude: f64,
    #[schema(example = 82.9357)]
    pub longitude: f64,
    /// Optional image file
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Image upload form for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImageForm {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// Response DTO for a successful image upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadImageResponseDto {
    #[schema(example = "Image uploaded successfully")]
    pub message: String,
    #[schema(example = "/app/uploads/1_novosibirsk.jpg")]
    pub image_path: String,
}
