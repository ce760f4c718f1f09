use utoipa::{Modify, OpenApi};

use crate::features::cities::{dtos as cities_dtos, handlers as cities_handlers};
use crate::features::regions::{dtos as regions_dtos, handlers as regions_handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Regions
        regions_handlers::list_regions,
        regions_handlers::create_region,
        regions_handlers::get_region,
        regions_handlers::update_region,
        regions_handlers::delete_region,
        // Cities
        cities_handlers::list_cities,
        cities_handlers::create_city,
        cities_handlers::get_city,
        cities_handlers::update_city,
        cities_handlers::delete_city,
        cities_handlers::upload_city_image,
        // Images
        cities_handlers::get_city_image,
    ),
    components(
        schemas(
            regions_dtos::RegionResponseDto,
            regions_dtos::RegionRequestDto,
            cities_dtos::CityResponseDto,
            cities_dtos::CityWithRegionDto,
            cities_dtos::UpdateCityDto,
            cities_dtos::CreateCityForm,
            cities_dtos::UploadImageForm,
            cities_dtos::UploadImageResponseDto,
        )
    ),
    tags(
        (name = "regions", description = "Region management"),
        (name = "cities", description = "City management and image upload"),
        (name = "images", description = "City image download"),
    )
)]
pub struct ApiDoc;

/// Overrides the generated info block with values from configuration
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
