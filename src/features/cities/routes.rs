use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::cities::handlers;
use crate::features::cities::services::CityService;

/// Headroom for the multipart framing and text fields around an image
const FORM_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the cities feature, including image download.
///
/// `max_upload_size` bounds the size of a single uploaded image.
pub fn routes(service: Arc<CityService>, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/cities",
            get(handlers::list_cities).post(handlers::create_city),
        )
        .route(
            "/cities/{id}",
            get(handlers::get_city)
                .put(handlers::update_city)
                .delete(handlers::delete_city),
        )
        .route(
            "/cities/{id}/upload-image",
            post(handlers::upload_city_image),
        )
        .route("/images/{id}", get(handlers::get_city_image))
        .layer(DefaultBodyLimit::max(max_upload_size + FORM_OVERHEAD))
        .with_state(service)
}
