//! Cities feature.
//!
//! Cities belong to a region and carry a population, coordinates and the
//! great-circle distance to Moscow, computed on creation. Each city may have
//! one image stored on the local filesystem.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/cities` | List cities with region names |
//! | POST | `/cities` | Create a city (multipart form, optional image) |
//! | GET | `/cities/{id}` | Get city by id |
//! | PUT | `/cities/{id}` | Replace a city (JSON) |
//! | DELETE | `/cities/{id}` | Delete a city and its image |
//! | POST | `/cities/{id}/upload-image` | Upload or replace the city image |
//! | GET | `/images/{id}` | Download the city image |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgCityRepository;
pub use services::CityService;
