//! Regions feature.
//!
//! Regions are named groupings that every city belongs to. A region cannot be
//! deleted while a city still references it.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/regions` | List all regions |
//! | POST | `/regions` | Create a region |
//! | GET | `/regions/{id}` | Get region by id |
//! | PUT | `/regions/{id}` | Rename a region |
//! | DELETE | `/regions/{id}` | Delete a region |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgRegionRepository;
pub use services::RegionService;
