mod city_repository;

pub use city_repository::{CityRepository, PgCityRepository};
