mod city;

pub use city::{City, CityFields, CityWithRegion};
