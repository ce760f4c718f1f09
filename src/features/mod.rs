pub mod cities;
pub mod regions;
