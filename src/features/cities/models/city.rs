use sqlx::FromRow;

/// Database model for city
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub region_id: i32,
    pub distance_to_moscow: f64,
    pub population: i64,
    pub image_path: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// City row joined with the name of its region
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CityWithRegion {
    #[sqlx(flatten)]
    pub city: City,
    pub region_name: String,
}

/// Every mutable column of a city, written as a whole on insert and update
#[derive(Debug, Clone, PartialEq)]
pub struct CityFields {
    pub name: String,
    pub region_id: i32,
    pub distance_to_moscow: f64,
    pub population: i64,
    pub image_path: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}
