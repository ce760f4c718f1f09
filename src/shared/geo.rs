//! Great-circle distance helpers.

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Reference point every city's `distance_to_moscow` is measured against
pub const MOSCOW_LATITUDE: f64 = 55.7558;
pub const MOSCOW_LONGITUDE: f64 = 37.6173;

/// Haversine distance in kilometers between two latitude/longitude pairs (degrees)
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = lon2.to_radians() - lon1.to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn distance_to_moscow_km(latitude: f64, longitude: f64) -> f64 {
    haversine_km(MOSCOW_LATITUDE, MOSCOW_LONGITUDE, latitude, longitude)
}
