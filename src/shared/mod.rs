pub mod geo;
pub mod test_helpers;
pub mod validation;
