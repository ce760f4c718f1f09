use validator::Validate;

use crate::core::error::{AppError, Result};

/// Run `validator` rules on a DTO and report failures as a 400
pub fn validate_dto<T: Validate>(dto: &T) -> Result<()> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}
