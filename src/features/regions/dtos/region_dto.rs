use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::regions::models::Region;

/// Response DTO for region data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionResponseDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Siberia")]
    pub name: String,
}

impl From<Region> for RegionResponseDto {
    fn from(region: Region) -> Self {
        Self {
            id: region.id,
            name: region.name,
        }
    }
}

/// Request body for creating or replacing a region
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegionRequestDto {
    /// A missing name deserializes as empty and is rejected by validation
    #[serde(default)]
    #[validate(length(min = 1, message = "Region name is required"))]
    #[schema(example = "Siberia")]
    pub name: String,
}
