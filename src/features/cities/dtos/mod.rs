pub mod city_dto;

pub use city_dto::{
    CityResponseDto, CityWithRegionDto, CreateCityDto, CreateCityForm, ImageUpload,
    UpdateCityDto, UploadImageForm, UploadImageResponseDto,
};
