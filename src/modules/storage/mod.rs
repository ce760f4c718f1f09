//! Storage module for uploaded city images
//!
//! Provides a filesystem-backed store that writes, reads and removes
//! image files referenced by path from the `cities` table.

mod image_store;

pub use image_store::{ImageStore, StoredImage};
