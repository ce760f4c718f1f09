//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for storage media outside the relational database.

pub mod storage;
