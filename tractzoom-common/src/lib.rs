//! # tractzoom Common Library
//!
//! Shared code for the tractzoom tile layer generator:
//! - Error types
//! - Configuration loading
//! - GeoJSON feature collection model

pub mod config;
pub mod error;
pub mod geojson;

pub use error::{Error, Result};
