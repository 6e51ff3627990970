//! tractzoom-gen library - map tile layer generation
//!
//! Turns a per-tract score table and the matching tract boundaries into two
//! GeoJSON layers:
//! - high zoom: one feature per tract, scores untouched
//! - low zoom: tracts dissolved into score buckets and split back into
//!   single polygons, except in states with few tracts, which keep their
//!   tracts as-is

pub mod aggregate;
pub mod algebra;
pub mod buckets;
pub mod compose;
pub mod explode;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod writer;

pub use crate::algebra::{GeoAlgebra, PolygonAlgebra};
pub use crate::models::Tract;
pub use crate::pipeline::{TransformSummary, ZoomLayerEtl, ZoomLayers};
