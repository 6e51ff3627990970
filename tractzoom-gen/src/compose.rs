//! Output layer composition
//!
//! The high zoom layer is every joined tract, untouched. The low zoom layer
//! is the exploded bucket parts followed by the tracts of states kept at high
//! zoom, both reduced to a score and a geometry, with the score rounded.

use crate::explode::ExplodedPart;
use crate::models::Tract;
use geo::Geometry;
use serde_json::{Map, Value};
use tractzoom_common::config::FieldNames;
use tractzoom_common::geojson::{Feature, FeatureCollection, GeometryJson};
use tractzoom_common::Result;

/// One low zoom record: score and geometry only
#[derive(Debug, Clone, PartialEq)]
pub struct LowZoomFeature {
    pub score: f64,
    pub geometry: Geometry<f64>,
}

/// Round to `decimals` places, exact halves to the even neighbour
pub fn round_score(score: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (score * factor).round_ties_even() / factor
}

/// Concatenate exploded parts and kept tracts into the low zoom layer
pub fn compose_low_zoom(parts: Vec<ExplodedPart>, kept: &[&Tract], decimals: u32) -> Vec<LowZoomFeature> {
    let exploded = parts.into_iter().map(|part| LowZoomFeature {
        score: round_score(part.score, decimals),
        geometry: Geometry::Polygon(part.polygon),
    });
    let kept = kept.iter().map(|tract| LowZoomFeature {
        score: round_score(tract.score, decimals),
        geometry: tract.geometry.clone(),
    });
    exploded.chain(kept).collect()
}

/// High zoom feature collection: identifier, unrounded score, geometry
pub fn high_zoom_collection(tracts: &[Tract], fields: &FieldNames, name: &str) -> Result<FeatureCollection> {
    let features = tracts
        .iter()
        .map(|tract| {
            let mut properties = Map::new();
            properties.insert(fields.geoid_field.clone(), Value::from(tract.geoid.clone()));
            properties.insert(fields.score_output_field.clone(), Value::from(tract.score));
            Ok(Feature::new(properties, GeometryJson::from_geo(&tract.geometry)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(FeatureCollection::new(name, features))
}

/// Low zoom feature collection: score and geometry
pub fn low_zoom_collection(
    features: &[LowZoomFeature],
    fields: &FieldNames,
    name: &str,
) -> Result<FeatureCollection> {
    let features = features
        .iter()
        .map(|feature| {
            let mut properties = Map::new();
            properties.insert(fields.score_output_field.clone(), Value::from(feature.score));
            Ok(Feature::new(properties, GeometryJson::from_geo(&feature.geometry)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(FeatureCollection::new(name, features))
}
