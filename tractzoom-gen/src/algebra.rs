//! Polygon algebra used by the aggregation stages
//!
//! Bucketing and aggregation only need two operations: union of many
//! polygonal geometries into one, and decomposition of a multi-part result
//! back into its single-part polygons. Both sit behind [`PolygonAlgebra`] so
//! another geometry backend can replace the `geo` implementation without
//! touching the bucket logic.

use geo::{BooleanOps, Geometry, MultiPolygon, Polygon};
use tractzoom_common::{Error, Result};

/// Union and decomposition of polygonal geometries
pub trait PolygonAlgebra {
    /// Union (dissolve) the geometries into one, possibly multi-part, geometry
    fn dissolve(&self, geometries: &[&Geometry<f64>]) -> Result<MultiPolygon<f64>>;

    /// Split a geometry into its single-part polygons, in natural order
    fn explode(&self, geometry: MultiPolygon<f64>) -> Vec<Polygon<f64>>;
}

/// [`PolygonAlgebra`] on top of the `geo` crate's boolean operations
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoAlgebra;

impl PolygonAlgebra for GeoAlgebra {
    fn dissolve(&self, geometries: &[&Geometry<f64>]) -> Result<MultiPolygon<f64>> {
        let mut pieces = geometries
            .iter()
            .map(|g| to_multi_polygon(g))
            .collect::<Result<Vec<_>>>()?;

        // Pairwise rounds keep each union operand roughly the same size
        while pieces.len() > 1 {
            let mut merged = Vec::with_capacity(pieces.len().div_ceil(2));
            let mut iter = pieces.into_iter();
            while let Some(left) = iter.next() {
                match iter.next() {
                    Some(right) => merged.push(left.union(&right)),
                    None => merged.push(left),
                }
            }
            pieces = merged;
        }

        Ok(pieces.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new())))
    }

    fn explode(&self, geometry: MultiPolygon<f64>) -> Vec<Polygon<f64>> {
        geometry.0
    }
}

/// View a Polygon or MultiPolygon as a MultiPolygon
pub fn to_multi_polygon(geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon.clone()])),
        Geometry::MultiPolygon(multi) => Ok(multi.clone()),
        _ => Err(Error::DataIntegrity(
            "tract geometry must be Polygon or MultiPolygon".to_string(),
        )),
    }
}
