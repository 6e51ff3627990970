//! GeoJSON feature collection model
//!
//! Covers the subset of RFC 7946 the pipeline exchanges: feature collections
//! whose features carry a property map and a Polygon or MultiPolygon
//! geometry. Conversions to and from `geo` types live here so the rest of
//! the workspace only ever sees `geo::Geometry`.

use crate::{Error, Result};
use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Name of the geographic lon/lat reference all layers are written in
pub const CRS84_URN: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

/// GeoJSON `FeatureCollection`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,

    pub features: Vec<Feature>,
}

/// GeoJSON `Feature`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,

    #[serde(default)]
    pub properties: Map<String, Value>,

    /// `null` geometries are legal GeoJSON and surface as `None`
    pub geometry: Option<GeometryJson>,
}

/// Geometry object, tagged by its `type` member
///
/// Positions are (lon, lat) pairs; converting to `geo` rejects any other
/// arity so written layers reproduce their input exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryJson {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    /// Any other geometry type (Point, LineString, GeometryCollection, ...)
    #[serde(other)]
    Unsupported,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl FeatureCollection {
    /// Create a named collection in the CRS84 reference
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            kind: feature_collection_type(),
            name: Some(name.into()),
            crs: Some(json!({
                "type": "name",
                "properties": { "name": CRS84_URN }
            })),
            features,
        }
    }
}

impl Feature {
    pub fn new(properties: Map<String, Value>, geometry: GeometryJson) -> Self {
        Self {
            kind: feature_type(),
            properties,
            geometry: Some(geometry),
        }
    }
}

impl GeometryJson {
    /// Convert into a `geo` Polygon or MultiPolygon
    pub fn to_geo(&self) -> Result<Geometry<f64>> {
        match self {
            GeometryJson::Polygon { coordinates } => Ok(Geometry::Polygon(polygon_from_rings(coordinates)?)),
            GeometryJson::MultiPolygon { coordinates } => {
                let polygons = coordinates
                    .iter()
                    .map(|rings| polygon_from_rings(rings))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
            }
            GeometryJson::Unsupported => Err(Error::Schema(
                "geometry must be Polygon or MultiPolygon".to_string(),
            )),
        }
    }

    /// Build from a `geo` Polygon or MultiPolygon
    pub fn from_geo(geometry: &Geometry<f64>) -> Result<Self> {
        match geometry {
            Geometry::Polygon(polygon) => Ok(Self::from(polygon)),
            Geometry::MultiPolygon(multi) => Ok(Self::from(multi)),
            _ => Err(Error::Schema(
                "only Polygon and MultiPolygon geometries can be written".to_string(),
            )),
        }
    }
}

impl From<&Polygon<f64>> for GeometryJson {
    fn from(polygon: &Polygon<f64>) -> Self {
        GeometryJson::Polygon {
            coordinates: rings_of(polygon),
        }
    }
}

impl From<&MultiPolygon<f64>> for GeometryJson {
    fn from(multi: &MultiPolygon<f64>) -> Self {
        GeometryJson::MultiPolygon {
            coordinates: multi.0.iter().map(rings_of).collect(),
        }
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| ring_from_positions(ring));
    let exterior = rings
        .next()
        .ok_or_else(|| Error::Schema("polygon without exterior ring".to_string()))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y] => Ok(Coord { x: *x, y: *y }),
            other => Err(Error::Schema(format!(
                "position must have exactly two ordinates, got {}",
                other.len()
            ))),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn rings_of(polygon: &Polygon<f64>) -> Vec<Vec<Vec<f64>>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
        .collect()
}

/// Read a feature collection from a GeoJSON file
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a feature collection to a GeoJSON file, replacing any existing file
pub fn write_feature_collection(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, collection)?;
    writer.flush()?;
    Ok(())
}
