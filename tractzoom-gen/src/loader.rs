//! Score and geometry loading
//!
//! Joins the score table (CSV) to the census tract boundaries (GeoJSON) by
//! tract identifier. The join is driven by the score table: its row order is
//! the tract order for the rest of the run. Tracts that end up without a
//! usable geometry or score are dropped and reported, not fatal.

use crate::models::{is_empty_geometry, Tract, STATE_CODE_LEN};
use geo::Geometry;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};
use tractzoom_common::config::FieldNames;
use tractzoom_common::geojson::{read_feature_collection, FeatureCollection};
use tractzoom_common::{Error, Result};

/// Number of dropped identifiers quoted in the load report
const SAMPLE_SIZE: usize = 5;

/// One row of the score table
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub geoid: String,
    /// `None` when the cell is empty, unparsable, or not finite
    pub score: Option<f64>,
}

/// Boundaries with positive land area, keyed by tract identifier
#[derive(Debug, Default)]
pub struct GeometryIndex {
    /// `None` for features whose geometry is null
    pub geometries: HashMap<String, Option<Geometry<f64>>>,
    /// Features discarded for non-positive land area
    pub non_positive_land: usize,
}

/// Counts of what the join kept and dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub score_rows: usize,
    pub geometry_rows: usize,
    pub non_positive_land: usize,
    /// Identifiers whose geometry failed to join, in score table order
    pub missing_geometry: Vec<String>,
    /// Identifiers dropped for a missing or non-finite score
    pub invalid_score: Vec<String>,
}

impl LoadReport {
    /// Log the dropped tracts with a short sample of identifiers
    pub fn log(&self) {
        if !self.missing_geometry.is_empty() {
            warn!(
                "Dropping {} tracts with null geometry. Example: {:?}",
                self.missing_geometry.len(),
                sample(&self.missing_geometry)
            );
        }
        if !self.invalid_score.is_empty() {
            warn!(
                "Dropping {} tracts without a finite score. Example: {:?}",
                self.invalid_score.len(),
                sample(&self.invalid_score)
            );
        }
    }
}

fn sample(ids: &[String]) -> &[String] {
    &ids[..ids.len().min(SAMPLE_SIZE)]
}

/// Joined tracts plus the report of what was dropped
#[derive(Debug)]
pub struct LoadedTracts {
    pub tracts: Vec<Tract>,
    pub report: LoadReport,
}

/// Read score rows from CSV
///
/// Identifiers are kept as text so leading zeros survive.
pub fn parse_score_table<R: Read>(reader: R, fields: &FieldNames) -> Result<Vec<ScoreRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Schema(format!("score table has no '{}' column", name)))
    };
    let id_column = column(&fields.score_tract_field)?;
    let score_column = column(&fields.score_field)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let geoid = record.get(id_column).unwrap_or("").trim().to_string();
        let score = record
            .get(score_column)
            .and_then(|cell| cell.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite());
        rows.push(ScoreRow { geoid, score });
    }
    Ok(rows)
}

/// Index boundaries by identifier, discarding non-positive land area
pub fn index_geometries(collection: FeatureCollection, fields: &FieldNames) -> Result<GeometryIndex> {
    let mut index = GeometryIndex::default();
    let mut seen = HashSet::new();

    for (position, feature) in collection.features.into_iter().enumerate() {
        let geoid = match feature.properties.get(&fields.geoid_field) {
            Some(Value::String(id)) => id.trim().to_string(),
            Some(other) => {
                return Err(Error::Schema(format!(
                    "feature {}: '{}' must be a string, got {}",
                    position, fields.geoid_field, other
                )))
            }
            None => {
                return Err(Error::Schema(format!(
                    "feature {} has no '{}' property",
                    position, fields.geoid_field
                )))
            }
        };

        if !seen.insert(geoid.clone()) {
            return Err(Error::DataIntegrity(format!(
                "duplicate tract {} in geometry table",
                geoid
            )));
        }

        let land = match feature.properties.get(&fields.land_field) {
            Some(value) => value.as_f64().ok_or_else(|| {
                Error::Schema(format!(
                    "tract {}: '{}' must be numeric, got {}",
                    geoid, fields.land_field, value
                ))
            })?,
            None => {
                return Err(Error::Schema(format!(
                    "tract {} has no '{}' property",
                    geoid, fields.land_field
                )))
            }
        };

        // We only want to keep tracts to visualize that have non-0 land
        if land <= 0.0 {
            index.non_positive_land += 1;
            continue;
        }

        let geometry = feature.geometry.as_ref().map(|g| g.to_geo()).transpose()?;
        index.geometries.insert(geoid, geometry);
    }

    Ok(index)
}

/// Left join score rows into the geometry index
pub fn join_tracts(rows: Vec<ScoreRow>, index: &GeometryIndex) -> Result<LoadedTracts> {
    let mut report = LoadReport {
        score_rows: rows.len(),
        geometry_rows: index.geometries.len() + index.non_positive_land,
        non_positive_land: index.non_positive_land,
        ..LoadReport::default()
    };
    let mut seen = HashSet::new();
    let mut tracts = Vec::with_capacity(rows.len());

    for row in rows {
        if row.geoid.get(..STATE_CODE_LEN).is_none() {
            return Err(Error::DataIntegrity(format!(
                "tract identifier '{}' has no {}-character state prefix",
                row.geoid, STATE_CODE_LEN
            )));
        }
        if !seen.insert(row.geoid.clone()) {
            return Err(Error::DataIntegrity(format!(
                "duplicate tract {} in score table",
                row.geoid
            )));
        }

        let geometry = match index.geometries.get(&row.geoid) {
            Some(Some(geometry)) if !is_empty_geometry(geometry) => geometry.clone(),
            _ => {
                report.missing_geometry.push(row.geoid);
                continue;
            }
        };

        match row.score {
            Some(score) => tracts.push(Tract {
                geoid: row.geoid,
                score,
                geometry,
            }),
            None => report.invalid_score.push(row.geoid),
        }
    }

    Ok(LoadedTracts { tracts, report })
}

/// Read both inputs from disk and join them
pub fn load_tracts(score_csv: &Path, census_geojson: &Path, fields: &FieldNames) -> Result<LoadedTracts> {
    info!("Reading US GeoJSON: {}", census_geojson.display());
    let collection = read_feature_collection(census_geojson)?;
    let index = index_geometries(collection, fields)?;

    info!("Reading tile score CSV: {}", score_csv.display());
    let file = std::fs::File::open(score_csv)?;
    let rows = parse_score_table(std::io::BufReader::new(file), fields)?;

    info!("Merging score CSV with US GeoJSON");
    let loaded = join_tracts(rows, &index)?;
    loaded.report.log();
    info!(
        "Joined {} of {} score rows ({} boundaries with no land area skipped)",
        loaded.tracts.len(),
        loaded.report.score_rows,
        loaded.report.non_positive_land
    );

    Ok(loaded)
}
