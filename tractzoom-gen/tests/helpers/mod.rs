//! Test helpers for tractzoom-gen integration tests
//!
//! Builds synthetic tract inputs on disk:
//! - unit squares laid out on a grid, one per tract
//! - the matching score CSV
//! - a config pointing at both, writing into the same temp directory

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tractzoom_common::config::TomlConfig;

/// One synthetic tract: identifier, score, and lower-left corner of its square
#[derive(Debug, Clone)]
pub struct TractSpec {
    pub geoid: String,
    pub score: f64,
    pub x: f64,
    pub y: f64,
}

impl TractSpec {
    /// Exterior ring of the unit square, closed
    pub fn ring(&self) -> Value {
        let (x, y) = (self.x, self.y);
        json!([[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]])
    }

    pub fn geometry(&self) -> Value {
        json!({ "type": "Polygon", "coordinates": [self.ring()] })
    }
}

/// Tracts of one state on a grid `width` squares wide, starting at `origin`
pub fn grid_state(state: &str, scores: &[f64], width: usize, origin: (f64, f64)) -> Vec<TractSpec> {
    scores
        .iter()
        .enumerate()
        .map(|(i, score)| TractSpec {
            geoid: format!("{}{:09}", state, i),
            score: *score,
            x: origin.0 + (i % width) as f64,
            y: origin.1 + (i / width) as f64,
        })
        .collect()
}

/// `count` scores spread evenly over [0, 1], visited in a scrambled order
/// so neighbouring squares rarely share a bucket
pub fn scrambled_uniform_scores(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| ((i * 37) % count) as f64 / (count - 1) as f64)
        .collect()
}

/// Synthetic inputs and config in a temp directory
pub struct Fixture {
    pub dir: TempDir,
    pub config: TomlConfig,
}

impl Fixture {
    pub fn new(tracts: &[TractSpec]) -> Self {
        Self::with_geometry(tracts, tracts)
    }

    /// Score rows for `scored`, boundaries only for `bounded`
    pub fn with_geometry(scored: &[TractSpec], bounded: &[TractSpec]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let score_csv = dir.path().join("usa.csv");
        write_score_csv(&score_csv, scored);

        let census_geojson = dir.path().join("us.json");
        write_census_geojson(&census_geojson, bounded);

        let config = TomlConfig {
            score_csv,
            census_geojson,
            output_dir: dir.path().join("out"),
            ..TomlConfig::default()
        };

        Self { dir, config }
    }

    pub fn read_output(&self, path: &Path) -> Value {
        let text = std::fs::read_to_string(path).expect("Failed to read output layer");
        serde_json::from_str(&text).expect("Output layer is not JSON")
    }

    pub fn high_zoom(&self) -> Value {
        self.read_output(&self.config.high_zoom_path())
    }

    pub fn low_zoom(&self) -> Value {
        self.read_output(&self.config.low_zoom_path())
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn write_score_csv(path: &Path, tracts: &[TractSpec]) {
    let mut text = String::from("GTF,P_IND,SM_C\n");
    for tract in tracts {
        text.push_str(&format!("{},{},True\n", tract.geoid, tract.score));
    }
    std::fs::write(path, text).expect("Failed to write score CSV");
}

pub fn write_census_geojson(path: &Path, tracts: &[TractSpec]) {
    let features: Vec<Value> = tracts
        .iter()
        .map(|t| {
            json!({
                "type": "Feature",
                "properties": { "GEOID10": t.geoid, "ALAND10": 1000.0 },
                "geometry": t.geometry(),
            })
        })
        .collect();
    let collection = json!({ "type": "FeatureCollection", "features": features });
    std::fs::write(path, collection.to_string()).expect("Failed to write census GeoJSON");
}

/// Features of a collection whose identifier starts with `state`
pub fn features_of_state<'a>(collection: &'a Value, state: &str) -> Vec<&'a Value> {
    collection["features"]
        .as_array()
        .expect("features array")
        .iter()
        .filter(|f| {
            f["properties"]["GEOID10"]
                .as_str()
                .map(|id| id.starts_with(state))
                .unwrap_or(false)
        })
        .collect()
}
