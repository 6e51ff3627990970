//! Output layer writer
//!
//! The two layers are independent artifacts, so they are written by two
//! blocking tasks running side by side. Both tasks always run to completion
//! and both outcomes are reported; a failure in one never hides the other.
//!
//! Each layer is first written next to its destination and renamed into
//! place once complete, so a failed write never leaves a truncated layer
//! under the final name.

use std::path::{Path, PathBuf};
use tracing::{error, info};
use tractzoom_common::geojson::{write_feature_collection, FeatureCollection};
use tractzoom_common::{Error, Result};

/// A finished layer and where it goes
#[derive(Debug, Clone)]
pub struct LayerWrite {
    /// Name used in log messages
    pub label: String,
    pub path: PathBuf,
    pub collection: FeatureCollection,
}

impl LayerWrite {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, collection: FeatureCollection) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            collection,
        }
    }
}

/// Write one layer, wrapping any failure with the destination path
pub fn write_layer(layer: &LayerWrite) -> Result<()> {
    info!(
        "Writing {} ({} features) to {}",
        layer.label,
        layer.collection.features.len(),
        layer.path.display()
    );

    write_atomically(&layer.path, &layer.collection).map_err(|e| Error::Write {
        path: layer.path.clone(),
        source: Box::new(e),
    })?;

    info!("Completed writing {}", layer.label);
    Ok(())
}

fn write_atomically(path: &Path, collection: &FeatureCollection) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            info!("Creating directory: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".partial");
    let staging = PathBuf::from(staging);

    if let Err(e) = write_feature_collection(&staging, collection) {
        // Best effort: the staging file may not exist
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(e.into());
    }
    Ok(())
}

/// Write both layers concurrently and wait for both
///
/// Returns the single error when one write fails, and
/// [`Error::WriteFailures`] when both do.
pub async fn write_layers(high: LayerWrite, low: LayerWrite) -> Result<()> {
    let high_path = high.path.clone();
    let low_path = low.path.clone();

    let high_task = tokio::task::spawn_blocking(move || write_layer(&high));
    let low_task = tokio::task::spawn_blocking(move || write_layer(&low));
    let (high_result, low_result) = tokio::join!(high_task, low_task);

    let mut failures = Vec::new();
    for (path, result) in [(high_path, high_result), (low_path, low_result)] {
        let outcome = result.unwrap_or_else(|join_error| {
            Err(Error::Write {
                path: path.clone(),
                source: Box::new(Error::Io(std::io::Error::other(join_error.to_string()))),
            })
        });
        if let Err(e) = outcome {
            error!("{}", e);
            failures.push(e);
        }
    }

    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0)),
        _ => Err(Error::WriteFailures(failures)),
    }
}
