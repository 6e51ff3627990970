//! Extract, transform, load orchestration
//!
//! `extract` joins the inputs, `transform` builds both layers in memory, and
//! `load` writes them. Every transform stage consumes its whole input before
//! the next one starts; any stage error aborts the run before output is
//! written.

use crate::aggregate::aggregate_buckets;
use crate::algebra::{GeoAlgebra, PolygonAlgebra};
use crate::buckets::{assign_buckets, BucketParams};
use crate::compose::{compose_low_zoom, high_zoom_collection, low_zoom_collection};
use crate::explode::explode_buckets;
use crate::loader::{load_tracts, LoadReport};
use crate::models::Tract;
use crate::writer::{write_layers, LayerWrite};
use tracing::{debug, info};
use tractzoom_common::config::TomlConfig;
use tractzoom_common::geojson::FeatureCollection;
use tractzoom_common::Result;

/// Both finished layers plus run statistics
#[derive(Debug, Clone)]
pub struct ZoomLayers {
    pub high: FeatureCollection,
    pub low: FeatureCollection,
    pub summary: TransformSummary,
}

/// Counts describing one transform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub tracts: usize,
    pub kept_high_zoom: usize,
    pub bucketed: usize,
    pub bucket_count: usize,
    pub refinement_iterations: usize,
    pub exploded_parts: usize,
    pub low_zoom_features: usize,
}

/// High and low zoom layer generator
pub struct ZoomLayerEtl<A: PolygonAlgebra = GeoAlgebra> {
    config: TomlConfig,
    algebra: A,
}

impl ZoomLayerEtl<GeoAlgebra> {
    pub fn new(config: TomlConfig) -> Self {
        Self::with_algebra(config, GeoAlgebra)
    }
}

impl<A: PolygonAlgebra> ZoomLayerEtl<A> {
    pub fn with_algebra(config: TomlConfig, algebra: A) -> Self {
        Self { config, algebra }
    }

    pub fn config(&self) -> &TomlConfig {
        &self.config
    }

    /// Load and join the score table and tract boundaries
    pub fn extract(&self) -> Result<(Vec<Tract>, LoadReport)> {
        let loaded = load_tracts(
            &self.config.score_csv,
            &self.config.census_geojson,
            &self.config.fields,
        )?;
        Ok((loaded.tracts, loaded.report))
    }

    /// Build the high and low zoom layers
    pub fn transform(&self, tracts: &[Tract]) -> Result<ZoomLayers> {
        let fields = &self.config.fields;
        let params = BucketParams::from(&self.config.bucketing);

        debug!("Creating buckets from tracts");
        let assignment = assign_buckets(tracts, &params)?;

        debug!("Aggregating buckets");
        let aggregates = aggregate_buckets(&assignment.buckets, &self.algebra)?;

        debug!("Breaking up polygons");
        let parts = explode_buckets(aggregates, &self.algebra);
        let exploded_parts = parts.len();

        let low_features = compose_low_zoom(parts, &assignment.kept, self.config.bucketing.score_decimals);

        let summary = TransformSummary {
            tracts: tracts.len(),
            kept_high_zoom: assignment.kept.len(),
            bucketed: assignment.pool_len(),
            bucket_count: assignment.buckets.len(),
            refinement_iterations: assignment.refinement.iterations,
            exploded_parts,
            low_zoom_features: low_features.len(),
        };
        info!("Transform complete: {:?}", summary);

        Ok(ZoomLayers {
            high: high_zoom_collection(tracts, fields, &layer_name(&self.config.high_file_name))?,
            low: low_zoom_collection(&low_features, fields, &layer_name(&self.config.low_file_name))?,
            summary,
        })
    }

    /// Write both layers
    pub async fn load(&self, layers: ZoomLayers) -> Result<()> {
        info!("Starting load step");
        let high = LayerWrite::new(
            layer_name(&self.config.high_file_name),
            self.config.high_zoom_path(),
            layers.high,
        );
        let low = LayerWrite::new(
            layer_name(&self.config.low_file_name),
            self.config.low_zoom_path(),
            layers.low,
        );
        write_layers(high, low).await
    }

    /// Run extract, transform, and load
    pub async fn run(&self) -> Result<TransformSummary> {
        let (tracts, _report) = self.extract()?;
        let layers = self.transform(&tracts)?;
        let summary = layers.summary;
        self.load(layers).await?;
        Ok(summary)
    }
}

/// Collection name derived from the output file name
fn layer_name(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_name_strips_extension() {
        assert_eq!(layer_name("usa-high.json"), "usa-high");
        assert_eq!(layer_name("usa-low"), "usa-low");
    }
}
