//! Bucket aggregation (dissolve)
//!
//! Each bucket becomes one record: the unweighted mean of its member scores
//! and the union of its member geometries. Members of a bucket are rarely
//! contiguous, so a multi-part union is the normal case.

use crate::algebra::PolygonAlgebra;
use crate::buckets::Bucket;
use crate::models::{is_empty_geometry, Tract};
use geo::{Geometry, MultiPolygon};
use tracing::debug;
use tractzoom_common::{Error, Result};

/// Dissolved bucket
#[derive(Debug, Clone, PartialEq)]
pub struct BucketAggregate {
    pub bucket_id: usize,
    pub member_count: usize,
    /// Arithmetic mean of member scores
    pub score: f64,
    /// Union of member geometries, never empty
    pub geometry: MultiPolygon<f64>,
}

/// Arithmetic mean of the member scores, `None` for no members
pub fn mean_score(members: &[&Tract]) -> Option<f64> {
    if members.is_empty() {
        return None;
    }
    let sum: f64 = members.iter().map(|t| t.score).sum();
    Some(sum / members.len() as f64)
}

/// Dissolve every bucket, in ascending bucket id order
pub fn aggregate_buckets<A: PolygonAlgebra>(
    buckets: &[Bucket<'_>],
    algebra: &A,
) -> Result<Vec<BucketAggregate>> {
    let mut aggregates = Vec::with_capacity(buckets.len());

    for bucket in buckets {
        let score = mean_score(&bucket.members)
            .ok_or_else(|| Error::DataIntegrity(format!("bucket {} has no members", bucket.id)))?;

        if let Some(tract) = bucket.members.iter().find(|t| is_empty_geometry(&t.geometry)) {
            return Err(Error::DataIntegrity(format!(
                "null geometry before dissolve: tract {} in bucket {}",
                tract.geoid, bucket.id
            )));
        }

        let geometries: Vec<&Geometry<f64>> = bucket.members.iter().map(|t| &t.geometry).collect();
        let geometry = algebra.dissolve(&geometries)?;

        if geometry.0.is_empty() {
            return Err(Error::DataIntegrity(format!(
                "null geometry after dissolve: bucket {}",
                bucket.id
            )));
        }

        debug!(
            "Bucket {}: {} tracts, mean score {:.4}, {} parts",
            bucket.id,
            bucket.members.len(),
            score,
            geometry.0.len()
        );

        aggregates.push(BucketAggregate {
            bucket_id: bucket.id,
            member_count: bucket.members.len(),
            score,
            geometry,
        });
    }

    aggregates.sort_by_key(|a| a.bucket_id);
    Ok(aggregates)
}
