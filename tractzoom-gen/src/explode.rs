//! Multi-part decomposition of dissolved buckets

use crate::aggregate::BucketAggregate;
use crate::algebra::PolygonAlgebra;
use geo::Polygon;
use tracing::debug;

/// Single-part polygon carrying the score of the bucket it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ExplodedPart {
    pub bucket_id: usize,
    pub score: f64,
    pub polygon: Polygon<f64>,
}

/// Break every bucket geometry into its parts
///
/// Buckets are visited in ascending id order and parts in decomposition
/// order, so the output is reproducible for a given input.
pub fn explode_buckets<A: PolygonAlgebra>(
    mut aggregates: Vec<BucketAggregate>,
    algebra: &A,
) -> Vec<ExplodedPart> {
    aggregates.sort_by_key(|a| a.bucket_id);

    let mut parts = Vec::new();
    for aggregate in aggregates {
        let bucket_id = aggregate.bucket_id;
        let score = aggregate.score;
        parts.extend(
            algebra
                .explode(aggregate.geometry)
                .into_iter()
                .map(|polygon| ExplodedPart {
                    bucket_id,
                    score,
                    polygon,
                }),
        );
    }

    debug!("Number of exploded polygons: {}", parts.len());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::GeoAlgebra;
    use geo::{polygon, MultiPolygon};

    fn triangle(x0: f64) -> Polygon<f64> {
        polygon![(x: x0, y: 0.0), (x: x0 + 1.0, y: 0.0), (x: x0, y: 1.0), (x: x0, y: 0.0)]
    }

    fn aggregate(bucket_id: usize, score: f64, parts: Vec<Polygon<f64>>) -> BucketAggregate {
        BucketAggregate {
            bucket_id,
            member_count: parts.len(),
            score,
            geometry: MultiPolygon::new(parts),
        }
    }

    #[test]
    fn test_single_part_yields_one_record() {
        let parts = explode_buckets(vec![aggregate(0, 0.25, vec![triangle(0.0)])], &GeoAlgebra);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].score, 0.25);
        assert_eq!(parts[0].polygon, triangle(0.0));
    }

    #[test]
    fn test_parts_inherit_bucket_score_in_stable_order() {
        let aggregates = vec![
            aggregate(1, 0.8, vec![triangle(10.0)]),
            aggregate(0, 0.2, vec![triangle(0.0), triangle(3.0), triangle(6.0)]),
        ];

        let parts = explode_buckets(aggregates, &GeoAlgebra);

        let summary: Vec<(usize, f64, f64)> = parts
            .iter()
            .map(|p| (p.bucket_id, p.score, p.polygon.exterior().0[0].x))
            .collect();
        assert_eq!(
            summary,
            vec![(0, 0.2, 0.0), (0, 0.2, 3.0), (0, 0.2, 6.0), (1, 0.8, 10.0)]
        );
    }
}
