//! Bucket assignment
//!
//! Splits the tracts into two sets, decided per state:
//! - states with few tracts are kept at high zoom, tract by tract
//! - all other tracts form the bucketing pool, sorted by score and sliced
//!   into equal-size runs
//!
//! The bucket count starts at a configured value and grows while
//! `sum(scores) % bucket_size` exceeds the homogeneity threshold. That check
//! is a balance heuristic carried over unchanged: it does not measure how
//! similar the scores inside a bucket are. The loop is capped so a threshold
//! that can never be met fails the run instead of spinning.

use crate::models::Tract;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};
use tractzoom_common::config::BucketingConfig;
use tractzoom_common::{Error, Result};

/// Parameters of the bucket assignment
#[derive(Debug, Clone, PartialEq)]
pub struct BucketParams {
    pub initial_bucket_count: usize,
    pub homogeneity_threshold: f64,
    pub high_zoom_tract_threshold: usize,
    /// `None` caps refinement at the pool size
    pub max_refinement_iterations: Option<usize>,
}

impl Default for BucketParams {
    fn default() -> Self {
        Self::from(&BucketingConfig::default())
    }
}

impl From<&BucketingConfig> for BucketParams {
    fn from(config: &BucketingConfig) -> Self {
        Self {
            initial_bucket_count: config.initial_bucket_count,
            homogeneity_threshold: config.homogeneity_threshold,
            high_zoom_tract_threshold: config.high_zoom_tract_threshold,
            max_refinement_iterations: config.max_refinement_iterations,
        }
    }
}

/// Outcome of the bucket-count refinement loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refinement {
    /// Bucket count after refinement
    pub bucket_count: usize,
    /// Tracts per bucket (the last bucket may hold fewer)
    pub bucket_size: usize,
    /// Number of times the bucket count was incremented
    pub iterations: usize,
}

/// Score-ordered run of pool tracts
#[derive(Debug, Clone)]
pub struct Bucket<'a> {
    pub id: usize,
    /// Members in ascending score order
    pub members: Vec<&'a Tract>,
}

/// Result of [`assign_buckets`]
#[derive(Debug, Clone)]
pub struct BucketAssignment<'a> {
    /// Tracts of states kept at high zoom, in input order
    pub kept: Vec<&'a Tract>,
    /// Buckets in ascending id order; `buckets[i].id == i`
    pub buckets: Vec<Bucket<'a>>,
    /// State codes kept at high zoom
    pub kept_states: Vec<String>,
    pub refinement: Refinement,
}

impl BucketAssignment<'_> {
    /// Number of tracts in the bucketing pool
    pub fn pool_len(&self) -> usize {
        self.buckets.iter().map(|b| b.members.len()).sum()
    }
}

/// Group tracts by state code, members in input order
pub fn group_by_state(tracts: &[Tract]) -> BTreeMap<&str, Vec<&Tract>> {
    let mut groups: BTreeMap<&str, Vec<&Tract>> = BTreeMap::new();
    for tract in tracts {
        groups.entry(tract.state_code()).or_default().push(tract);
    }
    groups
}

/// Grow the bucket count until `score_sum % bucket_size` is within threshold
///
/// Uses the floating point remainder, so with scores in [0, 1] the loop
/// always stops once `bucket_size <= threshold`. A negative or otherwise
/// unreachable threshold fails with [`Error::Config`] after
/// `max_iterations` increments.
pub fn refine_bucket_size(
    pool_len: usize,
    score_sum: f64,
    initial_bucket_count: usize,
    homogeneity_threshold: f64,
    max_iterations: usize,
) -> Result<Refinement> {
    if pool_len == 0 || initial_bucket_count == 0 {
        return Err(Error::Config(format!(
            "cannot size buckets for {} tracts into {} buckets",
            pool_len, initial_bucket_count
        )));
    }

    let mut bucket_count = initial_bucket_count;
    let mut bucket_size = pool_len.div_ceil(bucket_count);
    let mut iterations = 0;

    while score_sum % bucket_size as f64 > homogeneity_threshold {
        if iterations >= max_iterations {
            return Err(Error::Config(format!(
                "bucket refinement did not converge after {} iterations \
                 (bucket count {}, bucket size {}, remainder {} > threshold {})",
                iterations,
                bucket_count,
                bucket_size,
                score_sum % bucket_size as f64,
                homogeneity_threshold
            )));
        }
        bucket_count += 1;
        bucket_size = pool_len.div_ceil(bucket_count);
        iterations += 1;
    }

    Ok(Refinement {
        bucket_count,
        bucket_size,
        iterations,
    })
}

/// Partition tracts into kept-at-high-zoom tracts and score buckets
pub fn assign_buckets<'a>(tracts: &'a [Tract], params: &BucketParams) -> Result<BucketAssignment<'a>> {
    let groups = group_by_state(tracts);

    let kept_states: HashSet<&str> = groups
        .iter()
        .filter(|(_, members)| members.len() <= params.high_zoom_tract_threshold)
        .map(|(state, _)| *state)
        .collect();

    let (kept, mut pool): (Vec<&Tract>, Vec<&Tract>) = tracts
        .iter()
        .partition(|t| kept_states.contains(t.state_code()));

    if pool.is_empty() {
        return Err(Error::Config(format!(
            "high zoom threshold {} is too high, nothing is aggregated ({} tracts in {} states)",
            params.high_zoom_tract_threshold,
            tracts.len(),
            groups.len()
        )));
    }
    if kept.is_empty() {
        return Err(Error::Config(format!(
            "nothing is kept at high zoom: every state has more than {} tracts",
            params.high_zoom_tract_threshold
        )));
    }

    let mut kept_state_list: Vec<String> = kept_states.iter().map(|s| s.to_string()).collect();
    kept_state_list.sort();
    info!(
        "Keeping {} tracts from {} states at high zoom: {:?}",
        kept.len(),
        kept_state_list.len(),
        kept_state_list
    );

    // Stable sort: equal scores (including 0.0 and -0.0) keep input order.
    // Scores are finite here; the loader drops NaN.
    pool.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

    let score_sum: f64 = pool.iter().map(|t| t.score).sum();
    let max_iterations = params.max_refinement_iterations.unwrap_or(pool.len());
    let refinement = refine_bucket_size(
        pool.len(),
        score_sum,
        params.initial_bucket_count,
        params.homogeneity_threshold,
        max_iterations,
    )?;

    debug!(
        "The number of buckets has increased to {} after {} iterations (bucket size {})",
        refinement.bucket_count, refinement.iterations, refinement.bucket_size
    );

    // Chunking the sorted pool gives id = floor(position / bucket_size)
    let buckets: Vec<Bucket> = pool
        .chunks(refinement.bucket_size)
        .enumerate()
        .map(|(id, members)| Bucket {
            id,
            members: members.to_vec(),
        })
        .collect();

    info!(
        "Assigned {} pool tracts to {} buckets",
        pool.len(),
        buckets.len()
    );

    Ok(BucketAssignment {
        kept,
        buckets,
        kept_states: kept_state_list,
        refinement,
    })
}
