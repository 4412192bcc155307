//! Running-sum aggregation of observations per job and per node.
//!
//! [`aggregate`] makes a single linear pass over the flattened
//! observations, grouping them by [`JobKey`] and then by node. Only sums
//! and counts are accumulated here; averages are derived on demand in
//! [`crate::scoring`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::observation::Observation;
use crate::types::{ModelId, NodeId, PipelineId, RegionId};

/// Separator between the pipeline and model parts of a [`JobKey`].
///
/// Pipeline ids contain spaces and model ids contain `/` and `-`, but
/// neither uses a double colon.
pub const JOB_KEY_SEPARATOR: &str = "::";

// ---------------------------------------------------------------------------
// JobKey
// ---------------------------------------------------------------------------

/// Composite identifier of a job: `pipeline::model`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobKey(String);

impl JobKey {
    pub fn new(pipeline: &str, model: &str) -> Self {
        Self(format!("{pipeline}{JOB_KEY_SEPARATOR}{model}"))
    }

    /// Parse a key received from a caller, e.g. a URL path segment.
    ///
    /// Both the pipeline and the model part must be non-empty.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.split_once(JOB_KEY_SEPARATOR) {
            Some((pipeline, model)) if !pipeline.is_empty() && !model.is_empty() => {
                Ok(Self(raw.to_string()))
            }
            _ => Err(CoreError::Validation(format!(
                "job key must have the form 'pipeline{JOB_KEY_SEPARATOR}model', got '{raw}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// A single metric value sampled in one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionValue {
    pub region: RegionId,
    pub value: f64,
}

/// Running totals for one node within one job.
///
/// Invariant: `count` equals the length of each detail list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAggregate {
    pub total_score: f64,
    pub total_success_rate: f64,
    pub total_round_trip: f64,
    pub count: usize,
    /// Per-region score values, first-seen region order.
    pub score_results: Vec<RegionValue>,
    pub success_results: Vec<RegionValue>,
    pub round_trip_results: Vec<RegionValue>,
}

impl NodeAggregate {
    fn record(&mut self, region: &str, metrics: Metrics) {
        self.total_score += metrics.score;
        self.total_success_rate += metrics.success_rate;
        self.total_round_trip += metrics.round_trip;
        self.count += 1;

        self.score_results.push(RegionValue {
            region: region.to_string(),
            value: metrics.score,
        });
        self.success_results.push(RegionValue {
            region: region.to_string(),
            value: metrics.success_rate,
        });
        self.round_trip_results.push(RegionValue {
            region: region.to_string(),
            value: metrics.round_trip,
        });
    }
}

/// Running totals for one (pipeline, model) job across every node and
/// region.
#[derive(Debug, Clone, PartialEq)]
pub struct JobAggregate {
    pub pipeline: PipelineId,
    pub model: ModelId,
    pub total_score: f64,
    pub total_success_rate: f64,
    pub total_round_trip: f64,
    pub count: usize,
    /// Nodes in first-seen order.
    pub nodes: IndexMap<NodeId, NodeAggregate>,
}

impl JobAggregate {
    fn new(pipeline: &str, model: &str) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            model: model.to_string(),
            total_score: 0.0,
            total_success_rate: 0.0,
            total_round_trip: 0.0,
            count: 0,
            nodes: IndexMap::new(),
        }
    }

    fn record(&mut self, node: &str, region: &str, metrics: Metrics) {
        self.total_score += metrics.score;
        self.total_success_rate += metrics.success_rate;
        self.total_round_trip += metrics.round_trip;
        self.count += 1;

        // Avoid allocating a key for nodes already present.
        match self.nodes.get_mut(node) {
            Some(aggregate) => aggregate.record(region, metrics),
            None => {
                let mut aggregate = NodeAggregate::default();
                aggregate.record(region, metrics);
                self.nodes.insert(node.to_string(), aggregate);
            }
        }
    }

    /// Number of distinct nodes that reported for this job.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// All job aggregates, in job discovery order.
pub type JobMap = IndexMap<JobKey, JobAggregate>;

/// Sanitized metric triple for one observation.
#[derive(Debug, Clone, Copy)]
struct Metrics {
    score: f64,
    success_rate: f64,
    round_trip: f64,
}

impl Metrics {
    fn from_observation(observation: &Observation) -> Self {
        Self {
            score: finite_or_zero(observation.score),
            success_rate: finite_or_zero(observation.success_rate),
            round_trip: finite_or_zero(observation.round_trip_score),
        }
    }
}

/// Replace NaN and infinities with `0.0`.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Fold observations into per-job, per-node running sums.
///
/// Duplicate (job, node, region) observations are both folded in. A
/// non-finite metric contributes `0.0` but still counts as a sample.
pub fn aggregate(observations: &[Observation]) -> JobMap {
    let mut jobs = JobMap::new();

    for observation in observations {
        let metrics = Metrics::from_observation(observation);
        jobs.entry(observation.job_key())
            .or_insert_with(|| JobAggregate::new(&observation.pipeline, &observation.model))
            .record(&observation.node, &observation.region, metrics);
    }

    jobs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
