//! Raw report flattening.
//!
//! The performance endpoint reports `node -> region -> stats` for one
//! (pipeline, model) pair. [`flatten`] walks every leaf and emits one
//! [`Observation`] per (pipeline, model, node, region) tuple.
//!
//! Traversal order is deterministic: results in input order, then nodes
//! and regions in the order the upstream JSON delivered them. That order
//! only affects the region detail lists, never aggregate values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::JobKey;
use crate::types::{ModelId, NodeId, PipelineId, RegionId};

/// Metrics reported for one node in one region.
///
/// Decodes from any JSON value. Missing, `null`, or non-numeric fields
/// become `0.0`, and a leaf that is not an object at all becomes
/// all zeros. The leaf still counts as an observation either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct RegionStats {
    pub success_rate: f64,
    pub round_trip_score: f64,
    pub score: f64,
}

impl From<serde_json::Value> for RegionStats {
    fn from(value: serde_json::Value) -> Self {
        let metric = |key: &str| {
            value
                .get(key)
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0)
        };
        Self {
            success_rate: metric("success_rate"),
            round_trip_score: metric("round_trip_score"),
            score: metric("score"),
        }
    }
}

/// Per-node, per-region stats for a single (pipeline, model) pair.
pub type JobPerformance = IndexMap<NodeId, IndexMap<RegionId, RegionStats>>;

/// Outcome of fetching performance data for one (pipeline, model) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum JobReport {
    Measured(JobPerformance),
    /// The fetch failed; the pair contributes no observations.
    Failed(String),
}

/// Performance report for one (pipeline, model) pair as handed over by
/// the fetch layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub pipeline: PipelineId,
    pub model: ModelId,
    pub report: JobReport,
}

impl PipelineResult {
    pub fn measured(
        pipeline: impl Into<PipelineId>,
        model: impl Into<ModelId>,
        data: JobPerformance,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            model: model.into(),
            report: JobReport::Measured(data),
        }
    }

    pub fn failed(
        pipeline: impl Into<PipelineId>,
        model: impl Into<ModelId>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            model: model.into(),
            report: JobReport::Failed(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.report, JobReport::Failed(_))
    }
}

/// One leaf of a performance report: a node's metrics for one job in one
/// region.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub node: NodeId,
    pub pipeline: PipelineId,
    pub model: ModelId,
    pub region: RegionId,
    pub success_rate: f64,
    pub round_trip_score: f64,
    pub score: f64,
}

impl Observation {
    /// Key of the job this observation belongs to.
    pub fn job_key(&self) -> JobKey {
        JobKey::new(&self.pipeline, &self.model)
    }
}

/// Flatten nested performance reports into observations.
///
/// `Failed` reports are skipped entirely.
pub fn flatten(results: &[PipelineResult]) -> Vec<Observation> {
    let mut observations = Vec::new();

    for result in results {
        let data = match &result.report {
            JobReport::Measured(data) => data,
            JobReport::Failed(_) => continue,
        };

        for (node, regions) in data {
            for (region, stats) in regions {
                observations.push(Observation {
                    node: node.clone(),
                    pipeline: result.pipeline.clone(),
                    model: result.model.clone(),
                    region: region.clone(),
                    success_rate: stats.success_rate,
                    round_trip_score: stats.round_trip_score,
                    score: stats.score,
                });
            }
        }
    }

    observations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
