//! Deterministic orderings for the health bar and the heatmap.
//!
//! Three independent rankings, each a stable descending sort:
//!
//! | Ranking          | Key                                                   |
//! |------------------|-------------------------------------------------------|
//! | [`rank_jobs`]    | composite score of the job                            |
//! | [`rank_nodes`]   | node's raw `total_score` summed over all its jobs     |
//! | [`rank_columns`] | sum over nodes of the node's *average* score for a job |
//!
//! Ties keep discovery order (jobs) or first-seen order (nodes).

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::aggregate::{finite_or_zero, JobKey, JobMap};
use crate::scoring::JobStats;
use crate::types::NodeId;

/// Descending comparison on sanitized floats.
fn descending(a: f64, b: f64) -> Ordering {
    finite_or_zero(b).total_cmp(&finite_or_zero(a))
}

/// A job with its derived statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedJob<'a> {
    pub key: &'a JobKey,
    pub stats: JobStats,
}

/// Jobs ordered by descending composite score.
pub fn rank_jobs(jobs: &JobMap) -> Vec<RankedJob<'_>> {
    let mut ranked: Vec<RankedJob<'_>> = jobs
        .iter()
        .map(|(key, job)| RankedJob {
            key,
            stats: JobStats::from_aggregate(job),
        })
        .collect();

    // `sort_by` is stable: equal composites keep discovery order.
    ranked.sort_by(|a, b| descending(a.stats.composite(), b.stats.composite()));
    ranked
}

/// A node's raw score summed over every job it reported for.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTotal {
    pub node: NodeId,
    pub total_score: f64,
}

/// Nodes ordered by descending cumulative `total_score` across jobs.
pub fn rank_nodes(jobs: &JobMap) -> Vec<NodeTotal> {
    let mut totals: IndexMap<&str, f64> = IndexMap::new();
    for job in jobs.values() {
        for (node, aggregate) in &job.nodes {
            *totals.entry(node.as_str()).or_insert(0.0) += aggregate.total_score;
        }
    }

    let mut ranked: Vec<NodeTotal> = totals
        .into_iter()
        .map(|(node, total_score)| NodeTotal {
            node: node.to_string(),
            total_score,
        })
        .collect();

    ranked.sort_by(|a, b| descending(a.total_score, b.total_score));
    ranked
}

/// A heatmap column with its ordering key.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScore<'a> {
    pub key: &'a JobKey,
    /// Sum of per-node average scores for this job.
    pub score: f64,
}

/// Jobs ordered by descending sum of per-node average scores.
pub fn rank_columns(jobs: &JobMap) -> Vec<ColumnScore<'_>> {
    let mut ranked: Vec<ColumnScore<'_>> = jobs
        .iter()
        .map(|(key, job)| ColumnScore {
            key,
            score: job.nodes.values().map(|node| node.average_score()).sum(),
        })
        .collect();

    ranked.sort_by(|a, b| descending(a.score, b.score));
    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
