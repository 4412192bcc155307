//! Averages, good-node classification, and composite health scores.
//!
//! Every average in the crate goes through [`safe_average`] so a zero
//! sample count yields `0.0` instead of NaN.

use serde::Serialize;

use crate::aggregate::{finite_or_zero, JobAggregate, NodeAggregate};
use crate::types::NodeId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A good node's average success rate must exceed this (strictly).
pub const GOOD_NODE_SUCCESS_THRESHOLD: f64 = 0.80;

/// A good node's average round-trip score must exceed this (strictly).
pub const GOOD_NODE_ROUND_TRIP_THRESHOLD: f64 = 0.75;

/// Redundancy credit per good node; five good nodes saturate the score.
pub const REDUNDANCY_WEIGHT_PER_NODE: f64 = 0.2;

// ---------------------------------------------------------------------------
// Averages
// ---------------------------------------------------------------------------

/// `total / count`, or `0.0` when `count` is zero or the result is not
/// finite.
pub fn safe_average(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    finite_or_zero(total / count as f64)
}

impl NodeAggregate {
    pub fn average_score(&self) -> f64 {
        safe_average(self.total_score, self.count)
    }

    pub fn average_success_rate(&self) -> f64 {
        safe_average(self.total_success_rate, self.count)
    }

    pub fn average_round_trip(&self) -> f64 {
        safe_average(self.total_round_trip, self.count)
    }

    /// Whether this node clears both good-node thresholds for its job.
    pub fn is_good(&self) -> bool {
        self.average_success_rate() > GOOD_NODE_SUCCESS_THRESHOLD
            && self.average_round_trip() > GOOD_NODE_ROUND_TRIP_THRESHOLD
    }
}

impl JobAggregate {
    pub fn average_score(&self) -> f64 {
        safe_average(self.total_score, self.count)
    }

    pub fn average_success_rate(&self) -> f64 {
        safe_average(self.total_success_rate, self.count)
    }

    pub fn average_round_trip(&self) -> f64 {
        safe_average(self.total_round_trip, self.count)
    }
}

/// Nodes of a job that clear both good-node thresholds, in node
/// first-seen order.
pub fn good_nodes(job: &JobAggregate) -> Vec<NodeId> {
    job.nodes
        .iter()
        .filter(|(_, node)| node.is_good())
        .map(|(id, _)| id.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Composite score
// ---------------------------------------------------------------------------

/// The three components of a job's health and their blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Average round-trip score.
    pub round_trip: f64,
    /// Average success rate, squared.
    pub success: f64,
    /// `good_node_count * 0.2`, clamped to `[0, 1]`.
    pub redundancy: f64,
    /// Mean of the three components.
    pub composite: f64,
}

impl ScoreBreakdown {
    pub fn compute(average_round_trip: f64, average_success_rate: f64, good_node_count: usize) -> Self {
        let round_trip = finite_or_zero(average_round_trip);
        let success_rate = finite_or_zero(average_success_rate);
        let success = success_rate * success_rate;
        let redundancy = (good_node_count as f64 * REDUNDANCY_WEIGHT_PER_NODE).clamp(0.0, 1.0);

        Self {
            round_trip,
            success,
            redundancy,
            composite: (round_trip + success + redundancy) / 3.0,
        }
    }
}

/// Derived statistics for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStats {
    pub average_score: f64,
    pub average_success_rate: f64,
    pub average_round_trip: f64,
    pub good_nodes: Vec<NodeId>,
    pub breakdown: ScoreBreakdown,
}

impl JobStats {
    pub fn from_aggregate(job: &JobAggregate) -> Self {
        let average_success_rate = job.average_success_rate();
        let average_round_trip = job.average_round_trip();
        let good_nodes = good_nodes(job);
        let breakdown =
            ScoreBreakdown::compute(average_round_trip, average_success_rate, good_nodes.len());

        Self {
            average_score: job.average_score(),
            average_success_rate,
            average_round_trip,
            good_nodes,
            breakdown,
        }
    }

    pub fn composite(&self) -> f64 {
        self.breakdown.composite
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
