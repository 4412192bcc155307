//! Read-only projections consumed by the rendering layer.
//!
//! * [`ModelSummary`] list -- one entry per job, in health-bar order.
//! * [`HealthMatrix`] -- node rows x job columns; a missing cell is
//!   `None` (serialized as `null`) and means "no data", never zero.
//!
//! Both are derived from the [`JobMap`] alone. [`refresh`] runs the whole
//! pipeline from fetched reports to a fresh [`Dashboard`].

use serde::Serialize;

use crate::aggregate::{aggregate, JobKey, JobMap, NodeAggregate, RegionValue};
use crate::discovery::{availability_by_model, AvailabilityMap, DiscoveryStats};
use crate::error::CoreError;
use crate::observation::{flatten, PipelineResult};
use crate::ranking::{rank_columns, rank_jobs, rank_nodes};
use crate::scoring::ScoreBreakdown;
use crate::types::{ModelId, NodeId, PipelineId};

// ---------------------------------------------------------------------------
// Model summary
// ---------------------------------------------------------------------------

/// Health-bar entry for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub job_key: JobKey,
    pub pipeline: PipelineId,
    pub model: ModelId,
    /// Distinct nodes that reported for this job.
    pub node_count: usize,
    pub good_node_count: usize,
    pub good_nodes: Vec<NodeId>,
    pub average_score: f64,
    pub average_success_rate: f64,
    pub average_round_trip: f64,
    pub scores: ScoreBreakdown,
    /// Nodes with the model loaded warm, from discovery.
    pub warm_nodes: Vec<NodeId>,
    /// Nodes able to cold-start the model, from discovery.
    pub cold_nodes: Vec<NodeId>,
}

/// Build the summary list in job ranking order, merging warm/cold lists
/// by model id.
pub fn summarize(jobs: &JobMap, availability: &AvailabilityMap) -> Vec<ModelSummary> {
    rank_jobs(jobs)
        .into_iter()
        .map(|ranked| {
            let job = &jobs[ranked.key];
            let stats = ranked.stats;
            let (warm_nodes, cold_nodes): (Vec<NodeId>, Vec<NodeId>) = availability
                .get(&job.model)
                .map(|a| {
                    (
                        a.warm.iter().cloned().collect(),
                        a.cold.iter().cloned().collect(),
                    )
                })
                .unwrap_or_default();

            ModelSummary {
                job_key: ranked.key.clone(),
                pipeline: job.pipeline.clone(),
                model: job.model.clone(),
                node_count: job.node_count(),
                good_node_count: stats.good_nodes.len(),
                good_nodes: stats.good_nodes,
                average_score: stats.average_score,
                average_success_rate: stats.average_success_rate,
                average_round_trip: stats.average_round_trip,
                scores: stats.breakdown,
                warm_nodes,
                cold_nodes,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// Heatmap column header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixColumn {
    pub job_key: JobKey,
    pub pipeline: PipelineId,
    pub model: ModelId,
    /// Long label, `model (pipeline)`.
    pub label: String,
    /// Sum of per-node average scores; the column ordering key.
    pub column_score: f64,
}

/// Heatmap cell: one node's results for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    pub average_score: f64,
    pub average_success_rate: f64,
    pub average_round_trip: f64,
    pub sample_count: usize,
    pub score_results: Vec<RegionValue>,
    pub success_results: Vec<RegionValue>,
    pub round_trip_results: Vec<RegionValue>,
}

impl MatrixCell {
    fn from_node(node: &NodeAggregate) -> Self {
        Self {
            average_score: node.average_score(),
            average_success_rate: node.average_success_rate(),
            average_round_trip: node.average_round_trip(),
            sample_count: node.count,
            score_results: node.score_results.clone(),
            success_results: node.success_results.clone(),
            round_trip_results: node.round_trip_results.clone(),
        }
    }
}

/// Heatmap row for one node; `cells` is aligned with
/// [`HealthMatrix::columns`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub node: NodeId,
    /// Raw score summed over all the node's jobs; the row ordering key.
    pub total_score: f64,
    pub cells: Vec<Option<MatrixCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthMatrix {
    pub columns: Vec<MatrixColumn>,
    pub rows: Vec<MatrixRow>,
}

impl HealthMatrix {
    /// Cell for `(node, job)`, or `None` when that pair had no data.
    pub fn cell(&self, node: &str, job: &JobKey) -> Option<&MatrixCell> {
        let column = self.column_index(job)?;
        self.rows
            .iter()
            .find(|row| row.node == node)
            .and_then(|row| row.cells.get(column)?.as_ref())
    }

    /// Position of `job` in [`columns`](Self::columns).
    pub fn column_index(&self, job: &JobKey) -> Option<usize> {
        self.columns.iter().position(|c| &c.job_key == job)
    }

    /// Populated cells of one column, in row order.
    pub fn column_cells<'a>(
        &'a self,
        job: &JobKey,
    ) -> impl Iterator<Item = (&'a MatrixRow, &'a MatrixCell)> + 'a {
        let column = self.column_index(job);
        self.rows.iter().filter_map(move |row| {
            let cell = row.cells.get(column?)?.as_ref()?;
            Some((row, cell))
        })
    }
}

/// Build the node x job matrix with rows and columns in ranking order.
pub fn build_matrix(jobs: &JobMap) -> HealthMatrix {
    let ranked_columns = rank_columns(jobs);

    let columns: Vec<MatrixColumn> = ranked_columns
        .iter()
        .map(|column| {
            let job = &jobs[column.key];
            MatrixColumn {
                job_key: column.key.clone(),
                pipeline: job.pipeline.clone(),
                model: job.model.clone(),
                label: format!("{} ({})", job.model, job.pipeline),
                column_score: column.score,
            }
        })
        .collect();

    let rows = rank_nodes(jobs)
        .into_iter()
        .map(|ranked| {
            let cells = ranked_columns
                .iter()
                .map(|column| {
                    jobs[column.key]
                        .nodes
                        .get(&ranked.node)
                        .map(MatrixCell::from_node)
                })
                .collect();

            MatrixRow {
                node: ranked.node,
                total_score: ranked.total_score,
                cells,
            }
        })
        .collect();

    HealthMatrix { columns, rows }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Both projections for one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: Vec<ModelSummary>,
    pub matrix: HealthMatrix,
}

/// Drill-down view of a single job: its summary plus every reporting
/// node's cell, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub summary: ModelSummary,
    pub nodes: Vec<NodeCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCell {
    pub node: NodeId,
    pub cell: MatrixCell,
}

impl Dashboard {
    pub fn build(jobs: &JobMap, discovery: Option<&DiscoveryStats>) -> Self {
        let availability = discovery.map(availability_by_model).unwrap_or_default();
        Self {
            summary: summarize(jobs, &availability),
            matrix: build_matrix(jobs),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    pub fn job_detail(&self, key: &JobKey) -> Result<JobDetail, CoreError> {
        let summary = self
            .summary
            .iter()
            .find(|s| &s.job_key == key)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "Job",
                id: key.to_string(),
            })?;

        let nodes = self
            .matrix
            .column_cells(key)
            .map(|(row, cell)| NodeCell {
                node: row.node.clone(),
                cell: cell.clone(),
            })
            .collect();

        Ok(JobDetail { summary, nodes })
    }
}

/// Recompute everything from one fetch batch.
///
/// Stateless: identical input always yields an identical dashboard.
pub fn refresh(results: &[PipelineResult], discovery: Option<&DiscoveryStats>) -> Dashboard {
    let observations = flatten(results);
    let jobs = aggregate(&observations);
    Dashboard::build(&jobs, discovery)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
