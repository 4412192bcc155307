//! Node availability enrichment from the gateway's discovery endpoint.
//!
//! The discovery payload lists, per orchestrator, which models it has
//! loaded warm or can cold-start. This is pass-through data: it is merged
//! into the model summaries by model id and never feeds the aggregation.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::types::{ModelId, NodeId};

/// Top-level discovery payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscoveryStats {
    #[serde(default)]
    pub orchestrators: Vec<OrchestratorCapabilities>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrchestratorCapabilities {
    pub address: NodeId,
    #[serde(default)]
    pub pipelines: Vec<DiscoveredPipeline>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscoveredPipeline {
    #[serde(rename = "type")]
    pub pipeline_type: String,
    #[serde(default)]
    pub models: Vec<DiscoveredModel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscoveredModel {
    pub name: ModelId,
    #[serde(default)]
    pub status: WarmColdStatus,
}

/// Warm/cold container counts reported for one model on one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct WarmColdStatus {
    #[serde(rename = "Cold", default)]
    pub cold: i64,
    #[serde(rename = "Warm", default)]
    pub warm: i64,
}

/// Nodes that have a model warm or cold, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelAvailability {
    pub warm: IndexSet<NodeId>,
    pub cold: IndexSet<NodeId>,
}

/// Warm/cold node lists keyed by model id.
pub type AvailabilityMap = IndexMap<ModelId, ModelAvailability>;

/// Group the discovery payload by model id.
///
/// A node is listed as warm when it reports `Warm > 0` and as cold when
/// it reports `Cold > 0`; it may appear in both. A node reporting the
/// same model under several pipelines is listed once.
pub fn availability_by_model(stats: &DiscoveryStats) -> AvailabilityMap {
    let mut by_model = AvailabilityMap::new();

    for orchestrator in &stats.orchestrators {
        for pipeline in &orchestrator.pipelines {
            for model in &pipeline.models {
                let entry = by_model.entry(model.name.clone()).or_default();
                if model.status.warm > 0 {
                    entry.warm.insert(orchestrator.address.clone());
                }
                if model.status.cold > 0 {
                    entry.cold.insert(orchestrator.address.clone());
                }
            }
        }
    }

    by_model
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
