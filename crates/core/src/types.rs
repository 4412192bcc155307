/// Node (orchestrator) address, e.g. `0x1074...6df7`.
pub type NodeId = String;

/// Pipeline identifier, e.g. `Text to image`.
pub type PipelineId = String;

/// Model identifier, e.g. `ByteDance/SDXL-Lightning`.
pub type ModelId = String;

/// Region short name, e.g. `FRA`.
pub type RegionId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
