//! Fleet health aggregation pipeline.
//!
//! Turns per-region performance reports for AI inference nodes into the
//! derived statistics behind the dashboard: per-job averages, good-node
//! counts, composite health scores, deterministic orderings, and the two
//! rendering projections (model summary list and node x job matrix).
//!
//! Pure logic -- no network or database access. The caller fetches the
//! raw reports and hands them to [`projection::refresh`].

pub mod aggregate;
pub mod discovery;
pub mod error;
pub mod observation;
pub mod projection;
pub mod ranking;
pub mod scoring;
pub mod types;
