//! HTTP client for the leaderboard and gateway discovery APIs.
//!
//! [`api::LeaderboardApi`] wraps the individual endpoints; [`batch`]
//! joins them into the complete fetch batch the aggregation pipeline
//! runs on.

pub mod api;
pub mod batch;
