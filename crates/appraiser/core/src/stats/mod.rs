//! Stat keys and the aggregation engine.
mod aggregate;
mod keys;

pub use aggregate::{ArtifactTotals, OverallStats, compute_overall_stats, round_tenth, stat_floor};
pub use keys::{Element, OverallStatKey, StatKey};
