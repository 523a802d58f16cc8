//! Background workers owned by the runtime.
//!
//! - [`ValuationWorker`] runs batches and answers cache queries
//! - [`ValuationMetrics`] counts what the worker has done

mod metrics;
mod valuation;

pub use metrics::{MetricsSnapshot, ValuationMetrics};
pub use valuation::{Command, Invalidation, ValuationEnv, ValuationWorker, WorkerSettings};
