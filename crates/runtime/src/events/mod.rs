//! Topic-based event system.
//!
//! Valuation progress and results are published on separate topics so a
//! progress bar does not have to filter per-pair reports.
mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ProgressEvent, ValuationEvent};
