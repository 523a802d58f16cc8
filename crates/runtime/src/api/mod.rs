//! Public API surface for runtime consumers.
//!
//! Re-exports the handle, batch types, progress plumbing, and errors that
//! clients use when embedding the runtime.
mod batch;
mod errors;
mod handle;
mod progress;

pub use batch::{BatchId, BatchOutcome, BatchRequest, PairValuation, ValuationPair};
pub use errors::{Result, RuntimeError};
pub use handle::{BatchTicket, ValuationHandle};
pub use progress::{CancellationFlag, ProgressControl, ProgressSink, ProgressThrottle};
