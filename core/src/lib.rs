//! Deadline-bounded record orchestration for Cutoff.
//!
//! Layers, leaf first:
//!
//! - **`cancel`**: [`CancellationSignal`], the shared one-shot flag with its deadline timer
//! - **`operation`**: [`DelayableOperation`], an abortable wait followed by a side effect
//! - **`processor`**: [`RecordProcessor`], both operations for one record, joined
//! - **`driver`**: [`BatchDriver`], the sequential loop that stops once cancellation is seen

mod cancel;
mod driver;
mod error;
mod operation;
mod processor;

pub use cancel::{CancellationSignal, DeadlineTimer, WaitOutcome};
pub use driver::BatchDriver;
pub use error::BatchError;
pub use operation::{DelayableOperation, OperationTimings, RecordEffect};
pub use processor::RecordProcessor;
