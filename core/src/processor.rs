//! Per-record fan-out/fan-in of the write and update operations.

use std::sync::Arc;

use cutoff_types::{RecordIndex, RecordReport};

use crate::cancel::CancellationSignal;
use crate::operation::{DelayableOperation, OperationTimings, RecordEffect};

#[derive(Debug, Clone)]
pub struct RecordProcessor {
    write: DelayableOperation,
    update: DelayableOperation,
}

impl RecordProcessor {
    #[must_use]
    pub fn new(
        timings: OperationTimings,
        write_effect: Arc<dyn RecordEffect>,
        update_effect: Arc<dyn RecordEffect>,
    ) -> Self {
        Self {
            write: DelayableOperation::write(timings.write, write_effect),
            update: DelayableOperation::update(timings.update, update_effect),
        }
    }

    #[must_use]
    pub fn timings(&self) -> OperationTimings {
        OperationTimings::new(self.write.nominal(), self.update.nominal())
    }

    /// Run both operations for `record` concurrently and wait for both.
    ///
    /// Never returns before both outcomes are settled. Under cancellation that
    /// happens as soon as each operation observes the signal, not after its
    /// nominal duration.
    pub async fn process_record(
        &self,
        record: RecordIndex,
        signal: &CancellationSignal,
    ) -> RecordReport {
        let (write, update) = tokio::join!(
            self.write.run(record, signal),
            self.update.run(record, signal)
        );
        RecordReport::new(record, write, update)
    }
}
