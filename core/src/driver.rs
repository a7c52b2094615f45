//! Sequential batch loop bounded by a single deadline.
//!
//! # State machine
//!
//! ```text
//! Running(0) -> process record -> joined -> signal fired? --yes--> Stopped(Cancelled at i)
//!                                              |
//!                                              no -> Running(i + 1) ... -> Stopped(Exhausted)
//! ```
//!
//! Cancellation is only consulted after a record's join, so the record in
//! flight when the deadline fires settles (through its early-exit paths)
//! before the loop stops. No record starts after a fired signal is observed.

use std::time::Duration;

use cutoff_types::{BatchReport, BatchStop, RecordIndex};

use crate::cancel::CancellationSignal;
use crate::error::BatchError;
use crate::processor::RecordProcessor;

#[derive(Debug, Clone)]
pub struct BatchDriver {
    processor: RecordProcessor,
}

impl BatchDriver {
    #[must_use]
    pub fn new(processor: RecordProcessor) -> Self {
        Self { processor }
    }

    /// Process `total_records` records under a fresh signal armed with `deadline`.
    pub async fn run(
        &self,
        total_records: usize,
        deadline: Duration,
    ) -> Result<BatchReport, BatchError> {
        self.run_with_signal(total_records, deadline, &CancellationSignal::new())
            .await
    }

    /// Like [`run`](Self::run), but against a caller-owned signal so cancellation
    /// can also be requested from outside (e.g. on Ctrl+C). The deadline is
    /// armed on that signal and released when the run returns.
    pub async fn run_with_signal(
        &self,
        total_records: usize,
        deadline: Duration,
        signal: &CancellationSignal,
    ) -> Result<BatchReport, BatchError> {
        if deadline.is_zero() {
            return Err(BatchError::ZeroDeadline);
        }

        tracing::info!(
            records = total_records,
            deadline_ms = deadline.as_millis() as u64,
            "Processing records"
        );

        if total_records == 0 {
            return Ok(BatchReport {
                total_records,
                deadline,
                records: Vec::new(),
                stop: BatchStop::Exhausted,
            });
        }

        let _timer = signal.arm(deadline);
        // Grows with the records actually run; the count is only an upper bound.
        let mut records = Vec::new();
        let mut index = RecordIndex::FIRST;

        let stop = loop {
            if index.value() >= total_records {
                break BatchStop::Exhausted;
            }

            let report = self.processor.process_record(index, signal).await;
            tracing::debug!(record = %index, settlement = ?report.settlement(), "Record joined");
            records.push(report);

            if let Some(reason) = signal.reason() {
                tracing::info!(record = %index, %reason, "Cancelled while processing records");
                break BatchStop::Cancelled { at: index, reason };
            }

            index = index.next();
        };

        if matches!(stop, BatchStop::Exhausted) {
            tracing::info!(records = records.len(), "All records processed");
        }

        Ok(BatchReport {
            total_records,
            deadline,
            records,
            stop,
        })
    }
}
