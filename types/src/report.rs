//! Observable results of a batch run.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::{CancelReason, OperationKind, Outcome, RecordIndex};

/// Outcomes of both operations for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    pub record: RecordIndex,
    pub write: Outcome,
    pub update: Outcome,
}

/// The four observable shapes a record can settle into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSettlement {
    BothCompleted,
    UpdateCancelled,
    WriteCancelled,
    BothCancelled,
}

impl RecordReport {
    #[must_use]
    pub const fn new(record: RecordIndex, write: Outcome, update: Outcome) -> Self {
        Self {
            record,
            write,
            update,
        }
    }

    #[must_use]
    pub const fn outcome(&self, kind: OperationKind) -> Outcome {
        match kind {
            OperationKind::Write => self.write,
            OperationKind::Update => self.update,
        }
    }

    #[must_use]
    pub const fn settlement(&self) -> RecordSettlement {
        match (self.write, self.update) {
            (Outcome::Completed, Outcome::Completed) => RecordSettlement::BothCompleted,
            (Outcome::Completed, Outcome::Cancelled) => RecordSettlement::UpdateCancelled,
            (Outcome::Cancelled, Outcome::Completed) => RecordSettlement::WriteCancelled,
            (Outcome::Cancelled, Outcome::Cancelled) => RecordSettlement::BothCancelled,
        }
    }

    #[must_use]
    pub const fn fully_completed(&self) -> bool {
        matches!(self.settlement(), RecordSettlement::BothCompleted)
    }
}

impl fmt::Display for RecordReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {}: write {}, update {}",
            self.record, self.write, self.update
        )
    }
}

/// How the driver left its loop. Both variants are successful terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchStop {
    /// Every record was attempted.
    Exhausted,
    /// Cancellation was observed after the join of record `at`.
    Cancelled { at: RecordIndex, reason: CancelReason },
}

impl fmt::Display for BatchStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("all records processed"),
            Self::Cancelled { at, reason } => write!(f, "stopped early at record {at} ({reason})"),
        }
    }
}

/// Summary of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total_records: usize,
    #[serde(rename = "deadline_ms", serialize_with = "serialize_millis")]
    pub deadline: Duration,
    pub records: Vec<RecordReport>,
    pub stop: BatchStop,
}

impl BatchReport {
    /// Number of records that were started (and therefore joined).
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn fully_completed_count(&self) -> usize {
        self.records.iter().filter(|r| r.fully_completed()).count()
    }

    #[must_use]
    pub fn cancelled_at(&self) -> Option<RecordIndex> {
        match self.stop {
            BatchStop::Exhausted => None,
            BatchStop::Cancelled { at, .. } => Some(at),
        }
    }

    #[must_use]
    pub fn stopped_early(&self) -> bool {
        self.cancelled_at().is_some()
    }
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}
