//! Delayable per-record operations.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cutoff_types::{OperationKind, Outcome, RecordIndex};

use crate::cancel::{CancellationSignal, WaitOutcome};

/// Side effect performed when an operation completes its wait uninterrupted.
///
/// Implementations own their failure handling; the orchestration layer only
/// distinguishes "ran" from "skipped".
///
/// `apply` runs inline on the async worker that finished the wait, so it must
/// stay short. Slow or blocking work belongs on its own task or thread.
pub trait RecordEffect: Send + Sync {
    fn apply(&self, record: RecordIndex);
}

impl<F> RecordEffect for F
where
    F: Fn(RecordIndex) + Send + Sync,
{
    fn apply(&self, record: RecordIndex) {
        self(record);
    }
}

/// Nominal durations of the two operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimings {
    pub write: Duration,
    pub update: Duration,
}

impl OperationTimings {
    #[must_use]
    pub const fn new(write: Duration, update: Duration) -> Self {
        Self { write, update }
    }

    #[must_use]
    pub const fn nominal(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Write => self.write,
            OperationKind::Update => self.update,
        }
    }

    /// Time one record takes when nothing is cancelled: the slower of the two.
    #[must_use]
    pub fn per_record(&self) -> Duration {
        self.write.max(self.update)
    }
}

impl Default for OperationTimings {
    /// One second to write, two to update.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(2))
    }
}

/// A wait of fixed nominal length followed by an all-or-nothing side effect.
#[derive(Clone)]
pub struct DelayableOperation {
    kind: OperationKind,
    nominal: Duration,
    effect: Arc<dyn RecordEffect>,
}

impl fmt::Debug for DelayableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayableOperation")
            .field("kind", &self.kind)
            .field("nominal", &self.nominal)
            .finish_non_exhaustive()
    }
}

impl DelayableOperation {
    #[must_use]
    pub fn new(kind: OperationKind, nominal: Duration, effect: Arc<dyn RecordEffect>) -> Self {
        Self {
            kind,
            nominal,
            effect,
        }
    }

    #[must_use]
    pub fn write(nominal: Duration, effect: Arc<dyn RecordEffect>) -> Self {
        Self::new(OperationKind::Write, nominal, effect)
    }

    #[must_use]
    pub fn update(nominal: Duration, effect: Arc<dyn RecordEffect>) -> Self {
        Self::new(OperationKind::Update, nominal, effect)
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn nominal(&self) -> Duration {
        self.nominal
    }

    /// Wait out the nominal duration, then apply the effect.
    ///
    /// If the signal fires during the wait the effect is skipped entirely and
    /// `Cancelled` is returned as soon as the signal is observed.
    pub async fn run(&self, record: RecordIndex, signal: &CancellationSignal) -> Outcome {
        match signal.await_until_cancelled_or(self.nominal).await {
            WaitOutcome::TimedOut => {
                self.effect.apply(record);
                tracing::info!(
                    %record,
                    operation = %self.kind,
                    "Finished {}",
                    self.kind.action()
                );
                Outcome::Completed
            }
            WaitOutcome::Cancelled => {
                tracing::info!(
                    %record,
                    operation = %self.kind,
                    "Cancelled while {}",
                    self.kind.action()
                );
                Outcome::Cancelled
            }
        }
    }
}
