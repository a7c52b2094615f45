//! Batch-wide cancellation signal.
//!
//! A [`CancellationSignal`] is a cheap, cloneable handle onto one shared flag.
//! The flag moves from "not fired" to "fired" at most once, either because the
//! deadline timer started by [`CancellationSignal::arm`] elapsed or because
//! [`CancellationSignal::request_cancel`] was called. Every clone observes the
//! same transition.
//!
//! Waiters never miss the transition: [`CancellationSignal::cancelled`] registers
//! interest with the [`Notify`] before it inspects the flag, so a fire that lands
//! between the check and the await still wakes it.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use cutoff_types::CancelReason;

const NOT_FIRED: u8 = 0;
const FIRED_DEADLINE: u8 = 1;
const FIRED_REQUESTED: u8 = 2;

/// Result of racing a wait against the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full duration elapsed without the signal firing.
    TimedOut,
    /// The signal fired first (or had already fired on entry).
    Cancelled,
}

#[derive(Debug, Default)]
struct Shared {
    state: AtomicU8,
    notify: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    shared: Arc<Shared>,
}

impl CancellationSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signal and arm it in one step.
    #[must_use]
    pub fn armed(deadline: Duration) -> (Self, DeadlineTimer) {
        let signal = Self::new();
        let timer = signal.arm(deadline);
        (signal, timer)
    }

    /// Start the background deadline timer.
    ///
    /// The timer fires the signal once `deadline` has elapsed, unless the signal
    /// fired some other way first. Dropping the returned [`DeadlineTimer`]
    /// releases the timer without firing.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "dropping the timer guard disarms the deadline"]
    pub fn arm(&self, deadline: Duration) -> DeadlineTimer {
        let signal = self.clone();
        let handle = tokio::spawn(async move {
            if signal.await_until_cancelled_or(deadline).await == WaitOutcome::TimedOut {
                signal.fire(CancelReason::DeadlineElapsed);
            }
        });
        tracing::debug!(deadline_ms = deadline.as_millis() as u64, "Deadline timer armed");
        DeadlineTimer { handle }
    }

    /// Fire the signal now.
    ///
    /// Returns `true` only for the call that performed the transition; later
    /// calls (or a timer firing afterwards) leave state and reason untouched.
    pub fn request_cancel(&self) -> bool {
        self.fire(CancelReason::Requested)
    }

    fn fire(&self, reason: CancelReason) -> bool {
        let code = match reason {
            CancelReason::DeadlineElapsed => FIRED_DEADLINE,
            CancelReason::Requested => FIRED_REQUESTED,
        };
        let first = self
            .shared
            .state
            .compare_exchange(NOT_FIRED, code, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            self.shared.notify.notify_waiters();
            tracing::info!(%reason, "Cancellation signal fired");
        }
        first
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.shared.state.load(Ordering::SeqCst) != NOT_FIRED
    }

    /// Why the signal fired, or `None` while it has not.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        match self.shared.state.load(Ordering::SeqCst) {
            FIRED_DEADLINE => Some(CancelReason::DeadlineElapsed),
            FIRED_REQUESTED => Some(CancelReason::Requested),
            _ => None,
        }
    }

    /// Suspend until the signal fires. Returns immediately if it already has.
    pub async fn cancelled(&self) {
        let mut notified = pin!(self.shared.notify.notified());
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Race `duration` against the signal.
    ///
    /// When both are ready on the same poll the signal wins, so an operation
    /// never reports `TimedOut` against an already fired signal.
    pub async fn await_until_cancelled_or(&self, duration: Duration) -> WaitOutcome {
        tokio::select! {
            biased;
            () = self.cancelled() => WaitOutcome::Cancelled,
            () = tokio::time::sleep(duration) => WaitOutcome::TimedOut,
        }
    }
}

/// Owns the background deadline task started by [`CancellationSignal::arm`].
///
/// Dropping the guard aborts the task, so the timer never outlives the batch
/// run that armed it.
#[derive(Debug)]
pub struct DeadlineTimer {
    handle: JoinHandle<()>,
}

impl DeadlineTimer {
    /// `true` once the timer task has exited, either by firing or because the
    /// signal fired some other way.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            tracing::debug!("Deadline timer released before firing");
        }
        self.handle.abort();
    }
}
