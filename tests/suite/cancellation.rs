//! Externally requested cancellation and signal semantics across a batch.

use std::time::Duration;

use cutoff_core::{CancellationSignal, WaitOutcome};
use cutoff_types::{BatchStop, CancelReason, Outcome, RecordIndex};
use tokio::time::{Instant, sleep};

use crate::common::{Harness, millis, secs};

#[tokio::test(start_paused = true)]
async fn external_request_stops_batch_with_requested_reason() {
    let harness = Harness::reference();
    let signal = CancellationSignal::new();
    let canceller = {
        let signal = signal.clone();
        tokio::spawn(async move {
            sleep(millis(3500)).await;
            signal.request_cancel()
        })
    };

    let report = harness
        .driver
        .run_with_signal(20, secs(10), &signal)
        .await
        .unwrap();

    assert!(canceller.await.unwrap());
    assert_eq!(
        report.stop,
        BatchStop::Cancelled {
            at: RecordIndex::new(1),
            reason: CancelReason::Requested,
        }
    );
    assert_eq!(report.records[1].write, Outcome::Completed);
    assert_eq!(report.records[1].update, Outcome::Cancelled);
    harness.assert_effects_match(&report);
}

#[tokio::test(start_paused = true)]
async fn deadline_timer_is_released_when_run_returns() {
    let harness = Harness::reference();
    let signal = CancellationSignal::new();

    let report = harness
        .driver
        .run_with_signal(2, secs(10), &signal)
        .await
        .unwrap();
    assert_eq!(report.stop, BatchStop::Exhausted);

    sleep(secs(30)).await;
    assert!(!signal.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn later_deadline_does_not_overwrite_explicit_cancel() {
    let (signal, _timer) = CancellationSignal::armed(secs(1));

    assert!(signal.request_cancel());
    assert!(!signal.request_cancel());
    sleep(secs(2)).await;

    assert!(signal.is_cancelled());
    assert_eq!(signal.reason(), Some(CancelReason::Requested));
}

#[tokio::test(start_paused = true)]
async fn waits_started_after_firing_are_cancelled_immediately() {
    let (signal, _timer) = CancellationSignal::armed(millis(100));
    sleep(millis(150)).await;
    let start = Instant::now();

    let outcomes = tokio::join!(
        signal.await_until_cancelled_or(secs(5)),
        signal.await_until_cancelled_or(Duration::ZERO),
    );

    assert_eq!(outcomes, (WaitOutcome::Cancelled, WaitOutcome::Cancelled));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn observers_on_other_threads_never_see_the_flag_revert() {
    let signal = CancellationSignal::new();
    let observers: Vec<_> = (0..8)
        .map(|_| {
            let signal = signal.clone();
            tokio::spawn(async move {
                signal.cancelled().await;
                (0..1_000).all(|_| signal.is_cancelled())
            })
        })
        .collect();

    let _timer = signal.arm(millis(20));
    for observer in observers {
        assert!(observer.await.unwrap());
    }
    assert_eq!(signal.reason(), Some(CancelReason::DeadlineElapsed));
}
