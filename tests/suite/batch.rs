//! End-to-end batch runs under a paused, deterministic clock.

use cutoff_core::{BatchError, OperationTimings};
use cutoff_types::{BatchStop, CancelReason, Outcome, RecordIndex, RecordSettlement};
use tokio::time::Instant;

use crate::common::{Harness, millis, secs};

#[tokio::test(start_paused = true)]
async fn reference_scenario_stops_early() {
    let harness = Harness::reference();

    let report = harness.driver.run(20, secs(10)).await.unwrap();

    assert!(report.fully_completed_count() < 20);
    assert!(report.fully_completed_count() >= 4);
    let stop = report.cancelled_at().expect("deadline should cut the batch short");
    assert!((4..=6).contains(&stop.value()), "stopped at {stop}");
    assert_eq!(report.processed_count(), stop.value() + 1);
    harness.assert_effects_match(&report);
}

#[tokio::test(start_paused = true)]
async fn off_boundary_deadline_is_deterministic() {
    let first = Harness::reference().driver.run(20, millis(10_500)).await.unwrap();
    let second = Harness::reference().driver.run(20, millis(10_500)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.stop,
        BatchStop::Cancelled {
            at: RecordIndex::new(5),
            reason: CancelReason::DeadlineElapsed,
        }
    );
    assert_eq!(first.fully_completed_count(), 5);
    assert_eq!(
        first.records[5].settlement(),
        RecordSettlement::BothCancelled
    );
}

#[tokio::test(start_paused = true)]
async fn deadline_covering_every_duration_completes_all_records() {
    let harness = Harness::reference();
    let records = 6;
    // write + update per record, summed over the batch
    let deadline = secs(3 * records as u64);

    let report = harness.driver.run(records, deadline).await.unwrap();

    assert_eq!(report.stop, BatchStop::Exhausted);
    assert_eq!(report.processed_count(), records);
    assert!(
        report
            .records
            .iter()
            .all(|r| r.write == Outcome::Completed && r.update == Outcome::Completed)
    );
    harness.assert_effects_match(&report);
}

#[tokio::test(start_paused = true)]
async fn deadline_inside_first_record_stops_at_index_zero() {
    let harness = Harness::reference();

    let report = harness.driver.run(20, millis(1500)).await.unwrap();

    assert_eq!(report.cancelled_at(), Some(RecordIndex::FIRST));
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].write, Outcome::Completed);
    assert_eq!(report.records[0].update, Outcome::Cancelled);
    assert!(harness.updates.seen().is_empty());
    harness.assert_effects_match(&report);
}

#[tokio::test(start_paused = true)]
async fn deadline_shorter_than_both_operations_cancels_both() {
    let harness = Harness::reference();
    let start = Instant::now();

    let report = harness.driver.run(20, millis(200)).await.unwrap();

    assert_eq!(start.elapsed(), millis(200));
    assert_eq!(
        report.records[0].settlement(),
        RecordSettlement::BothCancelled
    );
    assert!(harness.writes.seen().is_empty());
    assert!(harness.updates.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn no_record_starts_after_cancellation_is_observed() {
    let harness = Harness::new(OperationTimings::new(millis(100), millis(100)));
    let start = Instant::now();

    let report = harness.driver.run(1_000, millis(450)).await.unwrap();

    // Records 0..=3 finish at 400ms; record 4 is cut at 450ms and is the last.
    assert_eq!(report.cancelled_at(), Some(RecordIndex::new(4)));
    assert_eq!(report.processed_count(), 5);
    assert_eq!(start.elapsed(), millis(450));
    harness.assert_effects_match(&report);
}

#[tokio::test(start_paused = true)]
async fn empty_batch_reports_all_processed() {
    let harness = Harness::reference();
    let start = Instant::now();

    let report = harness.driver.run(0, secs(10)).await.unwrap();

    assert_eq!(report.stop, BatchStop::Exhausted);
    assert_eq!(report.processed_count(), 0);
    assert_eq!(start.elapsed(), millis(0));
}

#[tokio::test(start_paused = true)]
async fn zero_deadline_fails_before_any_record() {
    let harness = Harness::reference();

    let err = harness.driver.run(5, millis(0)).await.unwrap_err();

    assert_eq!(err, BatchError::ZeroDeadline);
    assert!(harness.writes.seen().is_empty());
}
